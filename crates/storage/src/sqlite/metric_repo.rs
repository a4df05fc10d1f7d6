use journey_core::model::{Metric, MetricBinding, MetricId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{map_metric_row, parse_comparison_mode, ser};
use crate::repository::{MetricRepository, StorageError};

#[async_trait::async_trait]
impl MetricRepository for SqliteRepository {
    async fn upsert_metric(&self, metric: &Metric) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO metrics (id, name, description, unit, direction, kind, created_at, archived)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                unit = excluded.unit,
                direction = excluded.direction,
                kind = excluded.kind,
                archived = excluded.archived
            ",
        )
        .bind(metric.id().to_string())
        .bind(metric.name())
        .bind(metric.description())
        .bind(metric.unit())
        .bind(metric.direction().as_str())
        .bind(metric.kind().as_str())
        .bind(metric.created_at())
        .bind(i64::from(metric.is_archived()))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }

    async fn get_metric(&self, id: MetricId) -> Result<Option<Metric>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, name, description, unit, direction, kind, created_at, archived
            FROM metrics WHERE id = ?1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        match row {
            Some(row) => map_metric_row(&row).map(Some),
            None => Ok(None),
        }
    }

    async fn list_metrics(&self, include_archived: bool) -> Result<Vec<Metric>, StorageError> {
        let sql = if include_archived {
            r"
            SELECT id, name, description, unit, direction, kind, created_at, archived
            FROM metrics ORDER BY name ASC
            "
        } else {
            r"
            SELECT id, name, description, unit, direction, kind, created_at, archived
            FROM metrics WHERE archived = 0 ORDER BY name ASC
            "
        };

        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut metrics = Vec::with_capacity(rows.len());
        for row in &rows {
            metrics.push(map_metric_row(row)?);
        }
        Ok(metrics)
    }

    async fn upsert_binding(&self, binding: &MetricBinding) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO metric_bindings (metric_id, baseline, comparison_mode, window_days)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(metric_id) DO UPDATE SET
                baseline = excluded.baseline,
                comparison_mode = excluded.comparison_mode,
                window_days = excluded.window_days
            ",
        )
        .bind(binding.metric_id().to_string())
        .bind(binding.baseline())
        .bind(binding.comparison_mode().as_str())
        .bind(i64::from(binding.window_days()))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }

    async fn binding_for(&self, metric_id: MetricId) -> Result<Option<MetricBinding>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT baseline, comparison_mode, window_days
            FROM metric_bindings WHERE metric_id = ?1
            ",
        )
        .bind(metric_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mode = parse_comparison_mode(&row.try_get::<String, _>("comparison_mode").map_err(ser)?)?;
        let window: i64 = row.try_get("window_days").map_err(ser)?;
        let window = u32::try_from(window)
            .map_err(|_| StorageError::Serialization(format!("invalid window_days: {window}")))?;

        MetricBinding::new(metric_id, row.try_get("baseline").map_err(ser)?, mode, window)
            .map(Some)
            .map_err(ser)
    }
}
