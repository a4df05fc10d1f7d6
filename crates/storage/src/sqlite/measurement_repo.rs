use chrono::{DateTime, Utc};
use journey_core::model::{Measurement, MetricId};

use super::SqliteRepository;
use super::mapping::map_measurement_row;
use crate::repository::{MeasurementRepository, StorageError};

#[async_trait::async_trait]
impl MeasurementRepository for SqliteRepository {
    async fn append_measurement(&self, measurement: &Measurement) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO measurements (id, metric_id, recorded_at, value, boolean_value, source, notes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
        )
        .bind(measurement.id().to_string())
        .bind(measurement.metric_id().to_string())
        .bind(measurement.recorded_at())
        .bind(measurement.value())
        .bind(measurement.boolean_value().map(i64::from))
        .bind(measurement.source().as_str())
        .bind(measurement.notes())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }

    async fn measurements_for(
        &self,
        metric_id: MetricId,
        from: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Result<Vec<Measurement>, StorageError> {
        let mut sql = String::from(
            r"
            SELECT id, metric_id, recorded_at, value, boolean_value, source, notes
            FROM measurements
            WHERE metric_id = ?1
            ",
        );
        let mut bind_index = 2;
        if from.is_some() {
            sql.push_str(" AND recorded_at >= ?");
            sql.push_str(&bind_index.to_string());
            bind_index += 1;
        }
        if until.is_some() {
            sql.push_str(" AND recorded_at <= ?");
            sql.push_str(&bind_index.to_string());
        }
        sql.push_str(" ORDER BY recorded_at ASC, id ASC");

        let mut query = sqlx::query(&sql).bind(metric_id.to_string());
        if let Some(from) = from {
            query = query.bind(from);
        }
        if let Some(until) = until {
            query = query.bind(until);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut measurements = Vec::with_capacity(rows.len());
        for row in &rows {
            measurements.push(map_measurement_row(row)?);
        }
        Ok(measurements)
    }
}
