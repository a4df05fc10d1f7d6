use chrono::NaiveDate;
use journey_core::model::{DailyProgress, ProgressId, TaskId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{parse_id, ser};
use crate::repository::{DailyProgressRepository, StorageError};

impl SqliteRepository {
    async fn completed_tasks_for(&self, date: NaiveDate) -> Result<Vec<TaskId>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT task_id FROM daily_completed_tasks
            WHERE date = ?1
            ORDER BY task_id ASC
            ",
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut ids = Vec::with_capacity(rows.len());
        for row in &rows {
            ids.push(parse_id(
                "task_id",
                &row.try_get::<String, _>("task_id").map_err(ser)?,
            )?);
        }
        Ok(ids)
    }
}

#[async_trait::async_trait]
impl DailyProgressRepository for SqliteRepository {
    async fn upsert_progress(&self, progress: &DailyProgress) -> Result<(), StorageError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        sqlx::query(
            r"
            INSERT INTO daily_progress (date, progress_id)
            VALUES (?1, ?2)
            ON CONFLICT(date) DO UPDATE SET progress_id = excluded.progress_id
            ",
        )
        .bind(progress.date())
        .bind(progress.id().to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        // The completed set is rewritten wholesale; toggles are cheap and
        // the set is tiny.
        sqlx::query("DELETE FROM daily_completed_tasks WHERE date = ?1")
            .bind(progress.date())
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        for task_id in progress.completed_tasks() {
            sqlx::query(
                r"
                INSERT INTO daily_completed_tasks (date, task_id)
                VALUES (?1, ?2)
                ",
            )
            .bind(progress.date())
            .bind(task_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))
    }

    async fn get_progress(&self, date: NaiveDate) -> Result<Option<DailyProgress>, StorageError> {
        let row = sqlx::query("SELECT progress_id FROM daily_progress WHERE date = ?1")
            .bind(date)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let id: ProgressId = parse_id(
            "progress_id",
            &row.try_get::<String, _>("progress_id").map_err(ser)?,
        )?;
        let completed = self.completed_tasks_for(date).await?;
        Ok(Some(DailyProgress::from_persisted(id, date, completed)))
    }

    async fn list_progress(
        &self,
        from: Option<NaiveDate>,
        until: Option<NaiveDate>,
    ) -> Result<Vec<DailyProgress>, StorageError> {
        let mut sql = String::from("SELECT date, progress_id FROM daily_progress WHERE 1 = 1");
        let mut bind_index = 1;
        if from.is_some() {
            sql.push_str(" AND date >= ?");
            sql.push_str(&bind_index.to_string());
            bind_index += 1;
        }
        if until.is_some() {
            sql.push_str(" AND date <= ?");
            sql.push_str(&bind_index.to_string());
        }
        sql.push_str(" ORDER BY date ASC");

        let mut query = sqlx::query(&sql);
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

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            let date: NaiveDate = row.try_get("date").map_err(ser)?;
            let id: ProgressId = parse_id(
                "progress_id",
                &row.try_get::<String, _>("progress_id").map_err(ser)?,
            )?;
            let completed = self.completed_tasks_for(date).await?;
            records.push(DailyProgress::from_persisted(id, date, completed));
        }
        Ok(records)
    }

    async fn clear_all(&self) -> Result<(), StorageError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        sqlx::query("DELETE FROM daily_completed_tasks")
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        sqlx::query("DELETE FROM daily_progress")
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        sqlx::query("DELETE FROM app_state")
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))
    }

    async fn set_earliest_missed_day(&self, date: Option<NaiveDate>) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO app_state (id, earliest_missed_day)
            VALUES (1, ?1)
            ON CONFLICT(id) DO UPDATE SET earliest_missed_day = excluded.earliest_missed_day
            ",
        )
        .bind(date)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }

    async fn get_earliest_missed_day(&self) -> Result<Option<NaiveDate>, StorageError> {
        let row = sqlx::query("SELECT earliest_missed_day FROM app_state WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };
        row.try_get("earliest_missed_day").map_err(ser)
    }
}
