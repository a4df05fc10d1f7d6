use journey_core::day::EndOfDay;
use journey_core::model::{Program, ProgramId, Task};
use sqlx::Row;
use tracing::debug;

use super::SqliteRepository;
use super::mapping::{map_task_row, parse_id, rule_to_json, ser};
use crate::repository::{ProgramRepository, StorageError};

#[async_trait::async_trait]
impl ProgramRepository for SqliteRepository {
    async fn save_program(&self, program: &Program) -> Result<(), StorageError> {
        // Full replacement: the tracker keeps exactly one program, stored as
        // the singleton row plus its task rows.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        sqlx::query("DELETE FROM program_tasks")
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        sqlx::query(
            r"
            INSERT INTO programs (id, program_id, start_date, number_of_days, cutoff_hour, cutoff_minute)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                program_id = excluded.program_id,
                start_date = excluded.start_date,
                number_of_days = excluded.number_of_days,
                cutoff_hour = excluded.cutoff_hour,
                cutoff_minute = excluded.cutoff_minute
            ",
        )
        .bind(1_i64)
        .bind(program.id().to_string())
        .bind(program.start_date())
        .bind(i64::from(program.number_of_days()))
        .bind(i64::from(program.end_of_day().hour()))
        .bind(i64::from(program.end_of_day().minute()))
        .execute(&mut *tx)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        for (position, task) in program.tasks().iter().enumerate() {
            let position = i64::try_from(position)
                .map_err(|_| StorageError::Serialization("task position overflow".into()))?;
            sqlx::query(
                r"
                INSERT INTO program_tasks (task_id, position, title, description, kind, progress_rule, linked_metric_id)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ",
            )
            .bind(task.id().to_string())
            .bind(position)
            .bind(task.title())
            .bind(task.description())
            .bind(task.kind().as_str())
            .bind(rule_to_json(task.progress_rule())?)
            .bind(task.linked_metric().map(|m| m.to_string()))
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        debug!(tasks = program.tasks().len(), "saved program");
        Ok(())
    }

    async fn load_program(&self) -> Result<Option<Program>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT program_id, start_date, number_of_days, cutoff_hour, cutoff_minute
            FROM programs WHERE id = 1
            ",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let id: ProgramId =
            parse_id("program_id", &row.try_get::<String, _>("program_id").map_err(ser)?)?;
        let number_of_days: i64 = row.try_get("number_of_days").map_err(ser)?;
        let number_of_days = u32::try_from(number_of_days).map_err(|_| {
            StorageError::Serialization(format!("invalid number_of_days: {number_of_days}"))
        })?;
        let hour: i64 = row.try_get("cutoff_hour").map_err(ser)?;
        let minute: i64 = row.try_get("cutoff_minute").map_err(ser)?;
        let end_of_day = EndOfDay::new(
            u32::try_from(hour).map_err(|_| ser(format!("invalid cutoff_hour: {hour}")))?,
            u32::try_from(minute).map_err(|_| ser(format!("invalid cutoff_minute: {minute}")))?,
        )
        .map_err(ser)?;

        let task_rows = sqlx::query(
            r"
            SELECT task_id, position, title, description, kind, progress_rule, linked_metric_id
            FROM program_tasks
            ORDER BY position ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut tasks: Vec<Task> = Vec::with_capacity(task_rows.len());
        for task_row in &task_rows {
            tasks.push(map_task_row(task_row)?);
        }

        Program::from_persisted(
            id,
            row.try_get("start_date").map_err(ser)?,
            number_of_days,
            end_of_day,
            tasks,
        )
        .map(Some)
        .map_err(ser)
    }

    async fn clear_program(&self) -> Result<(), StorageError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        sqlx::query("DELETE FROM program_tasks")
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        sqlx::query("DELETE FROM programs")
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}
