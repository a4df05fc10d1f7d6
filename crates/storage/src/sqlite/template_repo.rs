use journey_core::model::{ProgramTemplate, TemplateId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{map_template_task_row, parse_category, parse_id, rule_to_json, ser};
use crate::repository::{StorageError, TemplateRepository};

impl SqliteRepository {
    async fn template_from_row(
        &self,
        row: &sqlx::sqlite::SqliteRow,
    ) -> Result<ProgramTemplate, StorageError> {
        let id: TemplateId = parse_id("id", &row.try_get::<String, _>("id").map_err(ser)?)?;
        let category = parse_category(&row.try_get::<String, _>("category").map_err(ser)?)?;
        let days: i64 = row.try_get("default_number_of_days").map_err(ser)?;
        let days = u32::try_from(days).map_err(|_| {
            StorageError::Serialization(format!("invalid default_number_of_days: {days}"))
        })?;
        let builtin: i64 = row.try_get("builtin").map_err(ser)?;

        let task_rows = sqlx::query(
            r"
            SELECT title, description, kind, progress_rule
            FROM template_tasks
            WHERE template_id = ?1
            ORDER BY position ASC
            ",
        )
        .bind(id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut tasks = Vec::with_capacity(task_rows.len());
        for task_row in &task_rows {
            tasks.push(map_template_task_row(task_row)?);
        }

        ProgramTemplate::new(
            id,
            row.try_get::<String, _>("name").map_err(ser)?,
            row.try_get::<String, _>("description").map_err(ser)?,
            category,
            days,
            tasks,
            builtin != 0,
            row.try_get("last_modified").map_err(ser)?,
        )
        .map_err(ser)
    }
}

#[async_trait::async_trait]
impl TemplateRepository for SqliteRepository {
    async fn upsert_template(&self, template: &ProgramTemplate) -> Result<(), StorageError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        sqlx::query(
            r"
            INSERT INTO templates (id, name, description, category, default_number_of_days, builtin, last_modified)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                category = excluded.category,
                default_number_of_days = excluded.default_number_of_days,
                builtin = excluded.builtin,
                last_modified = excluded.last_modified
            ",
        )
        .bind(template.id().to_string())
        .bind(template.name())
        .bind(template.description())
        .bind(template.category().as_str())
        .bind(i64::from(template.default_number_of_days()))
        .bind(i64::from(template.is_builtin()))
        .bind(template.last_modified())
        .execute(&mut *tx)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        sqlx::query("DELETE FROM template_tasks WHERE template_id = ?1")
            .bind(template.id().to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        for (position, task) in template.tasks().iter().enumerate() {
            let position = i64::try_from(position)
                .map_err(|_| StorageError::Serialization("task position overflow".into()))?;
            sqlx::query(
                r"
                INSERT INTO template_tasks (template_id, position, title, description, kind, progress_rule)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ",
            )
            .bind(template.id().to_string())
            .bind(position)
            .bind(task.title())
            .bind(task.description())
            .bind(task.kind().as_str())
            .bind(rule_to_json(task.progress_rule())?)
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))
    }

    async fn get_template(&self, id: TemplateId) -> Result<Option<ProgramTemplate>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, name, description, category, default_number_of_days, builtin, last_modified
            FROM templates WHERE id = ?1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        match row {
            Some(row) => self.template_from_row(&row).await.map(Some),
            None => Ok(None),
        }
    }

    async fn list_templates(&self) -> Result<Vec<ProgramTemplate>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, name, description, category, default_number_of_days, builtin, last_modified
            FROM templates ORDER BY name ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut templates = Vec::with_capacity(rows.len());
        for row in &rows {
            templates.push(self.template_from_row(row).await?);
        }
        Ok(templates)
    }

    async fn delete_template(&self, id: TemplateId) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM templates WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }
}
