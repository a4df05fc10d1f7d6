use async_trait::async_trait;
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::ser;
use crate::repository::{AppSettingsRepository, StorageError};
use journey_core::model::AppSettings;

#[async_trait]
impl AppSettingsRepository for SqliteRepository {
    async fn get_settings(&self) -> Result<Option<AppSettings>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT theme, celebration_style, celebration_enabled
            FROM app_settings
            WHERE id = 1
            ",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let theme: String = row.try_get("theme").map_err(ser)?;
        let style: String = row.try_get("celebration_style").map_err(ser)?;
        let enabled: i64 = row.try_get("celebration_enabled").map_err(ser)?;

        AppSettings::from_persisted(&theme, &style, enabled != 0)
            .map(Some)
            .map_err(ser)
    }

    async fn save_settings(&self, settings: &AppSettings) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO app_settings (id, theme, celebration_style, celebration_enabled)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                theme = excluded.theme,
                celebration_style = excluded.celebration_style,
                celebration_enabled = excluded.celebration_enabled
            ",
        )
        .bind(1_i64)
        .bind(settings.theme().as_str())
        .bind(settings.celebration_style().as_str())
        .bind(i64::from(settings.celebration_enabled()))
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}
