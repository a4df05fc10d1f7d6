use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs a single, consolidated migration for the current schema.
///
/// Creates the full schema: the single saved program and its tasks, per-day
/// progress with completed-task rows, metrics with bindings and
/// measurements, templates, settings, and the one-row app state.
#[allow(clippy::too_many_lines)]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: full schema.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS programs (
                    id INTEGER PRIMARY KEY CHECK (id = 1),
                    program_id TEXT NOT NULL,
                    start_date TEXT NOT NULL,
                    number_of_days INTEGER NOT NULL CHECK (number_of_days >= 1),
                    cutoff_hour INTEGER NOT NULL CHECK (cutoff_hour BETWEEN 0 AND 23),
                    cutoff_minute INTEGER NOT NULL CHECK (cutoff_minute BETWEEN 0 AND 59)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS program_tasks (
                    task_id TEXT PRIMARY KEY,
                    position INTEGER NOT NULL CHECK (position >= 0),
                    title TEXT NOT NULL,
                    description TEXT,
                    kind TEXT NOT NULL,
                    progress_rule TEXT,
                    linked_metric_id TEXT
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS daily_progress (
                    date TEXT PRIMARY KEY,
                    progress_id TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS daily_completed_tasks (
                    date TEXT NOT NULL,
                    task_id TEXT NOT NULL,
                    PRIMARY KEY (date, task_id),
                    FOREIGN KEY (date) REFERENCES daily_progress(date) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS metrics (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    description TEXT,
                    unit TEXT NOT NULL,
                    direction TEXT NOT NULL,
                    kind TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    archived INTEGER NOT NULL DEFAULT 0
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS metric_bindings (
                    metric_id TEXT PRIMARY KEY,
                    baseline REAL,
                    comparison_mode TEXT NOT NULL,
                    window_days INTEGER NOT NULL CHECK (window_days >= 1),
                    FOREIGN KEY (metric_id) REFERENCES metrics(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS measurements (
                    id TEXT PRIMARY KEY,
                    metric_id TEXT NOT NULL,
                    recorded_at TEXT NOT NULL,
                    value REAL NOT NULL,
                    boolean_value INTEGER,
                    source TEXT NOT NULL,
                    notes TEXT,
                    FOREIGN KEY (metric_id) REFERENCES metrics(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS templates (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    description TEXT NOT NULL,
                    category TEXT NOT NULL,
                    default_number_of_days INTEGER NOT NULL CHECK (default_number_of_days >= 1),
                    builtin INTEGER NOT NULL DEFAULT 0,
                    last_modified TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS template_tasks (
                    template_id TEXT NOT NULL,
                    position INTEGER NOT NULL CHECK (position >= 0),
                    title TEXT NOT NULL,
                    description TEXT,
                    kind TEXT NOT NULL,
                    progress_rule TEXT,
                    PRIMARY KEY (template_id, position),
                    FOREIGN KEY (template_id) REFERENCES templates(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS app_settings (
                    id INTEGER PRIMARY KEY CHECK (id = 1),
                    theme TEXT NOT NULL,
                    celebration_style TEXT NOT NULL,
                    celebration_enabled INTEGER NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS app_state (
                    id INTEGER PRIMARY KEY CHECK (id = 1),
                    earliest_missed_day TEXT
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_measurements_metric_recorded
                    ON measurements (metric_id, recorded_at);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_daily_completed_tasks_date
                    ON daily_completed_tasks (date);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    Ok(())
}
