use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use journey_core::model::{
    AppSettings, DailyProgress, Measurement, Metric, MetricBinding, MetricId, Program,
    ProgramTemplate, TemplateId,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for the single saved program.
///
/// The tracker persists exactly one program at a time; saving replaces it
/// wholesale and absence is a normal state (the setup flow), not an error.
#[async_trait]
pub trait ProgramRepository: Send + Sync {
    /// Persist the program, replacing any previously saved one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the program cannot be stored.
    async fn save_program(&self, program: &Program) -> Result<(), StorageError>;

    /// Fetch the saved program, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures; a missing program is
    /// `Ok(None)`.
    async fn load_program(&self) -> Result<Option<Program>, StorageError>;

    /// Remove the saved program.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the removal fails.
    async fn clear_program(&self) -> Result<(), StorageError>;
}

/// Repository contract for per-day progress records.
#[async_trait]
pub trait DailyProgressRepository: Send + Sync {
    /// Persist or update the record for its date. At most one record exists
    /// per calendar day; last write wins.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn upsert_progress(&self, progress: &DailyProgress) -> Result<(), StorageError>;

    /// Fetch the record for a date, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures; a missing record is
    /// `Ok(None)`.
    async fn get_progress(&self, date: NaiveDate) -> Result<Option<DailyProgress>, StorageError>;

    /// Fetch records in a date range (inclusive bounds, either side
    /// optional), ordered by date.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_progress(
        &self,
        from: Option<NaiveDate>,
        until: Option<NaiveDate>,
    ) -> Result<Vec<DailyProgress>, StorageError>;

    /// Remove every progress record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the removal fails.
    async fn clear_all(&self) -> Result<(), StorageError>;

    /// Persist or clear the earliest-missed-day marker.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the marker cannot be stored.
    async fn set_earliest_missed_day(&self, date: Option<NaiveDate>) -> Result<(), StorageError>;

    /// Fetch the earliest-missed-day marker, if set.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn get_earliest_missed_day(&self) -> Result<Option<NaiveDate>, StorageError>;
}

/// Repository contract for metrics and their per-program bindings.
#[async_trait]
pub trait MetricRepository: Send + Sync {
    /// Persist or update a metric.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the metric cannot be stored.
    async fn upsert_metric(&self, metric: &Metric) -> Result<(), StorageError>;

    /// Fetch a metric by id, if present.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn get_metric(&self, id: MetricId) -> Result<Option<Metric>, StorageError>;

    /// List metrics by name, optionally including archived ones.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_metrics(&self, include_archived: bool) -> Result<Vec<Metric>, StorageError>;

    /// Persist or update the binding for a metric.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the binding cannot be stored.
    async fn upsert_binding(&self, binding: &MetricBinding) -> Result<(), StorageError>;

    /// Fetch the binding for a metric, if configured.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn binding_for(&self, metric_id: MetricId) -> Result<Option<MetricBinding>, StorageError>;
}

/// Repository contract for recorded measurements.
#[async_trait]
pub trait MeasurementRepository: Send + Sync {
    /// Append a measurement.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the measurement cannot be stored.
    async fn append_measurement(&self, measurement: &Measurement) -> Result<(), StorageError>;

    /// Fetch a metric's measurements in a time range (inclusive bounds,
    /// either side optional), in chronological order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn measurements_for(
        &self,
        metric_id: MetricId,
        from: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Result<Vec<Measurement>, StorageError>;
}

/// Repository contract for program templates.
#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// Persist or update a template.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the template cannot be stored.
    async fn upsert_template(&self, template: &ProgramTemplate) -> Result<(), StorageError>;

    /// Fetch a template by id, if present.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn get_template(&self, id: TemplateId) -> Result<Option<ProgramTemplate>, StorageError>;

    /// List every template, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn list_templates(&self) -> Result<Vec<ProgramTemplate>, StorageError>;

    /// Remove a template.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the removal fails.
    async fn delete_template(&self, id: TemplateId) -> Result<(), StorageError>;
}

/// Repository contract for user preferences.
#[async_trait]
pub trait AppSettingsRepository: Send + Sync {
    /// Fetch settings, if the user ever saved any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn get_settings(&self) -> Result<Option<AppSettings>, StorageError>;

    /// Persist settings.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the settings cannot be stored.
    async fn save_settings(&self, settings: &AppSettings) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    program: Arc<Mutex<Option<Program>>>,
    daily: Arc<Mutex<HashMap<NaiveDate, DailyProgress>>>,
    earliest_missed: Arc<Mutex<Option<NaiveDate>>>,
    metrics: Arc<Mutex<HashMap<MetricId, Metric>>>,
    bindings: Arc<Mutex<HashMap<MetricId, MetricBinding>>>,
    measurements: Arc<Mutex<Vec<Measurement>>>,
    templates: Arc<Mutex<HashMap<TemplateId, ProgramTemplate>>>,
    settings: Arc<Mutex<Option<AppSettings>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock<'a, T>(mutex: &'a Mutex<T>) -> Result<std::sync::MutexGuard<'a, T>, StorageError> {
        mutex
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl ProgramRepository for InMemoryRepository {
    async fn save_program(&self, program: &Program) -> Result<(), StorageError> {
        *Self::lock(&self.program)? = Some(program.clone());
        Ok(())
    }

    async fn load_program(&self) -> Result<Option<Program>, StorageError> {
        Ok(Self::lock(&self.program)?.clone())
    }

    async fn clear_program(&self) -> Result<(), StorageError> {
        *Self::lock(&self.program)? = None;
        Ok(())
    }
}

#[async_trait]
impl DailyProgressRepository for InMemoryRepository {
    async fn upsert_progress(&self, progress: &DailyProgress) -> Result<(), StorageError> {
        Self::lock(&self.daily)?.insert(progress.date(), progress.clone());
        Ok(())
    }

    async fn get_progress(&self, date: NaiveDate) -> Result<Option<DailyProgress>, StorageError> {
        Ok(Self::lock(&self.daily)?.get(&date).cloned())
    }

    async fn list_progress(
        &self,
        from: Option<NaiveDate>,
        until: Option<NaiveDate>,
    ) -> Result<Vec<DailyProgress>, StorageError> {
        let guard = Self::lock(&self.daily)?;
        let mut records: Vec<DailyProgress> = guard
            .values()
            .filter(|p| from.is_none_or(|f| p.date() >= f))
            .filter(|p| until.is_none_or(|u| p.date() <= u))
            .cloned()
            .collect();
        records.sort_by_key(DailyProgress::date);
        Ok(records)
    }

    async fn clear_all(&self) -> Result<(), StorageError> {
        Self::lock(&self.daily)?.clear();
        *Self::lock(&self.earliest_missed)? = None;
        Ok(())
    }

    async fn set_earliest_missed_day(&self, date: Option<NaiveDate>) -> Result<(), StorageError> {
        *Self::lock(&self.earliest_missed)? = date;
        Ok(())
    }

    async fn get_earliest_missed_day(&self) -> Result<Option<NaiveDate>, StorageError> {
        Ok(*Self::lock(&self.earliest_missed)?)
    }
}

#[async_trait]
impl MetricRepository for InMemoryRepository {
    async fn upsert_metric(&self, metric: &Metric) -> Result<(), StorageError> {
        Self::lock(&self.metrics)?.insert(metric.id(), metric.clone());
        Ok(())
    }

    async fn get_metric(&self, id: MetricId) -> Result<Option<Metric>, StorageError> {
        Ok(Self::lock(&self.metrics)?.get(&id).cloned())
    }

    async fn list_metrics(&self, include_archived: bool) -> Result<Vec<Metric>, StorageError> {
        let guard = Self::lock(&self.metrics)?;
        let mut metrics: Vec<Metric> = guard
            .values()
            .filter(|m| include_archived || !m.is_archived())
            .cloned()
            .collect();
        metrics.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(metrics)
    }

    async fn upsert_binding(&self, binding: &MetricBinding) -> Result<(), StorageError> {
        Self::lock(&self.bindings)?.insert(binding.metric_id(), *binding);
        Ok(())
    }

    async fn binding_for(&self, metric_id: MetricId) -> Result<Option<MetricBinding>, StorageError> {
        Ok(Self::lock(&self.bindings)?.get(&metric_id).copied())
    }
}

#[async_trait]
impl MeasurementRepository for InMemoryRepository {
    async fn append_measurement(&self, measurement: &Measurement) -> Result<(), StorageError> {
        Self::lock(&self.measurements)?.push(measurement.clone());
        Ok(())
    }

    async fn measurements_for(
        &self,
        metric_id: MetricId,
        from: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Result<Vec<Measurement>, StorageError> {
        let guard = Self::lock(&self.measurements)?;
        let mut records: Vec<Measurement> = guard
            .iter()
            .filter(|m| m.metric_id() == metric_id)
            .filter(|m| from.is_none_or(|f| m.recorded_at() >= f))
            .filter(|m| until.is_none_or(|u| m.recorded_at() <= u))
            .cloned()
            .collect();
        records.sort_by_key(Measurement::recorded_at);
        Ok(records)
    }
}

#[async_trait]
impl TemplateRepository for InMemoryRepository {
    async fn upsert_template(&self, template: &ProgramTemplate) -> Result<(), StorageError> {
        Self::lock(&self.templates)?.insert(template.id(), template.clone());
        Ok(())
    }

    async fn get_template(&self, id: TemplateId) -> Result<Option<ProgramTemplate>, StorageError> {
        Ok(Self::lock(&self.templates)?.get(&id).cloned())
    }

    async fn list_templates(&self) -> Result<Vec<ProgramTemplate>, StorageError> {
        let guard = Self::lock(&self.templates)?;
        let mut templates: Vec<ProgramTemplate> = guard.values().cloned().collect();
        templates.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(templates)
    }

    async fn delete_template(&self, id: TemplateId) -> Result<(), StorageError> {
        Self::lock(&self.templates)?.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl AppSettingsRepository for InMemoryRepository {
    async fn get_settings(&self) -> Result<Option<AppSettings>, StorageError> {
        Ok(*Self::lock(&self.settings)?)
    }

    async fn save_settings(&self, settings: &AppSettings) -> Result<(), StorageError> {
        *Self::lock(&self.settings)? = Some(*settings);
        Ok(())
    }
}

/// Aggregates every repository behind trait objects for easy backend
/// swapping.
#[derive(Clone)]
pub struct Storage {
    pub programs: Arc<dyn ProgramRepository>,
    pub daily_progress: Arc<dyn DailyProgressRepository>,
    pub metrics: Arc<dyn MetricRepository>,
    pub measurements: Arc<dyn MeasurementRepository>,
    pub templates: Arc<dyn TemplateRepository>,
    pub app_settings: Arc<dyn AppSettingsRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            programs: Arc::new(repo.clone()),
            daily_progress: Arc::new(repo.clone()),
            metrics: Arc::new(repo.clone()),
            measurements: Arc::new(repo.clone()),
            templates: Arc::new(repo.clone()),
            app_settings: Arc::new(repo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use journey_core::day::EndOfDay;
    use journey_core::model::{ProgramId, ProgressId, Task, TaskId};
    use journey_core::time::{fixed_now, fixed_today};

    fn build_program() -> Program {
        let tasks = vec![
            Task::plain(TaskId::new(), "Read").unwrap(),
            Task::plain(TaskId::new(), "Drink Water").unwrap(),
        ];
        Program::new(
            ProgramId::new(),
            fixed_today(),
            75,
            EndOfDay::default(),
            tasks,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn program_save_load_round_trips() {
        let repo = InMemoryRepository::new();
        assert!(repo.load_program().await.unwrap().is_none());

        let program = build_program();
        repo.save_program(&program).await.unwrap();
        assert_eq!(repo.load_program().await.unwrap(), Some(program.clone()));

        repo.clear_program().await.unwrap();
        assert!(repo.load_program().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn daily_progress_is_keyed_by_date() {
        let repo = InMemoryRepository::new();
        let program = build_program();
        let date = fixed_today();

        let mut progress = DailyProgress::new(ProgressId::new(), date);
        progress.toggle(program.tasks()[0].id());
        repo.upsert_progress(&progress).await.unwrap();

        // A second write for the same date replaces, never duplicates.
        progress.toggle(program.tasks()[1].id());
        repo.upsert_progress(&progress).await.unwrap();

        let loaded = repo.get_progress(date).await.unwrap().unwrap();
        assert!(loaded.is_complete(&program));
        assert_eq!(repo.list_progress(None, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn clear_all_also_drops_the_missed_day_marker() {
        let repo = InMemoryRepository::new();
        let date = fixed_today();
        repo.upsert_progress(&DailyProgress::new(ProgressId::new(), date))
            .await
            .unwrap();
        repo.set_earliest_missed_day(Some(date)).await.unwrap();

        repo.clear_all().await.unwrap();
        assert!(repo.get_progress(date).await.unwrap().is_none());
        assert!(repo.get_earliest_missed_day().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn measurements_come_back_in_time_order() {
        let repo = InMemoryRepository::new();
        let metric = MetricId::new();
        let later = Measurement::manual(
            journey_core::model::MeasurementId::new(),
            metric,
            fixed_now() + chrono::Duration::hours(1),
            2.0,
        );
        let earlier = Measurement::manual(
            journey_core::model::MeasurementId::new(),
            metric,
            fixed_now(),
            1.0,
        );
        repo.append_measurement(&later).await.unwrap();
        repo.append_measurement(&earlier).await.unwrap();

        let history = repo.measurements_for(metric, None, None).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].value(), 1.0);
        assert_eq!(history[1].value(), 2.0);
    }
}
