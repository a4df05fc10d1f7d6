//! Shared error types for the services crate.

use thiserror::Error;

use journey_core::day::DayError;
use journey_core::model::{
    AppSettingsError, BindingError, MetricError, ProgramError, TaskError, TemplateError,
};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `ProgramService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgramServiceError {
    #[error(transparent)]
    Program(#[from] ProgramError),
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Day(#[from] DayError),
    #[error("no template with id {0}")]
    UnknownTemplate(journey_core::model::TemplateId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ChecklistService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChecklistError {
    #[error("no saved program")]
    NoProgram,
    #[error("task {0} is not part of the program")]
    UnknownTask(journey_core::model::TaskId),
    #[error("date {0} is outside the program")]
    OutOfProgram(chrono::NaiveDate),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `MetricsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MetricsServiceError {
    #[error(transparent)]
    Metric(#[from] MetricError),
    #[error(transparent)]
    Binding(#[from] BindingError),
    #[error("no metric with id {0}")]
    UnknownMetric(journey_core::model::MetricId),
    #[error("task carries no progress rule")]
    NoRule,
    #[error("task's rule is not linked to a metric")]
    NoLinkedMetric,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `TemplateService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TemplateServiceError {
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `AppSettingsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppSettingsServiceError {
    #[error(transparent)]
    Settings(#[from] AppSettingsError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while assembling `AppServices`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Metrics(#[from] MetricsServiceError),
    #[error(transparent)]
    Templates(#[from] TemplateServiceError),
}
