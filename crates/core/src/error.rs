use thiserror::Error;

use crate::day::DayError;
use crate::model::{
    AppSettingsError, BindingError, MetricError, ProgramError, TaskError, TemplateError,
};

/// Aggregate error for callers that do not care which model rejected input.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Program(#[from] ProgramError),
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Metric(#[from] MetricError),
    #[error(transparent)]
    Binding(#[from] BindingError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Settings(#[from] AppSettingsError),
    #[error(transparent)]
    Day(#[from] DayError),
}
