use journey_core::model::{
    ComparisonMode, Measurement, MeasurementId, MeasurementSource, Metric, MetricDirection,
    MetricId, MetricKind, ProgressRule, Task, TaskId, TaskKind, TemplateCategory, TemplateTask,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Parses a TEXT id column into any of the UUID-backed id newtypes.
pub(crate) fn parse_id<T>(field: &'static str, value: &str) -> Result<T, StorageError>
where
    T: std::str::FromStr,
{
    value
        .parse()
        .map_err(|_| StorageError::Serialization(format!("invalid {field}: {value}")))
}

pub(crate) fn parse_task_kind(value: &str) -> Result<TaskKind, StorageError> {
    TaskKind::parse(value)
        .ok_or_else(|| StorageError::Serialization(format!("invalid task kind: {value}")))
}

pub(crate) fn parse_direction(value: &str) -> Result<MetricDirection, StorageError> {
    MetricDirection::parse(value)
        .ok_or_else(|| StorageError::Serialization(format!("invalid direction: {value}")))
}

pub(crate) fn parse_metric_kind(value: &str) -> Result<MetricKind, StorageError> {
    MetricKind::parse(value)
        .ok_or_else(|| StorageError::Serialization(format!("invalid metric kind: {value}")))
}

pub(crate) fn parse_source(value: &str) -> Result<MeasurementSource, StorageError> {
    MeasurementSource::parse(value)
        .ok_or_else(|| StorageError::Serialization(format!("invalid source: {value}")))
}

pub(crate) fn parse_comparison_mode(value: &str) -> Result<ComparisonMode, StorageError> {
    ComparisonMode::parse(value)
        .ok_or_else(|| StorageError::Serialization(format!("invalid comparison mode: {value}")))
}

pub(crate) fn parse_category(value: &str) -> Result<TemplateCategory, StorageError> {
    TemplateCategory::parse(value)
        .ok_or_else(|| StorageError::Serialization(format!("invalid category: {value}")))
}

/// Progress rules travel as a JSON column so the rule enum stays the single
/// source of truth for the format.
pub(crate) fn rule_to_json(rule: Option<&ProgressRule>) -> Result<Option<String>, StorageError> {
    rule.map(|r| serde_json::to_string(r).map_err(ser)).transpose()
}

pub(crate) fn rule_from_json(json: Option<String>) -> Result<Option<ProgressRule>, StorageError> {
    json.map(|j| serde_json::from_str(&j).map_err(ser)).transpose()
}

pub(crate) fn map_task_row(row: &SqliteRow) -> Result<Task, StorageError> {
    let id: TaskId = parse_id("task_id", &row.try_get::<String, _>("task_id").map_err(ser)?)?;
    let title: String = row.try_get("title").map_err(ser)?;
    let description: Option<String> = row.try_get("description").map_err(ser)?;
    let kind = parse_task_kind(&row.try_get::<String, _>("kind").map_err(ser)?)?;
    let rule = rule_from_json(row.try_get("progress_rule").map_err(ser)?)?;
    let linked_metric = row
        .try_get::<Option<String>, _>("linked_metric_id")
        .map_err(ser)?
        .map(|raw| parse_id::<MetricId>("linked_metric_id", &raw))
        .transpose()?;

    Task::new(id, title, description, kind, rule, linked_metric).map_err(ser)
}

pub(crate) fn map_metric_row(row: &SqliteRow) -> Result<Metric, StorageError> {
    let id: MetricId = parse_id("id", &row.try_get::<String, _>("id").map_err(ser)?)?;
    let direction = parse_direction(&row.try_get::<String, _>("direction").map_err(ser)?)?;
    let kind = parse_metric_kind(&row.try_get::<String, _>("kind").map_err(ser)?)?;
    let archived: i64 = row.try_get("archived").map_err(ser)?;

    Metric::from_persisted(
        id,
        row.try_get("name").map_err(ser)?,
        row.try_get("description").map_err(ser)?,
        row.try_get("unit").map_err(ser)?,
        direction,
        kind,
        row.try_get("created_at").map_err(ser)?,
        archived != 0,
    )
    .map_err(ser)
}

pub(crate) fn map_measurement_row(row: &SqliteRow) -> Result<Measurement, StorageError> {
    let id: MeasurementId = parse_id("id", &row.try_get::<String, _>("id").map_err(ser)?)?;
    let metric_id: MetricId =
        parse_id("metric_id", &row.try_get::<String, _>("metric_id").map_err(ser)?)?;
    let source = parse_source(&row.try_get::<String, _>("source").map_err(ser)?)?;
    let boolean_value = row
        .try_get::<Option<i64>, _>("boolean_value")
        .map_err(ser)?
        .map(|v| v != 0);

    Ok(Measurement::new(
        id,
        metric_id,
        row.try_get("recorded_at").map_err(ser)?,
        row.try_get("value").map_err(ser)?,
        boolean_value,
        source,
        row.try_get("notes").map_err(ser)?,
    ))
}

pub(crate) fn map_template_task_row(row: &SqliteRow) -> Result<TemplateTask, StorageError> {
    let title: String = row.try_get("title").map_err(ser)?;
    let description: Option<String> = row.try_get("description").map_err(ser)?;
    let kind = parse_task_kind(&row.try_get::<String, _>("kind").map_err(ser)?)?;
    let rule = rule_from_json(row.try_get("progress_rule").map_err(ser)?)?;

    TemplateTask::new(title, description, kind, rule).map_err(ser)
}
