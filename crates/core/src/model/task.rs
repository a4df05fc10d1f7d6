use thiserror::Error;

use crate::model::ids::{MetricId, TaskId};
use crate::model::rule::ProgressRule;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TaskError {
    #[error("task title cannot be empty")]
    EmptyTitle,

    #[error("task links a metric but carries no progress rule")]
    DanglingMetricLink,
}

/// How a task counts toward the day.
///
/// Growth tasks are the default and may carry a progress rule. Maintenance
/// tasks always pass once checked. Recovery tasks warn on a miss instead of
/// breaking the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskKind {
    #[default]
    Growth,
    Maintenance,
    Recovery,
}

impl TaskKind {
    /// Storage representation of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Growth => "growth",
            TaskKind::Maintenance => "maintenance",
            TaskKind::Recovery => "recovery",
        }
    }

    /// Parses the storage representation back into a kind.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "growth" => Some(TaskKind::Growth),
            "maintenance" => Some(TaskKind::Maintenance),
            "recovery" => Some(TaskKind::Recovery),
            _ => None,
        }
    }
}

/// A single recurring habit within a program.
///
/// Tasks are defined at program-creation time and never mutated after the
/// program is saved; editing a program replaces it wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    id: TaskId,
    title: String,
    description: Option<String>,
    kind: TaskKind,
    progress_rule: Option<ProgressRule>,
    linked_metric: Option<MetricId>,
}

impl Task {
    /// Creates a validated task.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::EmptyTitle` if the title is empty after trimming,
    /// or `TaskError::DanglingMetricLink` if a metric is linked without a
    /// progress rule to evaluate against it.
    pub fn new(
        id: TaskId,
        title: impl Into<String>,
        description: Option<String>,
        kind: TaskKind,
        progress_rule: Option<ProgressRule>,
        linked_metric: Option<MetricId>,
    ) -> Result<Self, TaskError> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(TaskError::EmptyTitle);
        }
        if linked_metric.is_some() && progress_rule.is_none() {
            return Err(TaskError::DanglingMetricLink);
        }

        let description = description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Ok(Self {
            id,
            title,
            description,
            kind,
            progress_rule,
            linked_metric,
        })
    }

    /// Convenience constructor for a plain growth task with no rule.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::EmptyTitle` if the title is empty after trimming.
    pub fn plain(id: TaskId, title: impl Into<String>) -> Result<Self, TaskError> {
        Self::new(id, title, None, TaskKind::Growth, None, None)
    }

    #[must_use]
    pub fn id(&self) -> TaskId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    #[must_use]
    pub fn progress_rule(&self) -> Option<&ProgressRule> {
        self.progress_rule.as_ref()
    }

    #[must_use]
    pub fn linked_metric(&self) -> Option<MetricId> {
        self.linked_metric
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::rule::{Comparator, ProgressRule};

    #[test]
    fn rejects_blank_titles() {
        let err = Task::plain(TaskId::new(), "   ").unwrap_err();
        assert_eq!(err, TaskError::EmptyTitle);
    }

    #[test]
    fn trims_title_and_drops_empty_description() {
        let task = Task::new(
            TaskId::new(),
            "  Read 10 pages  ",
            Some("  ".into()),
            TaskKind::Growth,
            None,
            None,
        )
        .unwrap();
        assert_eq!(task.title(), "Read 10 pages");
        assert_eq!(task.description(), None);
    }

    #[test]
    fn metric_link_requires_a_rule() {
        let err = Task::new(
            TaskId::new(),
            "Weigh in",
            None,
            TaskKind::Growth,
            None,
            Some(MetricId::new()),
        )
        .unwrap_err();
        assert_eq!(err, TaskError::DanglingMetricLink);

        let ok = Task::new(
            TaskId::new(),
            "Weigh in",
            None,
            TaskKind::Growth,
            Some(ProgressRule::Threshold {
                comparator: Comparator::Le,
                target: 180.0,
            }),
            Some(MetricId::new()),
        );
        assert!(ok.is_ok());
    }
}
