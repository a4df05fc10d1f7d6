use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::MetricId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MetricError {
    #[error("metric name cannot be empty")]
    EmptyName,
}

/// Which way a metric should move to count as improvement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricDirection {
    Increase,
    Decrease,
}

impl MetricDirection {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricDirection::Increase => "increase",
            MetricDirection::Decrease => "decrease",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "increase" => Some(MetricDirection::Increase),
            "decrease" => Some(MetricDirection::Decrease),
            _ => None,
        }
    }
}

/// The shape of a metric's recorded values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Number,
    Boolean,
    Count,
}

impl MetricKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Number => "number",
            MetricKind::Boolean => "boolean",
            MetricKind::Count => "count",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "number" => Some(MetricKind::Number),
            "boolean" => Some(MetricKind::Boolean),
            "count" => Some(MetricKind::Count),
            _ => None,
        }
    }
}

/// A trackable quantity that progress rules can evaluate against.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    id: MetricId,
    name: String,
    description: Option<String>,
    unit: String,
    direction: MetricDirection,
    kind: MetricKind,
    created_at: DateTime<Utc>,
    archived: bool,
}

impl Metric {
    /// Creates a validated metric.
    ///
    /// # Errors
    ///
    /// Returns `MetricError::EmptyName` if the name is empty after trimming.
    pub fn new(
        id: MetricId,
        name: impl Into<String>,
        description: Option<String>,
        unit: impl Into<String>,
        direction: MetricDirection,
        kind: MetricKind,
        created_at: DateTime<Utc>,
    ) -> Result<Self, MetricError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(MetricError::EmptyName);
        }
        let description = description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Ok(Self {
            id,
            name,
            description,
            unit: unit.into().trim().to_string(),
            direction,
            kind,
            created_at,
            archived: false,
        })
    }

    /// Rehydrates a metric from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `MetricError` if the stored name no longer validates.
    pub fn from_persisted(
        id: MetricId,
        name: String,
        description: Option<String>,
        unit: String,
        direction: MetricDirection,
        kind: MetricKind,
        created_at: DateTime<Utc>,
        archived: bool,
    ) -> Result<Self, MetricError> {
        let mut metric = Self::new(id, name, description, unit, direction, kind, created_at)?;
        metric.archived = archived;
        Ok(metric)
    }

    #[must_use]
    pub fn id(&self) -> MetricId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn unit(&self) -> &str {
        &self.unit
    }

    #[must_use]
    pub fn direction(&self) -> MetricDirection {
        self.direction
    }

    #[must_use]
    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn is_archived(&self) -> bool {
        self.archived
    }

    /// Archives or unarchives the metric.
    pub fn set_archived(&mut self, archived: bool) {
        self.archived = archived;
    }

    /// Name with unit attached, as shown in pickers.
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.unit.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.unit)
        }
    }
}

/// Starter metrics seeded on first launch.
///
/// # Errors
///
/// Never fails in practice; the signature keeps construction honest.
pub fn default_metrics(now: DateTime<Utc>) -> Result<Vec<Metric>, MetricError> {
    Ok(vec![
        Metric::new(
            MetricId::new(),
            "Sleep Hours",
            Some("Hours of sleep per night".into()),
            "hrs",
            MetricDirection::Increase,
            MetricKind::Number,
            now,
        )?,
        Metric::new(
            MetricId::new(),
            "Weight",
            Some("Body weight".into()),
            "lbs",
            MetricDirection::Decrease,
            MetricKind::Number,
            now,
        )?,
        Metric::new(
            MetricId::new(),
            "Steps",
            Some("Daily step count".into()),
            "steps",
            MetricDirection::Increase,
            MetricKind::Count,
            now,
        )?,
        Metric::new(
            MetricId::new(),
            "Water",
            Some("Glasses of water".into()),
            "glasses",
            MetricDirection::Increase,
            MetricKind::Count,
            now,
        )?,
    ])
}
