use chrono::{DateTime, Utc};

use crate::model::ids::{MeasurementId, MetricId};

/// Where a measurement came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeasurementSource {
    #[default]
    Manual,
    HealthImport,
    GarminImport,
    OuraImport,
    StravaImport,
}

impl MeasurementSource {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementSource::Manual => "manual",
            MeasurementSource::HealthImport => "import_health",
            MeasurementSource::GarminImport => "import_garmin",
            MeasurementSource::OuraImport => "import_oura",
            MeasurementSource::StravaImport => "import_strava",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "manual" => Some(MeasurementSource::Manual),
            "import_health" => Some(MeasurementSource::HealthImport),
            "import_garmin" => Some(MeasurementSource::GarminImport),
            "import_oura" => Some(MeasurementSource::OuraImport),
            "import_strava" => Some(MeasurementSource::StravaImport),
            _ => None,
        }
    }
}

/// One recorded value for a metric.
///
/// Boolean metrics carry `boolean_value` alongside a 0/1 numeric value so
/// every rule variant can read `value` uniformly.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    id: MeasurementId,
    metric_id: MetricId,
    recorded_at: DateTime<Utc>,
    value: f64,
    boolean_value: Option<bool>,
    source: MeasurementSource,
    notes: Option<String>,
}

impl Measurement {
    #[must_use]
    pub fn new(
        id: MeasurementId,
        metric_id: MetricId,
        recorded_at: DateTime<Utc>,
        value: f64,
        boolean_value: Option<bool>,
        source: MeasurementSource,
        notes: Option<String>,
    ) -> Self {
        let notes = notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        Self {
            id,
            metric_id,
            recorded_at,
            value,
            boolean_value,
            source,
            notes,
        }
    }

    /// Convenience constructor for a manual numeric entry.
    #[must_use]
    pub fn manual(
        id: MeasurementId,
        metric_id: MetricId,
        recorded_at: DateTime<Utc>,
        value: f64,
    ) -> Self {
        Self::new(
            id,
            metric_id,
            recorded_at,
            value,
            None,
            MeasurementSource::Manual,
            None,
        )
    }

    /// Convenience constructor for a manual boolean entry.
    #[must_use]
    pub fn manual_boolean(
        id: MeasurementId,
        metric_id: MetricId,
        recorded_at: DateTime<Utc>,
        value: bool,
    ) -> Self {
        Self::new(
            id,
            metric_id,
            recorded_at,
            if value { 1.0 } else { 0.0 },
            Some(value),
            MeasurementSource::Manual,
            None,
        )
    }

    #[must_use]
    pub fn id(&self) -> MeasurementId {
        self.id
    }

    #[must_use]
    pub fn metric_id(&self) -> MetricId {
        self.metric_id
    }

    #[must_use]
    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[must_use]
    pub fn boolean_value(&self) -> Option<bool> {
        self.boolean_value
    }

    /// Boolean reading: the explicit flag if present, otherwise value > 0.
    #[must_use]
    pub fn as_boolean(&self) -> bool {
        self.boolean_value.unwrap_or(self.value > 0.0)
    }

    #[must_use]
    pub fn source(&self) -> MeasurementSource {
        self.source
    }

    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}
