use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use tracing::debug;

use journey_core::Clock;
use journey_core::model::{
    evaluate, default_metrics, Measurement, MeasurementId, MeasurementSource, Metric,
    MetricBinding, MetricDirection, MetricId, MetricKind, RuleContext, RuleOutcome, Task,
};
use storage::repository::{MeasurementRepository, MetricRepository};

use crate::error::MetricsServiceError;

/// Metric definitions, measurement capture, and rule evaluation.
#[derive(Clone)]
pub struct MetricsService {
    clock: Clock,
    metrics: Arc<dyn MetricRepository>,
    measurements: Arc<dyn MeasurementRepository>,
}

impl MetricsService {
    #[must_use]
    pub fn new(
        clock: Clock,
        metrics: Arc<dyn MetricRepository>,
        measurements: Arc<dyn MeasurementRepository>,
    ) -> Self {
        Self {
            clock,
            metrics,
            measurements,
        }
    }

    /// Seeds the starter metrics once; an existing catalog is left alone.
    ///
    /// # Errors
    ///
    /// Returns `MetricsServiceError` on validation or storage failures.
    pub async fn seed_defaults(&self) -> Result<(), MetricsServiceError> {
        if !self.metrics.list_metrics(true).await?.is_empty() {
            return Ok(());
        }
        for metric in default_metrics(self.clock.now())? {
            self.metrics.upsert_metric(&metric).await?;
        }
        debug!("seeded default metrics");
        Ok(())
    }

    /// Defines a new metric.
    ///
    /// # Errors
    ///
    /// Returns `MetricsServiceError` on validation or storage failures.
    pub async fn define_metric(
        &self,
        name: &str,
        description: Option<String>,
        unit: &str,
        direction: MetricDirection,
        kind: MetricKind,
    ) -> Result<Metric, MetricsServiceError> {
        let metric = Metric::new(
            MetricId::new(),
            name,
            description,
            unit,
            direction,
            kind,
            self.clock.now(),
        )?;
        self.metrics.upsert_metric(&metric).await?;
        Ok(metric)
    }

    /// Archives or unarchives a metric.
    ///
    /// # Errors
    ///
    /// Returns `MetricsServiceError::UnknownMetric` if absent, or storage
    /// failures.
    pub async fn set_archived(
        &self,
        id: MetricId,
        archived: bool,
    ) -> Result<Metric, MetricsServiceError> {
        let mut metric = self
            .metrics
            .get_metric(id)
            .await?
            .ok_or(MetricsServiceError::UnknownMetric(id))?;
        metric.set_archived(archived);
        self.metrics.upsert_metric(&metric).await?;
        Ok(metric)
    }

    /// Active metrics, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns `MetricsServiceError` on storage failures.
    pub async fn list_metrics(&self) -> Result<Vec<Metric>, MetricsServiceError> {
        Ok(self.metrics.list_metrics(false).await?)
    }

    /// Configures how a metric is judged for the current program.
    ///
    /// # Errors
    ///
    /// Returns `MetricsServiceError::UnknownMetric` if absent, or storage
    /// failures.
    pub async fn bind_metric(&self, binding: MetricBinding) -> Result<(), MetricsServiceError> {
        if self.metrics.get_metric(binding.metric_id()).await?.is_none() {
            return Err(MetricsServiceError::UnknownMetric(binding.metric_id()));
        }
        self.metrics.upsert_binding(&binding).await?;
        Ok(())
    }

    /// Records a numeric value at the clock's now.
    ///
    /// # Errors
    ///
    /// Returns `MetricsServiceError::UnknownMetric` if absent, or storage
    /// failures.
    pub async fn record_value(
        &self,
        metric_id: MetricId,
        value: f64,
        notes: Option<String>,
    ) -> Result<Measurement, MetricsServiceError> {
        if self.metrics.get_metric(metric_id).await?.is_none() {
            return Err(MetricsServiceError::UnknownMetric(metric_id));
        }
        let measurement = Measurement::new(
            MeasurementId::new(),
            metric_id,
            self.clock.now(),
            value,
            None,
            MeasurementSource::Manual,
            notes,
        );
        self.measurements.append_measurement(&measurement).await?;
        Ok(measurement)
    }

    /// Records a boolean reading at the clock's now.
    ///
    /// # Errors
    ///
    /// Returns `MetricsServiceError::UnknownMetric` if absent, or storage
    /// failures.
    pub async fn record_boolean(
        &self,
        metric_id: MetricId,
        value: bool,
    ) -> Result<Measurement, MetricsServiceError> {
        if self.metrics.get_metric(metric_id).await?.is_none() {
            return Err(MetricsServiceError::UnknownMetric(metric_id));
        }
        let measurement = Measurement::manual_boolean(
            MeasurementId::new(),
            metric_id,
            self.clock.now(),
            value,
        );
        self.measurements.append_measurement(&measurement).await?;
        Ok(measurement)
    }

    /// Chronological history for a metric.
    ///
    /// # Errors
    ///
    /// Returns `MetricsServiceError` on storage failures.
    pub async fn history(
        &self,
        metric_id: MetricId,
    ) -> Result<Vec<Measurement>, MetricsServiceError> {
        Ok(self.measurements.measurements_for(metric_id, None, None).await?)
    }

    /// Evaluates a rule-bearing task for a calendar day.
    ///
    /// The "current" measurement is the latest one recorded on that day;
    /// the history handed to the rule runs up to the end of the day so a
    /// later relaunch reproduces the same verdict.
    ///
    /// # Errors
    ///
    /// Returns `MetricsServiceError::NoRule`/`NoLinkedMetric` when the
    /// task has nothing to evaluate, or storage failures.
    pub async fn evaluate_task(
        &self,
        task: &Task,
        program_start: NaiveDate,
        date: NaiveDate,
    ) -> Result<RuleOutcome, MetricsServiceError> {
        let rule = task.progress_rule().ok_or(MetricsServiceError::NoRule)?;
        let metric_id = task
            .linked_metric()
            .ok_or(MetricsServiceError::NoLinkedMetric)?;

        let binding = self
            .metrics
            .binding_for(metric_id)
            .await?
            .unwrap_or_else(|| MetricBinding::relative(metric_id));

        let day_start = date.and_time(NaiveTime::MIN).and_utc();
        let day_end = day_start + Duration::days(1) - Duration::seconds(1);

        let history = self
            .measurements
            .measurements_for(metric_id, None, Some(day_end))
            .await?;
        let current = history
            .iter()
            .filter(|m| m.recorded_at() >= day_start)
            .next_back();

        let now: DateTime<Utc> = day_end;
        let ctx = RuleContext::new(&binding, &history, program_start, now);
        Ok(evaluate(rule, &ctx, current))
    }
}
