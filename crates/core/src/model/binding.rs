use thiserror::Error;

use crate::model::ids::MetricId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BindingError {
    #[error("rolling window must cover at least one day")]
    InvalidWindow,
}

/// What a delta rule compares the current value against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComparisonMode {
    /// A fixed baseline configured on the binding.
    Absolute,
    /// The previous recorded value.
    #[default]
    Relative,
    /// The rolling average over the binding's window.
    Rolling,
    /// The first value recorded at or after program start.
    ProgramStart,
}

impl ComparisonMode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonMode::Absolute => "absolute",
            ComparisonMode::Relative => "relative",
            ComparisonMode::Rolling => "rolling",
            ComparisonMode::ProgramStart => "program_start",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "absolute" => Some(ComparisonMode::Absolute),
            "relative" => Some(ComparisonMode::Relative),
            "rolling" => Some(ComparisonMode::Rolling),
            "program_start" => Some(ComparisonMode::ProgramStart),
            _ => None,
        }
    }
}

/// Per-program configuration for how a metric is judged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricBinding {
    metric_id: MetricId,
    baseline: Option<f64>,
    comparison_mode: ComparisonMode,
    window_days: u32,
}

impl MetricBinding {
    /// Creates a validated binding.
    ///
    /// # Errors
    ///
    /// Returns `BindingError::InvalidWindow` if the rolling window is zero.
    pub fn new(
        metric_id: MetricId,
        baseline: Option<f64>,
        comparison_mode: ComparisonMode,
        window_days: u32,
    ) -> Result<Self, BindingError> {
        if window_days == 0 {
            return Err(BindingError::InvalidWindow);
        }
        Ok(Self {
            metric_id,
            baseline,
            comparison_mode,
            window_days,
        })
    }

    /// Binding with the defaults the original setup flow used: relative
    /// comparison over a 7-day window, no baseline.
    #[must_use]
    pub fn relative(metric_id: MetricId) -> Self {
        Self {
            metric_id,
            baseline: None,
            comparison_mode: ComparisonMode::Relative,
            window_days: 7,
        }
    }

    #[must_use]
    pub fn metric_id(&self) -> MetricId {
        self.metric_id
    }

    #[must_use]
    pub fn baseline(&self) -> Option<f64> {
        self.baseline
    }

    /// Baseline with the zero fallback used by absolute comparisons.
    #[must_use]
    pub fn effective_baseline(&self) -> f64 {
        self.baseline.unwrap_or(0.0)
    }

    #[must_use]
    pub fn comparison_mode(&self) -> ComparisonMode {
        self.comparison_mode
    }

    #[must_use]
    pub fn window_days(&self) -> u32 {
        self.window_days
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_day_windows() {
        let err =
            MetricBinding::new(MetricId::new(), None, ComparisonMode::Rolling, 0).unwrap_err();
        assert_eq!(err, BindingError::InvalidWindow);
    }

    #[test]
    fn relative_defaults_use_a_week() {
        let binding = MetricBinding::relative(MetricId::new());
        assert_eq!(binding.comparison_mode(), ComparisonMode::Relative);
        assert_eq!(binding.window_days(), 7);
        assert_eq!(binding.effective_baseline(), 0.0);
    }
}
