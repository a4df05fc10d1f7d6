use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::binding::{ComparisonMode, MetricBinding};
use crate::model::measurement::Measurement;

//
// ─── RULES ─────────────────────────────────────────────────────────────────────
//

/// Comparison operator for threshold rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    Ge,
    Le,
    Eq,
    Ne,
}

impl Comparator {
    #[must_use]
    pub fn holds(&self, value: f64, target: f64) -> bool {
        match self {
            Comparator::Ge => value >= target,
            Comparator::Le => value <= target,
            Comparator::Eq => value == target,
            Comparator::Ne => value != target,
        }
    }

    #[must_use]
    pub fn symbol(&self) -> &'static str {
        match self {
            Comparator::Ge => ">=",
            Comparator::Le => "<=",
            Comparator::Eq => "==",
            Comparator::Ne => "!=",
        }
    }
}

/// A gate a task must clear before the day's check-off counts as progress.
///
/// Rules are stored as JSON alongside the task row, so the enum is the wire
/// format as well as the domain type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ProgressRule {
    /// Today's value must beat the comparison value by at least this much.
    DeltaThreshold { minimum_improvement: f64 },
    /// Today's count must reach the minimum.
    CountMin { minimum_count: u32 },
    /// Today's boolean reading must match.
    Boolean { expected: bool },
    /// The sum of values over the trailing window must reach the target.
    RollingWindow { target_sum: f64, window_days: u32 },
    /// Today's value must satisfy the comparator against a fixed target.
    Threshold { comparator: Comparator, target: f64 },
}

/// Why a rule did not pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    NoMeasurement,
    InsufficientImprovement,
    BelowMinimum,
    ConditionNotMet,
    RollingWindowFailed,
}

impl BlockReason {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockReason::NoMeasurement => "no_measurement",
            BlockReason::InsufficientImprovement => "insufficient_improvement",
            BlockReason::BelowMinimum => "below_minimum",
            BlockReason::ConditionNotMet => "condition_not_met",
            BlockReason::RollingWindowFailed => "rolling_window_failed",
        }
    }
}

//
// ─── OUTCOME ───────────────────────────────────────────────────────────────────
//

/// Result of evaluating a progress rule for one day.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOutcome {
    passed: bool,
    block_reason: Option<BlockReason>,
    current: Option<f64>,
    comparison: Option<f64>,
    improvement: Option<f64>,
}

impl RuleOutcome {
    fn passed(current: Option<f64>, comparison: Option<f64>, improvement: Option<f64>) -> Self {
        Self {
            passed: true,
            block_reason: None,
            current,
            comparison,
            improvement,
        }
    }

    fn blocked(
        reason: BlockReason,
        current: Option<f64>,
        comparison: Option<f64>,
        improvement: Option<f64>,
    ) -> Self {
        Self {
            passed: false,
            block_reason: Some(reason),
            current,
            comparison,
            improvement,
        }
    }

    #[must_use]
    pub fn is_passed(&self) -> bool {
        self.passed
    }

    #[must_use]
    pub fn block_reason(&self) -> Option<BlockReason> {
        self.block_reason
    }

    #[must_use]
    pub fn current(&self) -> Option<f64> {
        self.current
    }

    #[must_use]
    pub fn comparison(&self) -> Option<f64> {
        self.comparison
    }

    #[must_use]
    pub fn improvement(&self) -> Option<f64> {
        self.improvement
    }
}

//
// ─── CONTEXT & EVALUATION ──────────────────────────────────────────────────────
//

/// Everything a rule needs to judge a day: the metric's binding, its history
/// in chronological order, and the program frame.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    binding: &'a MetricBinding,
    measurements: &'a [Measurement],
    program_start: NaiveDate,
    now: DateTime<Utc>,
}

impl<'a> RuleContext<'a> {
    #[must_use]
    pub fn new(
        binding: &'a MetricBinding,
        measurements: &'a [Measurement],
        program_start: NaiveDate,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            binding,
            measurements,
            program_start,
            now,
        }
    }

    /// The value a delta rule compares today against, per the binding's
    /// comparison mode. `None` when the history cannot supply one.
    #[must_use]
    pub fn comparison_value(&self, current: &Measurement) -> Option<f64> {
        match self.binding.comparison_mode() {
            ComparisonMode::Absolute => Some(self.binding.effective_baseline()),
            ComparisonMode::Relative => self
                .measurements
                .iter()
                .filter(|m| m.recorded_at() < current.recorded_at())
                .next_back()
                .map(Measurement::value),
            ComparisonMode::Rolling => self.rolling_average(),
            ComparisonMode::ProgramStart => {
                let start = self.program_start.and_time(chrono::NaiveTime::MIN).and_utc();
                self.measurements
                    .iter()
                    .find(|m| m.recorded_at() >= start)
                    .map(Measurement::value)
            }
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn rolling_average(&self) -> Option<f64> {
        let cutoff = self.now - Duration::days(i64::from(self.binding.window_days()));
        let recent: Vec<f64> = self
            .measurements
            .iter()
            .filter(|m| m.recorded_at() >= cutoff)
            .map(Measurement::value)
            .collect();
        if recent.is_empty() {
            return None;
        }
        Some(recent.iter().sum::<f64>() / recent.len() as f64)
    }
}

/// Evaluates a rule against today's measurement (if any).
///
/// Every variant blocks with `NoMeasurement` when nothing was recorded for
/// the day; rules never pass by default.
#[must_use]
pub fn evaluate(rule: &ProgressRule, ctx: &RuleContext<'_>, current: Option<&Measurement>) -> RuleOutcome {
    let Some(current) = current else {
        return RuleOutcome::blocked(BlockReason::NoMeasurement, None, None, None);
    };

    match rule {
        ProgressRule::DeltaThreshold {
            minimum_improvement,
        } => {
            let Some(comparison) = ctx.comparison_value(current) else {
                return RuleOutcome::blocked(
                    BlockReason::NoMeasurement,
                    Some(current.value()),
                    None,
                    None,
                );
            };
            let improvement = current.value() - comparison;
            if improvement >= *minimum_improvement {
                RuleOutcome::passed(Some(current.value()), Some(comparison), Some(improvement))
            } else {
                RuleOutcome::blocked(
                    BlockReason::InsufficientImprovement,
                    Some(current.value()),
                    Some(comparison),
                    Some(improvement),
                )
            }
        }

        ProgressRule::CountMin { minimum_count } => {
            let count = current.value();
            if count >= f64::from(*minimum_count) {
                RuleOutcome::passed(Some(count), Some(f64::from(*minimum_count)), None)
            } else {
                RuleOutcome::blocked(
                    BlockReason::BelowMinimum,
                    Some(count),
                    Some(f64::from(*minimum_count)),
                    None,
                )
            }
        }

        ProgressRule::Boolean { expected } => {
            if current.as_boolean() == *expected {
                RuleOutcome::passed(Some(current.value()), None, None)
            } else {
                RuleOutcome::blocked(BlockReason::ConditionNotMet, Some(current.value()), None, None)
            }
        }

        ProgressRule::RollingWindow {
            target_sum,
            window_days,
        } => {
            let cutoff = current.recorded_at() - Duration::days(i64::from(*window_days));
            let sum: f64 = ctx
                .measurements
                .iter()
                .filter(|m| m.recorded_at() >= cutoff && m.recorded_at() <= current.recorded_at())
                .map(Measurement::value)
                .sum();
            if sum >= *target_sum {
                RuleOutcome::passed(Some(sum), Some(*target_sum), None)
            } else {
                RuleOutcome::blocked(
                    BlockReason::RollingWindowFailed,
                    Some(sum),
                    Some(*target_sum),
                    None,
                )
            }
        }

        ProgressRule::Threshold { comparator, target } => {
            if comparator.holds(current.value(), *target) {
                RuleOutcome::passed(Some(current.value()), Some(*target), None)
            } else {
                RuleOutcome::blocked(
                    BlockReason::BelowMinimum,
                    Some(current.value()),
                    Some(*target),
                    None,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ids::{MeasurementId, MetricId};
    use crate::time::{fixed_now, fixed_today};

    fn record(metric: MetricId, days_ago: i64, value: f64) -> Measurement {
        Measurement::manual(
            MeasurementId::new(),
            metric,
            fixed_now() - Duration::days(days_ago),
            value,
        )
    }

    #[test]
    fn missing_measurement_blocks_every_rule() {
        let metric = MetricId::new();
        let binding = MetricBinding::relative(metric);
        let ctx = RuleContext::new(&binding, &[], fixed_today(), fixed_now());

        let rules = [
            ProgressRule::DeltaThreshold {
                minimum_improvement: 1.0,
            },
            ProgressRule::CountMin { minimum_count: 3 },
            ProgressRule::Boolean { expected: true },
            ProgressRule::RollingWindow {
                target_sum: 5.0,
                window_days: 7,
            },
            ProgressRule::Threshold {
                comparator: Comparator::Ge,
                target: 7.0,
            },
        ];
        for rule in &rules {
            let outcome = evaluate(rule, &ctx, None);
            assert!(!outcome.is_passed());
            assert_eq!(outcome.block_reason(), Some(BlockReason::NoMeasurement));
        }
    }

    #[test]
    fn delta_compares_against_the_previous_value() {
        let metric = MetricId::new();
        let binding = MetricBinding::relative(metric);
        let history = vec![record(metric, 1, 10.0), record(metric, 0, 12.5)];
        let ctx = RuleContext::new(&binding, &history, fixed_today(), fixed_now());
        let rule = ProgressRule::DeltaThreshold {
            minimum_improvement: 2.0,
        };

        let outcome = evaluate(&rule, &ctx, Some(&history[1]));
        assert!(outcome.is_passed());
        assert_eq!(outcome.improvement(), Some(2.5));
        assert_eq!(outcome.comparison(), Some(10.0));
    }

    #[test]
    fn delta_blocks_when_improvement_falls_short() {
        let metric = MetricId::new();
        let binding = MetricBinding::relative(metric);
        let history = vec![record(metric, 1, 10.0), record(metric, 0, 10.5)];
        let ctx = RuleContext::new(&binding, &history, fixed_today(), fixed_now());
        let rule = ProgressRule::DeltaThreshold {
            minimum_improvement: 2.0,
        };

        let outcome = evaluate(&rule, &ctx, Some(&history[1]));
        assert!(!outcome.is_passed());
        assert_eq!(
            outcome.block_reason(),
            Some(BlockReason::InsufficientImprovement)
        );
    }

    #[test]
    fn delta_against_a_fixed_baseline() {
        let metric = MetricId::new();
        let binding =
            MetricBinding::new(metric, Some(100.0), ComparisonMode::Absolute, 7).unwrap();
        let history = vec![record(metric, 0, 103.0)];
        let ctx = RuleContext::new(&binding, &history, fixed_today(), fixed_now());
        let rule = ProgressRule::DeltaThreshold {
            minimum_improvement: 2.0,
        };

        let outcome = evaluate(&rule, &ctx, Some(&history[0]));
        assert!(outcome.is_passed());
        assert_eq!(outcome.improvement(), Some(3.0));
    }

    #[test]
    fn count_min_requires_the_minimum() {
        let metric = MetricId::new();
        let binding = MetricBinding::relative(metric);
        let short = record(metric, 0, 2.0);
        let enough = record(metric, 0, 3.0);
        let ctx = RuleContext::new(&binding, &[], fixed_today(), fixed_now());
        let rule = ProgressRule::CountMin { minimum_count: 3 };

        assert!(!evaluate(&rule, &ctx, Some(&short)).is_passed());
        assert_eq!(
            evaluate(&rule, &ctx, Some(&short)).block_reason(),
            Some(BlockReason::BelowMinimum)
        );
        assert!(evaluate(&rule, &ctx, Some(&enough)).is_passed());
    }

    #[test]
    fn boolean_rule_matches_the_reading() {
        let metric = MetricId::new();
        let binding = MetricBinding::relative(metric);
        let ctx = RuleContext::new(&binding, &[], fixed_today(), fixed_now());
        let rule = ProgressRule::Boolean { expected: false };

        let phone_out = Measurement::manual_boolean(
            MeasurementId::new(),
            metric,
            fixed_now(),
            false,
        );
        assert!(evaluate(&rule, &ctx, Some(&phone_out)).is_passed());

        let phone_in =
            Measurement::manual_boolean(MeasurementId::new(), metric, fixed_now(), true);
        let outcome = evaluate(&rule, &ctx, Some(&phone_in));
        assert!(!outcome.is_passed());
        assert_eq!(outcome.block_reason(), Some(BlockReason::ConditionNotMet));
    }

    #[test]
    fn rolling_window_sums_the_trailing_days() {
        let metric = MetricId::new();
        let binding = MetricBinding::relative(metric);
        let history = vec![
            record(metric, 9, 4.0), // outside the window
            record(metric, 5, 2.0),
            record(metric, 2, 1.0),
            record(metric, 0, 1.0),
        ];
        let ctx = RuleContext::new(&binding, &history, fixed_today(), fixed_now());
        let rule = ProgressRule::RollingWindow {
            target_sum: 4.0,
            window_days: 7,
        };

        let outcome = evaluate(&rule, &ctx, Some(&history[3]));
        assert!(outcome.is_passed());
        assert_eq!(outcome.current(), Some(4.0));

        let strict = ProgressRule::RollingWindow {
            target_sum: 5.0,
            window_days: 7,
        };
        let outcome = evaluate(&strict, &ctx, Some(&history[3]));
        assert!(!outcome.is_passed());
        assert_eq!(
            outcome.block_reason(),
            Some(BlockReason::RollingWindowFailed)
        );
    }

    #[test]
    fn threshold_honors_each_comparator() {
        let metric = MetricId::new();
        let binding = MetricBinding::relative(metric);
        let ctx = RuleContext::new(&binding, &[], fixed_today(), fixed_now());
        let seven = record(metric, 0, 7.0);

        let ge = ProgressRule::Threshold {
            comparator: Comparator::Ge,
            target: 7.0,
        };
        let le = ProgressRule::Threshold {
            comparator: Comparator::Le,
            target: 6.0,
        };
        assert!(evaluate(&ge, &ctx, Some(&seven)).is_passed());
        assert!(!evaluate(&le, &ctx, Some(&seven)).is_passed());
    }

    #[test]
    fn rules_round_trip_through_json() {
        let rule = ProgressRule::Threshold {
            comparator: Comparator::Ge,
            target: 64.0,
        };
        let json = serde_json::to_string(&rule).unwrap();
        let back: ProgressRule = serde_json::from_str(&json).unwrap();
        assert_eq!(rule, back);
    }
}
