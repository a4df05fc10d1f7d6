mod app_settings;
mod binding;
mod daily_progress;
mod ids;
mod measurement;
mod metric;
mod program;
mod rule;
mod task;
mod template;

pub use ids::{
    MeasurementId, MetricId, ParseIdError, ProgramId, ProgressId, TaskId, TemplateId,
};

pub use app_settings::{AppSettings, AppSettingsError, CelebrationStyle, ThemeMode};
pub use binding::{BindingError, ComparisonMode, MetricBinding};
pub use daily_progress::DailyProgress;
pub use measurement::{Measurement, MeasurementSource};
pub use metric::{default_metrics, Metric, MetricDirection, MetricError, MetricKind};
pub use program::{Program, ProgramError};
pub use rule::{
    evaluate, BlockReason, Comparator, ProgressRule, RuleContext, RuleOutcome,
};
pub use task::{Task, TaskError, TaskKind};
pub use template::{
    builtin_templates, ProgramTemplate, TemplateCategory, TemplateError, TemplateTask,
};
