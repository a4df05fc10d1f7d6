use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::day::EndOfDay;
use crate::model::ids::{ProgramId, TaskId, TemplateId};
use crate::model::program::{Program, ProgramError};
use crate::model::rule::ProgressRule;
use crate::model::task::{Task, TaskError, TaskKind};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TemplateError {
    #[error("template name cannot be empty")]
    EmptyName,

    #[error("template must default to at least one day")]
    InvalidDefaultDays,

    #[error("template needs at least one task")]
    NoTasks,

    #[error(transparent)]
    Task(#[from] TaskError),

    #[error(transparent)]
    Program(#[from] ProgramError),
}

/// Category shown in the template picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateCategory {
    Health,
    Productivity,
    Learning,
    Mindfulness,
    Relationships,
    Finance,
    Custom,
}

impl TemplateCategory {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateCategory::Health => "health",
            TemplateCategory::Productivity => "productivity",
            TemplateCategory::Learning => "learning",
            TemplateCategory::Mindfulness => "mindfulness",
            TemplateCategory::Relationships => "relationships",
            TemplateCategory::Finance => "finance",
            TemplateCategory::Custom => "custom",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "health" => Some(TemplateCategory::Health),
            "productivity" => Some(TemplateCategory::Productivity),
            "learning" => Some(TemplateCategory::Learning),
            "mindfulness" => Some(TemplateCategory::Mindfulness),
            "relationships" => Some(TemplateCategory::Relationships),
            "finance" => Some(TemplateCategory::Finance),
            "custom" => Some(TemplateCategory::Custom),
            _ => None,
        }
    }

    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            TemplateCategory::Health => "Health & Fitness",
            TemplateCategory::Productivity => "Productivity",
            TemplateCategory::Learning => "Learning & Skills",
            TemplateCategory::Mindfulness => "Mindfulness",
            TemplateCategory::Relationships => "Relationships",
            TemplateCategory::Finance => "Finance",
            TemplateCategory::Custom => "Custom",
        }
    }
}

/// A task blueprint inside a template. Carries no identity; instantiation
/// mints fresh task ids so two programs never share them.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateTask {
    title: String,
    description: Option<String>,
    kind: TaskKind,
    progress_rule: Option<ProgressRule>,
}

impl TemplateTask {
    /// Creates a validated blueprint.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::EmptyTitle` if the title is empty after trimming.
    pub fn new(
        title: impl Into<String>,
        description: Option<String>,
        kind: TaskKind,
        progress_rule: Option<ProgressRule>,
    ) -> Result<Self, TaskError> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(TaskError::EmptyTitle);
        }
        Ok(Self {
            title,
            description: description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            kind,
            progress_rule,
        })
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
}

/// A reusable program blueprint.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramTemplate {
    id: TemplateId,
    name: String,
    description: String,
    category: TemplateCategory,
    default_number_of_days: u32,
    tasks: Vec<TemplateTask>,
    builtin: bool,
    last_modified: DateTime<Utc>,
}

impl ProgramTemplate {
    /// Creates a validated template.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError` on an empty name, zero default days, or an
    /// empty task list.
    pub fn new(
        id: TemplateId,
        name: impl Into<String>,
        description: impl Into<String>,
        category: TemplateCategory,
        default_number_of_days: u32,
        tasks: Vec<TemplateTask>,
        builtin: bool,
        last_modified: DateTime<Utc>,
    ) -> Result<Self, TemplateError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(TemplateError::EmptyName);
        }
        if default_number_of_days == 0 {
            return Err(TemplateError::InvalidDefaultDays);
        }
        if tasks.is_empty() {
            return Err(TemplateError::NoTasks);
        }

        Ok(Self {
            id,
            name,
            description: description.into().trim().to_string(),
            category,
            default_number_of_days,
            tasks,
            builtin,
            last_modified,
        })
    }

    #[must_use]
    pub fn id(&self) -> TemplateId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn category(&self) -> TemplateCategory {
        self.category
    }

    #[must_use]
    pub fn default_number_of_days(&self) -> u32 {
        self.default_number_of_days
    }

    #[must_use]
    pub fn tasks(&self) -> &[TemplateTask] {
        &self.tasks
    }

    #[must_use]
    pub fn is_builtin(&self) -> bool {
        self.builtin
    }

    #[must_use]
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    /// Instantiates the template into a program with fresh identity.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError` when a blueprint task or the resulting
    /// program fails validation.
    pub fn instantiate(
        &self,
        start_date: NaiveDate,
        end_of_day: EndOfDay,
        number_of_days: Option<u32>,
    ) -> Result<Program, TemplateError> {
        let mut tasks = Vec::with_capacity(self.tasks.len());
        for blueprint in &self.tasks {
            tasks.push(Task::new(
                TaskId::new(),
                blueprint.title(),
                blueprint.description().map(ToString::to_string),
                blueprint.kind(),
                blueprint.progress_rule().cloned(),
                None,
            )?);
        }

        let days = number_of_days.unwrap_or(self.default_number_of_days);
        Ok(Program::new(
            ProgramId::new(),
            start_date,
            days,
            end_of_day,
            tasks,
        )?)
    }
}

/// Templates seeded on first launch.
///
/// # Errors
///
/// Never fails in practice; the signature keeps construction honest.
pub fn builtin_templates(now: DateTime<Utc>) -> Result<Vec<ProgramTemplate>, TemplateError> {
    let hard_reset = ProgramTemplate::new(
        TemplateId::new(),
        "Hard Reset",
        "Seventy-five days of non-negotiables",
        TemplateCategory::Health,
        75,
        vec![
            TemplateTask::new("Workout", Some("45 minutes, any intensity".into()), TaskKind::Growth, None)?,
            TemplateTask::new("Drink Water", Some("A gallon across the day".into()), TaskKind::Maintenance, None)?,
            TemplateTask::new("Read 10 pages", None, TaskKind::Growth, None)?,
            TemplateTask::new("Follow the diet", None, TaskKind::Maintenance, None)?,
        ],
        true,
        now,
    )?;

    let morning_routine = ProgramTemplate::new(
        TemplateId::new(),
        "Morning Routine",
        "Thirty days of consistent starts",
        TemplateCategory::Productivity,
        30,
        vec![
            TemplateTask::new("Wake before 7", None, TaskKind::Growth, None)?,
            TemplateTask::new("Make the bed", None, TaskKind::Maintenance, None)?,
            TemplateTask::new("Plan the day", Some("Three priorities, written down".into()), TaskKind::Growth, None)?,
        ],
        true,
        now,
    )?;

    let mindful_start = ProgramTemplate::new(
        TemplateId::new(),
        "Mindful Start",
        "Three weeks of small quiet habits",
        TemplateCategory::Mindfulness,
        21,
        vec![
            TemplateTask::new("Meditate", Some("Ten minutes".into()), TaskKind::Growth, None)?,
            TemplateTask::new("Journal", None, TaskKind::Recovery, None)?,
        ],
        true,
        now,
    )?;

    Ok(vec![hard_reset, morning_routine, mindful_start])
}
