use std::sync::Arc;

use chrono::NaiveDate;
use rand::seq::IndexedRandom;
use tracing::{debug, warn};

use journey_core::Clock;
use journey_core::day::{
    DayRecord, active_date, current_streak, day_number, day_records, is_after_cutoff, missed_days,
};
use journey_core::model::{
    CelebrationStyle, DailyProgress, Program, ProgressId, TaskId, TaskKind,
};
use storage::repository::{
    AppSettingsRepository, DailyProgressRepository, ProgramRepository, StorageError,
};

use crate::error::ChecklistError;

//
// ─── VIEWS ─────────────────────────────────────────────────────────────────────
//

/// One row of the daily checklist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistRow {
    pub task_id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub kind: TaskKind,
    pub completed: bool,
    pub has_rule: bool,
}

/// Everything the daily screen needs, computed at read time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodayView {
    pub date: NaiveDate,
    pub day_number: u32,
    pub total_days: u32,
    pub rows: Vec<ChecklistRow>,
    pub is_complete: bool,
    pub after_cutoff: bool,
}

/// Outcome of a toggle, including whether it just finished the day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub now_completed: bool,
    pub day_complete: bool,
    /// Present when the toggle completed the full set and celebrations are
    /// enabled. `Random` is already resolved to a concrete style.
    pub celebration: Option<CelebrationStyle>,
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// The daily interaction surface: today's checklist, toggles, the program
/// calendar, missed days, and streaks.
#[derive(Clone)]
pub struct ChecklistService {
    clock: Clock,
    programs: Arc<dyn ProgramRepository>,
    daily_progress: Arc<dyn DailyProgressRepository>,
    app_settings: Arc<dyn AppSettingsRepository>,
}

impl ChecklistService {
    #[must_use]
    pub fn new(
        clock: Clock,
        programs: Arc<dyn ProgramRepository>,
        daily_progress: Arc<dyn DailyProgressRepository>,
        app_settings: Arc<dyn AppSettingsRepository>,
    ) -> Self {
        Self {
            clock,
            programs,
            daily_progress,
            app_settings,
        }
    }

    async fn require_program(&self) -> Result<Program, ChecklistError> {
        match self.programs.load_program().await {
            Ok(Some(program)) => Ok(program),
            // A malformed record reads as absent, per the storage policy.
            Ok(None) => Err(ChecklistError::NoProgram),
            Err(StorageError::Serialization(detail)) => {
                warn!(%detail, "saved program is malformed, treating as absent");
                Err(ChecklistError::NoProgram)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn progress_for(
        &self,
        date: NaiveDate,
    ) -> Result<Option<DailyProgress>, ChecklistError> {
        match self.daily_progress.get_progress(date).await {
            Ok(progress) => Ok(progress),
            Err(StorageError::Serialization(detail)) => {
                warn!(%date, %detail, "daily record is malformed, treating as absent");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn progress_in_program(
        &self,
        program: &Program,
    ) -> Result<Vec<DailyProgress>, ChecklistError> {
        let mut records = self
            .daily_progress
            .list_progress(Some(program.start_date()), Some(program.last_date()))
            .await?;
        for record in &mut records {
            record.retain_known(program);
        }
        Ok(records)
    }

    /// Today's checklist.
    ///
    /// # Errors
    ///
    /// Returns `ChecklistError::NoProgram` when no program is saved, or
    /// storage errors.
    pub async fn today_view(&self) -> Result<TodayView, ChecklistError> {
        let program = self.require_program().await?;
        let now = self.clock.now();
        let date = active_date(now);

        let mut progress = self.progress_for(date).await?;
        if let Some(p) = progress.as_mut() {
            p.retain_known(&program);
        }

        let rows = program
            .tasks()
            .iter()
            .map(|task| ChecklistRow {
                task_id: task.id(),
                title: task.title().to_string(),
                description: task.description().map(ToString::to_string),
                kind: task.kind(),
                completed: progress.as_ref().is_some_and(|p| p.is_completed(task.id())),
                has_rule: task.progress_rule().is_some(),
            })
            .collect();

        let is_complete = progress.as_ref().is_some_and(|p| p.is_complete(&program));

        Ok(TodayView {
            date,
            day_number: day_number(date, &program),
            total_days: program.number_of_days(),
            rows,
            is_complete,
            after_cutoff: is_after_cutoff(now, program.end_of_day()),
        })
    }

    /// Toggle a task's completion for a date, creating the day's record
    /// lazily on first interaction.
    ///
    /// # Errors
    ///
    /// Returns `ChecklistError::UnknownTask` for a task outside the
    /// program, `ChecklistError::OutOfProgram` for a date outside it, or
    /// storage errors.
    pub async fn toggle_task(
        &self,
        date: NaiveDate,
        task: TaskId,
    ) -> Result<ToggleOutcome, ChecklistError> {
        let program = self.require_program().await?;
        if !program.contains_task(task) {
            return Err(ChecklistError::UnknownTask(task));
        }
        if date < program.start_date() || date > program.last_date() {
            return Err(ChecklistError::OutOfProgram(date));
        }

        let mut progress = match self.progress_for(date).await? {
            Some(mut existing) => {
                existing.retain_known(&program);
                existing
            }
            None => DailyProgress::new(ProgressId::new(), date),
        };

        let was_complete = progress.is_complete(&program);
        let now_completed = progress.toggle(task);
        self.daily_progress.upsert_progress(&progress).await?;

        let day_complete = progress.is_complete(&program);
        debug!(%date, completed = now_completed, day_complete, "toggled task");

        let celebration = if day_complete && !was_complete {
            self.celebration_style().await?
        } else {
            None
        };

        Ok(ToggleOutcome {
            now_completed,
            day_complete,
            celebration,
        })
    }

    async fn celebration_style(&self) -> Result<Option<CelebrationStyle>, ChecklistError> {
        let settings = self
            .app_settings
            .get_settings()
            .await?
            .unwrap_or_default();
        if !settings.celebration_enabled() {
            return Ok(None);
        }
        let style = match settings.celebration_style() {
            CelebrationStyle::Random => CelebrationStyle::CONCRETE
                .choose(&mut rand::rng())
                .copied()
                .unwrap_or(CelebrationStyle::Confetti),
            concrete => concrete,
        };
        Ok(Some(style))
    }

    /// Read-time status for every program day (the calendar view's data).
    ///
    /// # Errors
    ///
    /// Returns `ChecklistError::NoProgram` when no program is saved, or
    /// storage errors.
    pub async fn day_overview(&self) -> Result<Vec<DayRecord>, ChecklistError> {
        let program = self.require_program().await?;
        let progress = self.progress_in_program(&program).await?;
        Ok(day_records(&program, &progress, self.clock.now()))
    }

    /// Dates of every missed day so far, earliest first.
    ///
    /// # Errors
    ///
    /// Returns `ChecklistError::NoProgram` when no program is saved, or
    /// storage errors.
    pub async fn missed_days(&self) -> Result<Vec<NaiveDate>, ChecklistError> {
        let program = self.require_program().await?;
        let progress = self.progress_in_program(&program).await?;
        Ok(missed_days(&program, &progress, self.clock.now()))
    }

    /// Re-evaluates missed days and keeps the persisted marker pointing at
    /// the earliest one, so the missed-day prompt survives a relaunch.
    /// Returns the marker.
    ///
    /// # Errors
    ///
    /// Returns `ChecklistError::NoProgram` when no program is saved, or
    /// storage errors.
    pub async fn refresh_missed_day_marker(&self) -> Result<Option<NaiveDate>, ChecklistError> {
        let missed = self.missed_days().await?;
        let earliest = missed.first().copied();

        let stored = self.daily_progress.get_earliest_missed_day().await?;
        if stored != earliest {
            self.daily_progress.set_earliest_missed_day(earliest).await?;
        }
        Ok(earliest)
    }

    /// Clears the missed-day marker after the user elects to continue.
    ///
    /// # Errors
    ///
    /// Returns storage errors.
    pub async fn continue_after_missed_day(&self) -> Result<(), ChecklistError> {
        self.daily_progress.set_earliest_missed_day(None).await?;
        Ok(())
    }

    /// Consecutive fully-completed days ending at the active day.
    ///
    /// # Errors
    ///
    /// Returns `ChecklistError::NoProgram` when no program is saved, or
    /// storage errors.
    pub async fn current_streak(&self) -> Result<u32, ChecklistError> {
        let program = self.require_program().await?;
        let progress = self.progress_in_program(&program).await?;
        Ok(current_streak(&program, &progress, self.clock.now()))
    }

    /// Whether `now` has passed the active day's cutoff. Exposed for the
    /// shell so the missed-day prompt condition matches the model's.
    ///
    /// # Errors
    ///
    /// Returns `ChecklistError::NoProgram` when no program is saved, or
    /// storage errors.
    pub async fn after_cutoff(&self) -> Result<bool, ChecklistError> {
        let program = self.require_program().await?;
        Ok(is_after_cutoff(self.clock.now(), program.end_of_day()))
    }
}
