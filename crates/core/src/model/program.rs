use std::collections::HashSet;

use chrono::{Duration, NaiveDate};
use thiserror::Error;

use crate::day::EndOfDay;
use crate::model::ids::{ProgramId, TaskId};
use crate::model::task::Task;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgramError {
    #[error("a program must run for at least one day")]
    InvalidNumberOfDays,

    #[error("a program needs at least one task")]
    NoTasks,

    #[error("duplicate task id: {0}")]
    DuplicateTask(TaskId),
}

/// A user-defined multi-day habit plan with a fixed task list.
///
/// Immutable once saved except by full replacement: editing a program means
/// saving a new one over it. The task list order is the checklist order.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    id: ProgramId,
    start_date: NaiveDate,
    number_of_days: u32,
    end_of_day: EndOfDay,
    tasks: Vec<Task>,
}

impl Program {
    /// Creates a validated program.
    ///
    /// # Errors
    ///
    /// Returns `ProgramError` if the day count is zero, the task list is
    /// empty, or two tasks share an id.
    pub fn new(
        id: ProgramId,
        start_date: NaiveDate,
        number_of_days: u32,
        end_of_day: EndOfDay,
        tasks: Vec<Task>,
    ) -> Result<Self, ProgramError> {
        if number_of_days == 0 {
            return Err(ProgramError::InvalidNumberOfDays);
        }
        if tasks.is_empty() {
            return Err(ProgramError::NoTasks);
        }
        let mut seen = HashSet::with_capacity(tasks.len());
        for task in &tasks {
            if !seen.insert(task.id()) {
                return Err(ProgramError::DuplicateTask(task.id()));
            }
        }

        Ok(Self {
            id,
            start_date,
            number_of_days,
            end_of_day,
            tasks,
        })
    }

    /// Rehydrates a program from persisted storage, re-running validation.
    ///
    /// # Errors
    ///
    /// Returns `ProgramError` if the stored state no longer validates.
    pub fn from_persisted(
        id: ProgramId,
        start_date: NaiveDate,
        number_of_days: u32,
        end_of_day: EndOfDay,
        tasks: Vec<Task>,
    ) -> Result<Self, ProgramError> {
        Self::new(id, start_date, number_of_days, end_of_day, tasks)
    }

    #[must_use]
    pub fn id(&self) -> ProgramId {
        self.id
    }

    #[must_use]
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    #[must_use]
    pub fn number_of_days(&self) -> u32 {
        self.number_of_days
    }

    #[must_use]
    pub fn end_of_day(&self) -> EndOfDay {
        self.end_of_day
    }

    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Looks up a task by id.
    #[must_use]
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id() == id)
    }

    /// Whether the given task belongs to this program.
    #[must_use]
    pub fn contains_task(&self, id: TaskId) -> bool {
        self.task(id).is_some()
    }

    /// The ids of every task, in checklist order.
    #[must_use]
    pub fn task_ids(&self) -> Vec<TaskId> {
        self.tasks.iter().map(Task::id).collect()
    }

    /// Calendar date of the given 1-based day number, if within the program.
    #[must_use]
    pub fn date_of_day(&self, day_number: u32) -> Option<NaiveDate> {
        if day_number == 0 || day_number > self.number_of_days {
            return None;
        }
        Some(self.start_date + Duration::days(i64::from(day_number) - 1))
    }

    /// The final program date.
    #[must_use]
    pub fn last_date(&self) -> NaiveDate {
        self.start_date + Duration::days(i64::from(self.number_of_days) - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_today;

    fn tasks() -> Vec<Task> {
        vec![
            Task::plain(TaskId::new(), "Read").unwrap(),
            Task::plain(TaskId::new(), "Drink Water").unwrap(),
        ]
    }

    #[test]
    fn rejects_zero_days() {
        let err = Program::new(
            ProgramId::new(),
            fixed_today(),
            0,
            EndOfDay::default(),
            tasks(),
        )
        .unwrap_err();
        assert_eq!(err, ProgramError::InvalidNumberOfDays);
    }

    #[test]
    fn rejects_empty_task_lists_and_duplicates() {
        let err = Program::new(
            ProgramId::new(),
            fixed_today(),
            30,
            EndOfDay::default(),
            vec![],
        )
        .unwrap_err();
        assert_eq!(err, ProgramError::NoTasks);

        let shared = TaskId::new();
        let dupes = vec![
            Task::plain(shared, "Read").unwrap(),
            Task::plain(shared, "Run").unwrap(),
        ];
        let err = Program::new(
            ProgramId::new(),
            fixed_today(),
            30,
            EndOfDay::default(),
            dupes,
        )
        .unwrap_err();
        assert_eq!(err, ProgramError::DuplicateTask(shared));
    }

    #[test]
    fn exposes_day_dates_within_bounds() {
        let program = Program::new(
            ProgramId::new(),
            fixed_today(),
            3,
            EndOfDay::default(),
            tasks(),
        )
        .unwrap();
        assert_eq!(program.date_of_day(1), Some(fixed_today()));
        assert_eq!(
            program.date_of_day(3),
            Some(fixed_today() + Duration::days(2))
        );
        assert_eq!(program.date_of_day(0), None);
        assert_eq!(program.date_of_day(4), None);
        assert_eq!(program.last_date(), fixed_today() + Duration::days(2));
    }
}
