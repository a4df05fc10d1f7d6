use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::model::ids::{ProgressId, TaskId};
use crate::model::program::Program;

/// Record of which tasks were completed on a given calendar day.
///
/// Created lazily on the first interaction with a day; there is at most one
/// record per date. The completed set is only ever a subset of the saved
/// program's tasks — ids left behind by a replaced program are dropped on
/// read via [`DailyProgress::retain_known`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyProgress {
    id: ProgressId,
    date: NaiveDate,
    completed: BTreeSet<TaskId>,
}

impl DailyProgress {
    /// Creates an empty record for a date.
    #[must_use]
    pub fn new(id: ProgressId, date: NaiveDate) -> Self {
        Self {
            id,
            date,
            completed: BTreeSet::new(),
        }
    }

    /// Rehydrates a record from persisted storage.
    #[must_use]
    pub fn from_persisted(
        id: ProgressId,
        date: NaiveDate,
        completed: impl IntoIterator<Item = TaskId>,
    ) -> Self {
        Self {
            id,
            date,
            completed: completed.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn id(&self) -> ProgressId {
        self.id
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Completed task ids in sorted order.
    #[must_use]
    pub fn completed_tasks(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.completed.iter().copied()
    }

    #[must_use]
    pub fn is_completed(&self, task: TaskId) -> bool {
        self.completed.contains(&task)
    }

    /// Flips a task's completion. Returns true when the task is now
    /// completed. Toggling twice restores the original set.
    pub fn toggle(&mut self, task: TaskId) -> bool {
        if self.completed.remove(&task) {
            false
        } else {
            self.completed.insert(task);
            true
        }
    }

    /// Drops completed ids that are not in the given program's task set.
    pub fn retain_known(&mut self, program: &Program) {
        self.completed.retain(|id| program.contains_task(*id));
    }

    /// Number of this program's tasks completed on the day.
    #[must_use]
    pub fn completed_count(&self, program: &Program) -> usize {
        program
            .tasks()
            .iter()
            .filter(|t| self.completed.contains(&t.id()))
            .count()
    }

    /// Whether every task of the program was completed.
    #[must_use]
    pub fn is_complete(&self, program: &Program) -> bool {
        program.tasks().iter().all(|t| self.completed.contains(&t.id()))
    }
}
