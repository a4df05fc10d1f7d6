//! Day resolution: which calendar day is actionable, when a day's window
//! closes, and which past days were missed.
//!
//! A program day does not end at midnight; it ends at the program's
//! end-of-day cutoff. Cutoffs in the morning (before noon) belong to night
//! owls: the window for a date extends past midnight into the next calendar
//! day. Evening cutoffs close the window the same day. The active day shown
//! to the user is always the plain calendar day; the cutoff only decides
//! when an incomplete day counts as missed.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use thiserror::Error;

use crate::model::{DailyProgress, Program};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DayError {
    #[error("cutoff hour must be below 24, got {provided}")]
    InvalidHour { provided: u32 },

    #[error("cutoff minute must be below 60, got {provided}")]
    InvalidMinute { provided: u32 },
}

//
// ─── END OF DAY CUTOFF ─────────────────────────────────────────────────────────
//

/// The time of day at which a program day closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndOfDay {
    time: NaiveTime,
}

impl EndOfDay {
    /// Default cutoff: 22:00.
    pub const DEFAULT_HOUR: u32 = 22;

    /// Creates a validated cutoff.
    ///
    /// # Errors
    ///
    /// Returns `DayError` if the hour or minute is out of range.
    pub fn new(hour: u32, minute: u32) -> Result<Self, DayError> {
        if hour >= 24 {
            return Err(DayError::InvalidHour { provided: hour });
        }
        if minute >= 60 {
            return Err(DayError::InvalidMinute { provided: minute });
        }
        // Both components are range-checked above.
        let time = NaiveTime::from_hms_opt(hour, minute, 0)
            .ok_or(DayError::InvalidMinute { provided: minute })?;
        Ok(Self { time })
    }

    #[must_use]
    pub fn hour(&self) -> u32 {
        use chrono::Timelike;
        self.time.hour()
    }

    #[must_use]
    pub fn minute(&self) -> u32 {
        use chrono::Timelike;
        self.time.minute()
    }

    /// A cutoff before noon closes the day on the *next* calendar date.
    #[must_use]
    pub fn is_morning(&self) -> bool {
        self.hour() < 12
    }
}

impl Default for EndOfDay {
    fn default() -> Self {
        Self {
            time: NaiveTime::from_hms_opt(Self::DEFAULT_HOUR, 0, 0)
                .unwrap_or(NaiveTime::MIN),
        }
    }
}

//
// ─── DAY WINDOW ────────────────────────────────────────────────────────────────
//

/// The span of real time during which a calendar date's checklist can still
/// be completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DayWindow {
    #[must_use]
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Whether the window has fully passed at `now`.
    #[must_use]
    pub fn has_closed(&self, now: DateTime<Utc>) -> bool {
        now >= self.end
    }
}

/// Computes the completion window for a calendar date under a cutoff.
///
/// Morning cutoffs end on the next calendar day at the cutoff time; evening
/// cutoffs end the same day. The window starts one second after the previous
/// window ends.
#[must_use]
pub fn day_window(date: NaiveDate, cutoff: EndOfDay) -> DayWindow {
    let end_date = if cutoff.is_morning() {
        date + Duration::days(1)
    } else {
        date
    };
    let end = end_date.and_time(cutoff.time).and_utc();
    let start = end - Duration::days(1) + Duration::seconds(1);
    DayWindow { start, end }
}

//
// ─── ACTIVE DAY ────────────────────────────────────────────────────────────────
//

/// The calendar day currently presented for task completion.
///
/// Deliberately *not* shifted by the cutoff: a night owl at 01:00 still sees
/// the new calendar day's checklist, while yesterday stays completable until
/// its window closes.
#[must_use]
pub fn active_date(now: DateTime<Utc>) -> NaiveDate {
    now.date_naive()
}

/// 1-based program day number for the active date, clamped to the program.
///
/// Days before the start report 1; days past the end report
/// `number_of_days`.
#[must_use]
pub fn day_number(active: NaiveDate, program: &Program) -> u32 {
    let diff = (active - program.start_date()).num_days();
    let raw = diff.saturating_add(1);
    let clamped = raw.clamp(1, i64::from(program.number_of_days()));
    u32::try_from(clamped).unwrap_or(1)
}

/// Whether `now` falls past the cutoff of its own calendar day's window.
#[must_use]
pub fn is_after_cutoff(now: DateTime<Utc>, cutoff: EndOfDay) -> bool {
    day_window(active_date(now), cutoff).has_closed(now)
}

//
// ─── DAY STATUS ────────────────────────────────────────────────────────────────
//

/// Read-time status of one program day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayStatus {
    /// After the active day; not yet reachable.
    Upcoming,
    /// The day currently presented for completion.
    Active,
    /// Every task was completed.
    Complete,
    /// The window closed with at least one task incomplete.
    Missed,
    /// A past day whose window is still open (morning cutoffs only).
    Pending,
}

/// Status of a single program day together with its date and number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayRecord {
    pub day_number: u32,
    pub date: NaiveDate,
    pub status: DayStatus,
    pub completed_tasks: usize,
}

/// Evaluates every program day at `now`.
///
/// Evaluation happens entirely at read time; nothing is scheduled and no
/// record is written. `progress` may be in any order and may contain dates
/// outside the program, which are ignored.
#[must_use]
pub fn day_records(program: &Program, progress: &[DailyProgress], now: DateTime<Utc>) -> Vec<DayRecord> {
    let active = active_date(now);
    let cutoff = program.end_of_day();

    let mut records = Vec::with_capacity(program.number_of_days() as usize);
    for number in 1..=program.number_of_days() {
        let date = program.start_date() + Duration::days(i64::from(number) - 1);
        let day_progress = progress.iter().find(|p| p.date() == date);
        let completed_tasks = day_progress.map_or(0, |p| p.completed_count(program));
        let complete = day_progress.is_some_and(|p| p.is_complete(program));

        let status = if date > active {
            DayStatus::Upcoming
        } else if complete {
            DayStatus::Complete
        } else if date == active {
            DayStatus::Active
        } else if day_window(date, cutoff).has_closed(now) {
            DayStatus::Missed
        } else {
            DayStatus::Pending
        };

        records.push(DayRecord {
            day_number: number,
            date,
            status,
            completed_tasks,
        });
    }
    records
}

/// Dates of every missed day at `now`, earliest first.
#[must_use]
pub fn missed_days(program: &Program, progress: &[DailyProgress], now: DateTime<Utc>) -> Vec<NaiveDate> {
    day_records(program, progress, now)
        .into_iter()
        .filter(|r| r.status == DayStatus::Missed)
        .map(|r| r.date)
        .collect()
}

/// Number of consecutive fully-completed days ending at the active day.
///
/// The active day itself is counted only once complete; an incomplete
/// active day does not break a streak built up to yesterday.
#[must_use]
pub fn current_streak(program: &Program, progress: &[DailyProgress], now: DateTime<Utc>) -> u32 {
    let active = active_date(now);
    let records = day_records(program, progress, now);

    let mut streak = 0_u32;
    for record in records.iter().rev() {
        if record.date > active {
            continue;
        }
        match record.status {
            DayStatus::Complete => streak += 1,
            // An active or still-open day that is not yet complete is
            // skipped rather than treated as a break.
            DayStatus::Active | DayStatus::Pending if streak == 0 => {}
            _ => break,
        }
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ProgressId, Task, TaskId};
    use crate::time::fixed_today;

    fn ten_pm() -> EndOfDay {
        EndOfDay::new(22, 0).unwrap()
    }

    fn two_am() -> EndOfDay {
        EndOfDay::new(2, 0).unwrap()
    }

    fn build_program(days: u32, cutoff: EndOfDay) -> Program {
        let tasks = vec![
            Task::plain(TaskId::new(), "Read").unwrap(),
            Task::plain(TaskId::new(), "Drink Water").unwrap(),
        ];
        Program::new(
            crate::model::ProgramId::new(),
            fixed_today(),
            days,
            cutoff,
            tasks,
        )
        .unwrap()
    }

    fn complete_day(program: &Program, date: NaiveDate) -> DailyProgress {
        let mut progress = DailyProgress::new(ProgressId::new(), date);
        for task in program.tasks() {
            progress.toggle(task.id());
        }
        progress
    }

    fn at(date: NaiveDate, hour: u32, minute: u32) -> DateTime<Utc> {
        date.and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap())
            .and_utc()
    }

    #[test]
    fn cutoff_rejects_out_of_range_components() {
        assert_eq!(
            EndOfDay::new(24, 0).unwrap_err(),
            DayError::InvalidHour { provided: 24 }
        );
        assert_eq!(
            EndOfDay::new(10, 60).unwrap_err(),
            DayError::InvalidMinute { provided: 60 }
        );
    }

    #[test]
    fn evening_cutoff_closes_the_same_day() {
        let date = fixed_today();
        let window = day_window(date, ten_pm());
        assert_eq!(window.end(), at(date, 22, 0));
        assert_eq!(window.start(), at(date - Duration::days(1), 22, 0) + Duration::seconds(1));
    }

    #[test]
    fn morning_cutoff_extends_past_midnight() {
        let date = fixed_today();
        let window = day_window(date, two_am());
        assert_eq!(window.end(), at(date + Duration::days(1), 2, 0));
        assert!(!window.has_closed(at(date + Duration::days(1), 1, 0)));
    }

    #[test]
    fn active_date_ignores_the_cutoff() {
        let date = fixed_today();
        // 23:30 with a 22:00 cutoff: past the cutoff, but still today's list.
        assert_eq!(active_date(at(date, 23, 30)), date);
        assert!(is_after_cutoff(at(date, 23, 30), ten_pm()));
        assert!(!is_after_cutoff(at(date, 21, 59), ten_pm()));
    }

    #[test]
    fn day_number_clamps_to_program_bounds() {
        let program = build_program(3, ten_pm());
        let start = program.start_date();
        assert_eq!(day_number(start - Duration::days(5), &program), 1);
        assert_eq!(day_number(start, &program), 1);
        assert_eq!(day_number(start + Duration::days(2), &program), 3);
        assert_eq!(day_number(start + Duration::days(30), &program), 3);
    }

    #[test]
    fn complete_day_is_never_missed() {
        let program = build_program(3, ten_pm());
        let first = program.start_date();
        let done = complete_day(&program, first);
        let now = at(first + Duration::days(2), 12, 0);
        let records = day_records(&program, &[done], now);
        assert_eq!(records[0].status, DayStatus::Complete);
        assert_eq!(records[1].status, DayStatus::Missed);
        assert_eq!(records[2].status, DayStatus::Active);
    }

    #[test]
    fn incomplete_day_flips_to_missed_when_its_window_closes() {
        let program = build_program(2, ten_pm());
        let first = program.start_date();
        let second = first + Duration::days(1);

        // Second day, before yesterday's cutoff evaluation point has any
        // bearing: yesterday's window closed at 22:00 yesterday.
        let before = at(second, 9, 0);
        assert_eq!(missed_days(&program, &[], before), vec![first]);

        // With a morning cutoff yesterday is still open at 01:00.
        let night_owl = build_program(2, two_am());
        let start = night_owl.start_date();
        let early = at(start + Duration::days(1), 1, 0);
        assert!(missed_days(&night_owl, &[], early).is_empty());
    }

    #[test]
    fn streak_counts_back_from_the_active_day() {
        let program = build_program(5, ten_pm());
        let start = program.start_date();
        let progress = vec![
            complete_day(&program, start),
            complete_day(&program, start + Duration::days(1)),
            complete_day(&program, start + Duration::days(2)),
        ];

        // Day 4, incomplete so far: streak of the three finished days.
        let now = at(start + Duration::days(3), 12, 0);
        assert_eq!(current_streak(&program, &progress, now), 3);

        // Completing day 4 extends it.
        let mut with_today = progress.clone();
        with_today.push(complete_day(&program, start + Duration::days(3)));
        assert_eq!(current_streak(&program, &with_today, now), 4);
    }

    #[test]
    fn streak_breaks_on_a_missed_day() {
        let program = build_program(4, ten_pm());
        let start = program.start_date();
        // Day 1 complete, day 2 missed, day 3 complete.
        let progress = vec![
            complete_day(&program, start),
            complete_day(&program, start + Duration::days(2)),
        ];
        let now = at(start + Duration::days(3), 12, 0);
        assert_eq!(current_streak(&program, &progress, now), 1);
    }
}
