use chrono::Duration;
use journey_core::day::EndOfDay;
use journey_core::model::{Program, ProgramId, Task, TaskId};
use journey_core::time::{fixed_now, fixed_today};
use services::{AppServices, Clock};
use storage::repository::Storage;

fn build_program(cutoff: EndOfDay) -> Program {
    let tasks = vec![
        Task::plain(TaskId::new(), "Read").unwrap(),
        Task::plain(TaskId::new(), "Drink Water").unwrap(),
    ];
    Program::new(ProgramId::new(), fixed_today(), 10, cutoff, tasks).unwrap()
}

#[tokio::test]
async fn a_completed_day_is_never_flagged_missed() {
    let storage = Storage::in_memory();
    let program = build_program(EndOfDay::new(22, 0).unwrap());

    let day_one = AppServices::new(&storage, Clock::fixed(fixed_now() + Duration::hours(9)))
        .await
        .unwrap();
    day_one.programs().save(&program).await.unwrap();
    for task in program.tasks() {
        day_one
            .checklist()
            .toggle_task(fixed_today(), task.id())
            .await
            .unwrap();
    }

    // Next morning, well past day one's 22:00 cutoff.
    let next_day = AppServices::new(
        &storage,
        Clock::fixed(fixed_now() + Duration::days(1) + Duration::hours(9)),
    )
    .await
    .unwrap();
    assert!(next_day.checklist().missed_days().await.unwrap().is_empty());
    assert!(next_day
        .checklist()
        .refresh_missed_day_marker()
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn an_incomplete_day_is_missed_once_its_cutoff_passes() {
    let storage = Storage::in_memory();
    let program = build_program(EndOfDay::new(22, 0).unwrap());

    let day_one = AppServices::new(&storage, Clock::fixed(fixed_now() + Duration::hours(9)))
        .await
        .unwrap();
    day_one.programs().save(&program).await.unwrap();
    // Only one of two tasks gets done.
    day_one
        .checklist()
        .toggle_task(fixed_today(), program.tasks()[0].id())
        .await
        .unwrap();

    // Same evening, 23:00: past the cutoff, so today is already doomed
    // for missed-day purposes the next time it is evaluated as a past day;
    // the prompt condition (after cutoff + incomplete) is visible now.
    let evening = AppServices::new(&storage, Clock::fixed(fixed_now() + Duration::hours(23)))
        .await
        .unwrap();
    let view = evening.checklist().today_view().await.unwrap();
    assert!(view.after_cutoff);
    assert!(!view.is_complete);

    // Next morning the day shows up as missed and the marker persists.
    let next_day = AppServices::new(
        &storage,
        Clock::fixed(fixed_now() + Duration::days(1) + Duration::hours(9)),
    )
    .await
    .unwrap();
    let missed = next_day.checklist().missed_days().await.unwrap();
    assert_eq!(missed, vec![fixed_today()]);
    assert_eq!(
        next_day
            .checklist()
            .refresh_missed_day_marker()
            .await
            .unwrap(),
        Some(fixed_today())
    );

    // The user chooses to continue; the marker clears but the read-time
    // evaluation still reports the day as missed.
    next_day
        .checklist()
        .continue_after_missed_day()
        .await
        .unwrap();
    assert_eq!(
        next_day.checklist().missed_days().await.unwrap(),
        vec![fixed_today()]
    );
}

#[tokio::test]
async fn morning_cutoffs_keep_yesterday_alive_past_midnight() {
    let storage = Storage::in_memory();
    let program = build_program(EndOfDay::new(2, 0).unwrap());

    let day_one = AppServices::new(&storage, Clock::fixed(fixed_now() + Duration::hours(9)))
        .await
        .unwrap();
    day_one.programs().save(&program).await.unwrap();

    // 01:00 the next calendar day: yesterday's window runs to 02:00.
    let small_hours = AppServices::new(
        &storage,
        Clock::fixed(fixed_now() + Duration::days(1) + Duration::hours(1)),
    )
    .await
    .unwrap();
    assert!(small_hours
        .checklist()
        .missed_days()
        .await
        .unwrap()
        .is_empty());

    // 03:00: the window has closed and yesterday is missed.
    let after = AppServices::new(
        &storage,
        Clock::fixed(fixed_now() + Duration::days(1) + Duration::hours(3)),
    )
    .await
    .unwrap();
    assert_eq!(
        after.checklist().missed_days().await.unwrap(),
        vec![fixed_today()]
    );
}

#[tokio::test]
async fn streak_grows_with_consecutive_complete_days() {
    let storage = Storage::in_memory();
    let program = build_program(EndOfDay::new(22, 0).unwrap());

    let setup = AppServices::new(&storage, Clock::fixed(fixed_now() + Duration::hours(9)))
        .await
        .unwrap();
    setup.programs().save(&program).await.unwrap();

    for day in 0..3 {
        let app = AppServices::new(
            &storage,
            Clock::fixed(fixed_now() + Duration::days(day) + Duration::hours(9)),
        )
        .await
        .unwrap();
        let date = fixed_today() + Duration::days(day);
        for task in program.tasks() {
            app.checklist().toggle_task(date, task.id()).await.unwrap();
        }
        assert_eq!(
            app.checklist().current_streak().await.unwrap(),
            u32::try_from(day + 1).unwrap()
        );
    }

    // Day four, nothing done yet: the streak holds at three.
    let day_four = AppServices::new(
        &storage,
        Clock::fixed(fixed_now() + Duration::days(3) + Duration::hours(9)),
    )
    .await
    .unwrap();
    assert_eq!(day_four.checklist().current_streak().await.unwrap(), 3);
}
