use chrono::Duration;
use journey_core::day::EndOfDay;
use journey_core::model::{CelebrationStyle, Program, ProgramId, Task, TaskId};
use journey_core::time::{fixed_now, fixed_today};
use services::{AppServices, ChecklistError, Clock};
use storage::repository::Storage;

fn build_program() -> Program {
    let tasks = vec![
        Task::plain(TaskId::new(), "Read").unwrap(),
        Task::plain(TaskId::new(), "Drink Water").unwrap(),
    ];
    Program::new(
        ProgramId::new(),
        fixed_today(),
        75,
        EndOfDay::new(22, 0).unwrap(),
        tasks,
    )
    .unwrap()
}

#[tokio::test]
async fn checklist_shows_day_one_of_a_fresh_program() {
    let app = AppServices::in_memory(Clock::fixed(fixed_now() + Duration::hours(9)))
        .await
        .unwrap();
    let program = build_program();
    app.programs().save(&program).await.unwrap();

    let view = app.checklist().today_view().await.unwrap();
    assert_eq!(view.date, fixed_today());
    assert_eq!(view.day_number, 1);
    assert_eq!(view.total_days, 75);
    assert_eq!(view.rows.len(), 2);
    assert!(!view.is_complete);
    assert!(!view.after_cutoff);
    assert!(view.rows.iter().all(|r| !r.completed));
}

#[tokio::test]
async fn toggling_twice_restores_the_original_set() {
    let app = AppServices::in_memory(Clock::fixed(fixed_now() + Duration::hours(9)))
        .await
        .unwrap();
    let program = build_program();
    app.programs().save(&program).await.unwrap();
    let task = program.tasks()[0].id();

    let first = app
        .checklist()
        .toggle_task(fixed_today(), task)
        .await
        .unwrap();
    assert!(first.now_completed);
    assert!(!first.day_complete);
    assert!(first.celebration.is_none());

    let second = app
        .checklist()
        .toggle_task(fixed_today(), task)
        .await
        .unwrap();
    assert!(!second.now_completed);

    let view = app.checklist().today_view().await.unwrap();
    assert!(view.rows.iter().all(|r| !r.completed));
}

#[tokio::test]
async fn completing_the_day_triggers_a_celebration() {
    let app = AppServices::in_memory(Clock::fixed(fixed_now() + Duration::hours(9)))
        .await
        .unwrap();
    let program = build_program();
    app.programs().save(&program).await.unwrap();

    app.checklist()
        .toggle_task(fixed_today(), program.tasks()[0].id())
        .await
        .unwrap();
    let last = app
        .checklist()
        .toggle_task(fixed_today(), program.tasks()[1].id())
        .await
        .unwrap();

    assert!(last.day_complete);
    let style = last.celebration.expect("celebrations default to enabled");
    assert_ne!(style, CelebrationStyle::Random);

    // Un-toggling and re-toggling celebrates again; the original app
    // replays it every time the list flips to complete.
    let undo = app
        .checklist()
        .toggle_task(fixed_today(), program.tasks()[1].id())
        .await
        .unwrap();
    assert!(!undo.day_complete);
    assert!(undo.celebration.is_none());
}

#[tokio::test]
async fn toggling_an_unknown_task_is_rejected() {
    let app = AppServices::in_memory(Clock::fixed(fixed_now() + Duration::hours(9)))
        .await
        .unwrap();
    let program = build_program();
    app.programs().save(&program).await.unwrap();

    let stranger = TaskId::new();
    let err = app
        .checklist()
        .toggle_task(fixed_today(), stranger)
        .await
        .unwrap_err();
    assert!(matches!(err, ChecklistError::UnknownTask(id) if id == stranger));

    let outside = fixed_today() - Duration::days(1);
    let err = app
        .checklist()
        .toggle_task(outside, program.tasks()[0].id())
        .await
        .unwrap_err();
    assert!(matches!(err, ChecklistError::OutOfProgram(d) if d == outside));
}

#[tokio::test]
async fn completed_set_survives_a_relaunch_on_a_later_date() {
    let storage = Storage::in_memory();
    let program = build_program();

    // Day one: complete both tasks.
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

    // Relaunch three days later: the original date's record is intact.
    let later = AppServices::new(
        &storage,
        Clock::fixed(fixed_now() + Duration::days(3) + Duration::hours(9)),
    )
    .await
    .unwrap();
    let overview = later.checklist().day_overview().await.unwrap();
    assert_eq!(
        overview[0].status,
        journey_core::day::DayStatus::Complete
    );
    assert_eq!(overview[0].completed_tasks, 2);
}

#[tokio::test]
async fn today_view_without_a_program_routes_to_setup() {
    let app = AppServices::in_memory(Clock::fixed(fixed_now()))
        .await
        .unwrap();
    let err = app.checklist().today_view().await.unwrap_err();
    assert!(matches!(err, ChecklistError::NoProgram));
}
