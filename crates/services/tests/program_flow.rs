use chrono::Duration;
use journey_core::day::EndOfDay;
use journey_core::model::{Program, ProgramId, Task, TaskId};
use journey_core::time::{fixed_now, fixed_today};
use services::{AppServices, ChecklistError, Clock};

fn build_program() -> Program {
    let tasks = vec![
        Task::plain(TaskId::new(), "Read").unwrap(),
        Task::plain(TaskId::new(), "Drink Water").unwrap(),
    ];
    Program::new(
        ProgramId::new(),
        fixed_today(),
        75,
        EndOfDay::default(),
        tasks,
    )
    .unwrap()
}

#[tokio::test]
async fn save_then_load_returns_an_equal_program() {
    let app = AppServices::in_memory(Clock::fixed(fixed_now()))
        .await
        .unwrap();
    assert!(app.programs().load().await.unwrap().is_none());

    let program = build_program();
    app.programs().save(&program).await.unwrap();
    assert_eq!(app.programs().load().await.unwrap(), Some(program));
}

#[tokio::test]
async fn create_from_template_saves_a_valid_program() {
    let app = AppServices::in_memory(Clock::fixed(fixed_now()))
        .await
        .unwrap();

    let templates = app.templates().list().await.unwrap();
    assert!(!templates.is_empty(), "builtins are seeded at assembly");

    let template = &templates[0];
    let program = app
        .programs()
        .create_from_template(template.id(), None, EndOfDay::default(), Some(30))
        .await
        .unwrap();

    assert_eq!(program.start_date(), fixed_today());
    assert_eq!(program.number_of_days(), 30);
    assert_eq!(program.tasks().len(), template.tasks().len());
    assert_eq!(app.programs().load().await.unwrap(), Some(program));
}

#[tokio::test]
async fn reset_clears_program_progress_and_marker() {
    let app = AppServices::in_memory(Clock::fixed(
        fixed_now() + Duration::days(1) + Duration::hours(9),
    ))
    .await
    .unwrap();

    let program = build_program();
    app.programs().save(&program).await.unwrap();
    app.checklist()
        .toggle_task(fixed_today() + Duration::days(1), program.tasks()[0].id())
        .await
        .unwrap();
    // Day one was left untouched, so the marker lands on it.
    assert_eq!(
        app.checklist().refresh_missed_day_marker().await.unwrap(),
        Some(fixed_today())
    );

    app.programs().reset().await.unwrap();

    assert!(app.programs().load().await.unwrap().is_none());
    let err = app.checklist().today_view().await.unwrap_err();
    assert!(matches!(err, ChecklistError::NoProgram));

    // A fresh program starts from a clean slate: no leftover records.
    let fresh = build_program();
    app.programs().save(&fresh).await.unwrap();
    let overview = app.checklist().day_overview().await.unwrap();
    assert!(overview.iter().all(|d| d.completed_tasks == 0));
}
