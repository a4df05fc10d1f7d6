use chrono::Duration;
use journey_core::day::EndOfDay;
use journey_core::model::{
    builtin_templates, default_metrics, Comparator, ComparisonMode, DailyProgress, Measurement,
    MeasurementId, MetricBinding, Program, ProgramId, ProgressId, ProgressRule, Task, TaskId,
    TaskKind,
};
use journey_core::time::{fixed_now, fixed_today};
use storage::repository::{
    AppSettingsRepository, DailyProgressRepository, MeasurementRepository, MetricRepository,
    ProgramRepository, TemplateRepository,
};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn build_program() -> Program {
    let tasks = vec![
        Task::plain(TaskId::new(), "Read").unwrap(),
        Task::new(
            TaskId::new(),
            "Drink Water",
            Some("A gallon".into()),
            TaskKind::Maintenance,
            Some(ProgressRule::Threshold {
                comparator: Comparator::Ge,
                target: 8.0,
            }),
            None,
        )
        .unwrap(),
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
async fn sqlite_program_round_trips_and_replaces() {
    let repo = connect("memdb_program").await;
    assert!(repo.load_program().await.unwrap().is_none());

    let program = build_program();
    repo.save_program(&program).await.unwrap();
    let loaded = repo.load_program().await.unwrap().expect("saved program");
    assert_eq!(loaded, program);

    // Saving again replaces wholesale, including the task rows.
    let replacement = Program::new(
        ProgramId::new(),
        fixed_today() + Duration::days(1),
        30,
        EndOfDay::new(2, 30).unwrap(),
        vec![Task::plain(TaskId::new(), "Stretch").unwrap()],
    )
    .unwrap();
    repo.save_program(&replacement).await.unwrap();
    let loaded = repo.load_program().await.unwrap().expect("replacement");
    assert_eq!(loaded, replacement);
    assert_eq!(loaded.tasks().len(), 1);

    repo.clear_program().await.unwrap();
    assert!(repo.load_program().await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_daily_progress_persists_the_completed_set() {
    let repo = connect("memdb_daily").await;
    let program = build_program();
    let date = fixed_today();

    let mut progress = DailyProgress::new(ProgressId::new(), date);
    for task in program.tasks() {
        progress.toggle(task.id());
    }
    repo.upsert_progress(&progress).await.unwrap();

    // Reload on a later date: the original day's completed set is intact.
    let loaded = repo.get_progress(date).await.unwrap().expect("record");
    assert_eq!(loaded, progress);
    assert!(loaded.is_complete(&program));
    assert!(repo
        .get_progress(date + Duration::days(3))
        .await
        .unwrap()
        .is_none());

    // Toggling one off persists the smaller set.
    let mut partial = loaded;
    partial.toggle(program.tasks()[0].id());
    repo.upsert_progress(&partial).await.unwrap();
    let reloaded = repo.get_progress(date).await.unwrap().expect("record");
    assert_eq!(reloaded.completed_count(&program), 1);

    let listed = repo.list_progress(None, None).await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn sqlite_clear_all_removes_records_and_marker() {
    let repo = connect("memdb_clear").await;
    let date = fixed_today();

    repo.upsert_progress(&DailyProgress::new(ProgressId::new(), date))
        .await
        .unwrap();
    repo.set_earliest_missed_day(Some(date)).await.unwrap();
    assert_eq!(repo.get_earliest_missed_day().await.unwrap(), Some(date));

    repo.clear_all().await.unwrap();
    assert!(repo.get_progress(date).await.unwrap().is_none());
    assert!(repo.list_progress(None, None).await.unwrap().is_empty());
    assert!(repo.get_earliest_missed_day().await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_metrics_bindings_and_measurements() {
    let repo = connect("memdb_metrics").await;

    let metrics = default_metrics(fixed_now()).unwrap();
    for metric in &metrics {
        repo.upsert_metric(metric).await.unwrap();
    }

    let listed = repo.list_metrics(false).await.unwrap();
    assert_eq!(listed.len(), metrics.len());
    // Sorted by name.
    assert!(listed.windows(2).all(|w| w[0].name() <= w[1].name()));

    // Archive one and list again.
    let mut archived = listed[0].clone();
    archived.set_archived(true);
    repo.upsert_metric(&archived).await.unwrap();
    assert_eq!(repo.list_metrics(false).await.unwrap().len(), metrics.len() - 1);
    assert_eq!(repo.list_metrics(true).await.unwrap().len(), metrics.len());

    let weight = listed
        .iter()
        .find(|m| m.name() == "Weight")
        .expect("seeded weight metric");
    let binding = MetricBinding::new(
        weight.id(),
        Some(185.0),
        ComparisonMode::Absolute,
        14,
    )
    .unwrap();
    repo.upsert_binding(&binding).await.unwrap();
    assert_eq!(repo.binding_for(weight.id()).await.unwrap(), Some(binding));

    let later = Measurement::manual(
        MeasurementId::new(),
        weight.id(),
        fixed_now() + Duration::hours(2),
        183.0,
    );
    let earlier = Measurement::manual(MeasurementId::new(), weight.id(), fixed_now(), 184.2);
    repo.append_measurement(&later).await.unwrap();
    repo.append_measurement(&earlier).await.unwrap();

    let history = repo
        .measurements_for(weight.id(), None, None)
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0], earlier);
    assert_eq!(history[1], later);

    let bounded = repo
        .measurements_for(weight.id(), Some(fixed_now() + Duration::hours(1)), None)
        .await
        .unwrap();
    assert_eq!(bounded.len(), 1);
    assert_eq!(bounded[0], later);
}

#[tokio::test]
async fn sqlite_templates_round_trip_with_rules() {
    let repo = connect("memdb_templates").await;

    let templates = builtin_templates(fixed_now()).unwrap();
    for template in &templates {
        repo.upsert_template(template).await.unwrap();
    }

    let listed = repo.list_templates().await.unwrap();
    assert_eq!(listed.len(), templates.len());
    assert!(listed.windows(2).all(|w| w[0].name() <= w[1].name()));

    let first = &templates[0];
    let fetched = repo
        .get_template(first.id())
        .await
        .unwrap()
        .expect("template");
    assert_eq!(&fetched, first);

    repo.delete_template(first.id()).await.unwrap();
    assert!(repo.get_template(first.id()).await.unwrap().is_none());
    assert_eq!(repo.list_templates().await.unwrap().len(), templates.len() - 1);
}

#[tokio::test]
async fn sqlite_settings_round_trip() {
    use journey_core::model::{AppSettings, CelebrationStyle, ThemeMode};

    let repo = connect("memdb_settings").await;
    assert!(repo.get_settings().await.unwrap().is_none());

    let settings = AppSettings::new(ThemeMode::Dark, CelebrationStyle::Random, true);
    repo.save_settings(&settings).await.unwrap();
    assert_eq!(repo.get_settings().await.unwrap(), Some(settings));

    let updated = AppSettings::new(ThemeMode::Light, CelebrationStyle::Sparkles, false);
    repo.save_settings(&updated).await.unwrap();
    assert_eq!(repo.get_settings().await.unwrap(), Some(updated));
}
