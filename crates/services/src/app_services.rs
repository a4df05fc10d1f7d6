use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::app_settings_service::AppSettingsService;
use crate::checklist_service::ChecklistService;
use crate::error::AppServicesError;
use crate::metrics_service::MetricsService;
use crate::program_service::ProgramService;
use crate::template_service::TemplateService;

/// Assembles the app-facing services over a shared storage and clock.
///
/// This is the one context object handed through the app: created at
/// launch, never torn down, reset only through `ProgramService::reset`.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    programs: Arc<ProgramService>,
    checklist: Arc<ChecklistService>,
    metrics: Arc<MetricsService>,
    templates: Arc<TemplateService>,
    app_settings: Arc<AppSettingsService>,
}

impl AppServices {
    /// Build services over an already-constructed storage, seeding the
    /// built-in templates and starter metrics.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if seeding fails.
    pub async fn new(storage: &Storage, clock: Clock) -> Result<Self, AppServicesError> {
        let programs = Arc::new(ProgramService::new(
            clock,
            Arc::clone(&storage.programs),
            Arc::clone(&storage.daily_progress),
            Arc::clone(&storage.templates),
        ));
        let checklist = Arc::new(ChecklistService::new(
            clock,
            Arc::clone(&storage.programs),
            Arc::clone(&storage.daily_progress),
            Arc::clone(&storage.app_settings),
        ));
        let metrics = Arc::new(MetricsService::new(
            clock,
            Arc::clone(&storage.metrics),
            Arc::clone(&storage.measurements),
        ));
        let templates = Arc::new(TemplateService::new(clock, Arc::clone(&storage.templates)));
        let app_settings = Arc::new(AppSettingsService::new(Arc::clone(&storage.app_settings)));

        templates.seed_builtins().await?;
        metrics.seed_defaults().await?;

        Ok(Self {
            clock,
            programs,
            checklist,
            metrics,
            templates,
            app_settings,
        })
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or seeding
    /// fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::new(&storage, clock).await
    }

    /// Build services over the in-memory backend, for tests and
    /// prototyping.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if seeding fails.
    pub async fn in_memory(clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::in_memory();
        Self::new(&storage, clock).await
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn programs(&self) -> Arc<ProgramService> {
        Arc::clone(&self.programs)
    }

    #[must_use]
    pub fn checklist(&self) -> Arc<ChecklistService> {
        Arc::clone(&self.checklist)
    }

    #[must_use]
    pub fn metrics(&self) -> Arc<MetricsService> {
        Arc::clone(&self.metrics)
    }

    #[must_use]
    pub fn templates(&self) -> Arc<TemplateService> {
        Arc::clone(&self.templates)
    }

    #[must_use]
    pub fn app_settings(&self) -> Arc<AppSettingsService> {
        Arc::clone(&self.app_settings)
    }
}
