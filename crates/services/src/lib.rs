#![forbid(unsafe_code)]

pub mod app_services;
pub mod app_settings_service;
pub mod checklist_service;
pub mod error;
pub mod metrics_service;
pub mod program_service;
pub mod template_service;

pub use journey_core::Clock;

pub use app_services::AppServices;
pub use app_settings_service::AppSettingsService;
pub use checklist_service::{ChecklistRow, ChecklistService, TodayView, ToggleOutcome};
pub use error::{
    AppServicesError, AppSettingsServiceError, ChecklistError, MetricsServiceError,
    ProgramServiceError, TemplateServiceError,
};
pub use metrics_service::MetricsService;
pub use program_service::ProgramService;
pub use template_service::TemplateService;
