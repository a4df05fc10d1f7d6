use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use journey_core::Clock;
use journey_core::day::EndOfDay;
use journey_core::model::{Program, TemplateId};
use storage::repository::{
    DailyProgressRepository, ProgramRepository, StorageError, TemplateRepository,
};

use crate::error::ProgramServiceError;

/// Saves, loads, and resets the single program.
#[derive(Clone)]
pub struct ProgramService {
    clock: Clock,
    programs: Arc<dyn ProgramRepository>,
    daily_progress: Arc<dyn DailyProgressRepository>,
    templates: Arc<dyn TemplateRepository>,
}

impl ProgramService {
    #[must_use]
    pub fn new(
        clock: Clock,
        programs: Arc<dyn ProgramRepository>,
        daily_progress: Arc<dyn DailyProgressRepository>,
        templates: Arc<dyn TemplateRepository>,
    ) -> Self {
        Self {
            clock,
            programs,
            daily_progress,
            templates,
        }
    }

    /// Persist a program, replacing any saved one. The caller builds the
    /// `Program` through its validating constructor, so anything arriving
    /// here already holds the model invariants.
    ///
    /// # Errors
    ///
    /// Returns `ProgramServiceError` on storage failures.
    pub async fn save(&self, program: &Program) -> Result<(), ProgramServiceError> {
        self.programs.save_program(program).await?;
        info!(days = program.number_of_days(), tasks = program.tasks().len(), "program saved");
        Ok(())
    }

    /// Fetch the saved program. Absence routes the caller to the setup
    /// flow; it is not an error. A record that no longer deserializes is
    /// treated the same way, so a bad write never wedges the app.
    ///
    /// # Errors
    ///
    /// Returns `ProgramServiceError` on storage failures other than
    /// malformed data.
    pub async fn load(&self) -> Result<Option<Program>, ProgramServiceError> {
        match self.programs.load_program().await {
            Ok(program) => Ok(program),
            Err(StorageError::Serialization(detail)) => {
                warn!(%detail, "saved program is malformed, treating as absent");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Instantiate a stored template into a fresh program and save it.
    ///
    /// `start_date` defaults to the clock's today; `number_of_days`
    /// defaults to the template's.
    ///
    /// # Errors
    ///
    /// Returns `ProgramServiceError::UnknownTemplate` if the template does
    /// not exist, or validation/storage errors from instantiation.
    pub async fn create_from_template(
        &self,
        template_id: TemplateId,
        start_date: Option<NaiveDate>,
        end_of_day: EndOfDay,
        number_of_days: Option<u32>,
    ) -> Result<Program, ProgramServiceError> {
        let template = self
            .templates
            .get_template(template_id)
            .await?
            .ok_or(ProgramServiceError::UnknownTemplate(template_id))?;

        let start = start_date.unwrap_or_else(|| self.clock.today());
        let program = template.instantiate(start, end_of_day, number_of_days)?;
        self.save(&program).await?;
        Ok(program)
    }

    /// Full reset: removes the program, every daily record, and the
    /// missed-day marker. The next load routes to setup.
    ///
    /// # Errors
    ///
    /// Returns `ProgramServiceError` on storage failures.
    pub async fn reset(&self) -> Result<(), ProgramServiceError> {
        self.programs.clear_program().await?;
        self.daily_progress.clear_all().await?;
        self.daily_progress.set_earliest_missed_day(None).await?;
        info!("program and progress cleared");
        Ok(())
    }
}
