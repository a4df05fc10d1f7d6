use std::sync::Arc;

use tracing::debug;

use journey_core::Clock;
use journey_core::model::{builtin_templates, ProgramTemplate, TemplateId};
use storage::repository::TemplateRepository;

use crate::error::TemplateServiceError;

/// Stores program templates and seeds the built-in set.
#[derive(Clone)]
pub struct TemplateService {
    clock: Clock,
    templates: Arc<dyn TemplateRepository>,
}

impl TemplateService {
    #[must_use]
    pub fn new(clock: Clock, templates: Arc<dyn TemplateRepository>) -> Self {
        Self { clock, templates }
    }

    /// Seeds the built-in templates once; user templates are left alone.
    ///
    /// # Errors
    ///
    /// Returns `TemplateServiceError` on validation or storage failures.
    pub async fn seed_builtins(&self) -> Result<(), TemplateServiceError> {
        if !self.templates.list_templates().await?.is_empty() {
            return Ok(());
        }
        for template in builtin_templates(self.clock.now())? {
            self.templates.upsert_template(&template).await?;
        }
        debug!("seeded builtin templates");
        Ok(())
    }

    /// Every template, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns `TemplateServiceError` on storage failures.
    pub async fn list(&self) -> Result<Vec<ProgramTemplate>, TemplateServiceError> {
        Ok(self.templates.list_templates().await?)
    }

    /// Fetch one template.
    ///
    /// # Errors
    ///
    /// Returns `TemplateServiceError` on storage failures.
    pub async fn get(&self, id: TemplateId) -> Result<Option<ProgramTemplate>, TemplateServiceError> {
        Ok(self.templates.get_template(id).await?)
    }

    /// Persist a user template.
    ///
    /// # Errors
    ///
    /// Returns `TemplateServiceError` on storage failures.
    pub async fn save(&self, template: &ProgramTemplate) -> Result<(), TemplateServiceError> {
        Ok(self.templates.upsert_template(template).await?)
    }

    /// Remove a template.
    ///
    /// # Errors
    ///
    /// Returns `TemplateServiceError` on storage failures.
    pub async fn delete(&self, id: TemplateId) -> Result<(), TemplateServiceError> {
        Ok(self.templates.delete_template(id).await?)
    }
}
