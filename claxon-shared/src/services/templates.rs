//! Claxon template flows.
//!
//! Reads are public and language-projected; mutations are admin-only
//! (gated at the API layer) and operate on the raw multi-language rows.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::models::template::{
    ClaxonTemplate, CreateTemplate, Language, LocalizedTemplate, UpdateTemplate,
};

#[derive(Clone)]
pub struct TemplatesService {
    pool: PgPool,
}

impl TemplatesService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a template (admin).
    pub async fn create(&self, data: CreateTemplate) -> ServiceResult<ClaxonTemplate> {
        let template = ClaxonTemplate::insert(&self.pool, data).await?;

        info!(template_id = %template.id, category = %template.category, "Template created");

        Ok(template)
    }

    /// Lists active templates, optionally by category, projected to the
    /// requested language (Romanian fallback).
    pub async fn list(
        &self,
        category: Option<&str>,
        language: Option<&str>,
    ) -> ServiceResult<Vec<LocalizedTemplate>> {
        let language = Language::from_code(language);
        let templates = ClaxonTemplate::list_active(&self.pool, category).await?;

        Ok(templates
            .into_iter()
            .map(|t| t.localize(language))
            .collect())
    }

    /// Lists active templates of one category, language-projected.
    pub async fn find_by_category(
        &self,
        category: &str,
        language: Option<&str>,
    ) -> ServiceResult<Vec<LocalizedTemplate>> {
        self.list(Some(category), language).await
    }

    /// Fetches a single template, language-projected.
    pub async fn find_one(
        &self,
        id: Uuid,
        language: Option<&str>,
    ) -> ServiceResult<LocalizedTemplate> {
        let language = Language::from_code(language);

        ClaxonTemplate::find_by_id(&self.pool, id)
            .await?
            .map(|t| t.localize(language))
            .ok_or_else(|| ServiceError::NotFound("Template not found".to_string()))
    }

    /// Updates a template (admin); existence surfaces as `NotFound`.
    pub async fn update(&self, id: Uuid, data: UpdateTemplate) -> ServiceResult<ClaxonTemplate> {
        ClaxonTemplate::update(&self.pool, id, data)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Template not found".to_string()))
    }

    /// Deletes a template (admin). Claxons that referenced it keep their
    /// rows with the reference nulled.
    pub async fn remove(&self, id: Uuid) -> ServiceResult<()> {
        let deleted = ClaxonTemplate::delete(&self.pool, id).await?;

        if !deleted {
            return Err(ServiceError::NotFound("Template not found".to_string()));
        }

        info!(template_id = %id, "Template deleted");

        Ok(())
    }
}
