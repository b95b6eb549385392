//! Claxon template endpoints.
//!
//! Reads are public and language-projected via `?language=` (Romanian
//! fallback). Mutations require the admin role claim.
//!
//! # Endpoints
//!
//! - `GET /claxon-templates?category=&language=`
//! - `GET /claxon-templates/category/:category?language=`
//! - `GET /claxon-templates/:id?language=`
//! - `POST /claxon-templates` (admin)
//! - `PATCH /claxon-templates/:id` (admin)
//! - `DELETE /claxon-templates/:id` (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use claxon_shared::auth::middleware::AuthContext;
use claxon_shared::models::template::{
    ClaxonTemplate, CreateTemplate, LocalizedTemplate, UpdateTemplate,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Create template request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTemplateRequest {
    #[validate(length(min = 1, max = 50, message = "Category must be 1-50 characters"))]
    pub category: String,

    #[validate(length(min = 1, max = 500, message = "Message must be 1-500 characters"))]
    pub message_en: String,

    #[validate(length(min = 1, max = 500, message = "Message must be 1-500 characters"))]
    pub message_ro: String,

    #[validate(length(min = 1, max = 500, message = "Message must be 1-500 characters"))]
    pub message_ru: String,

    pub is_active: Option<bool>,
}

/// Template edit request; all fields optional
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTemplateRequest {
    #[validate(length(min = 1, max = 50, message = "Category must be 1-50 characters"))]
    pub category: Option<String>,

    #[validate(length(min = 1, max = 500, message = "Message must be 1-500 characters"))]
    pub message_en: Option<String>,

    #[validate(length(min = 1, max = 500, message = "Message must be 1-500 characters"))]
    pub message_ro: Option<String>,

    #[validate(length(min = 1, max = 500, message = "Message must be 1-500 characters"))]
    pub message_ru: Option<String>,

    pub is_active: Option<bool>,
}

/// Query parameters for template listings
#[derive(Debug, Default, Deserialize)]
pub struct TemplateListQuery {
    pub category: Option<String>,
    pub language: Option<String>,
}

/// Query parameter for single-template reads
#[derive(Debug, Default, Deserialize)]
pub struct LanguageQuery {
    pub language: Option<String>,
}

fn require_admin(auth: &AuthContext) -> ApiResult<()> {
    if auth.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Template management requires the admin role".to_string(),
        ))
    }
}

/// `POST /claxon-templates` (admin)
pub async fn create_template(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTemplateRequest>,
) -> ApiResult<(StatusCode, Json<ClaxonTemplate>)> {
    require_admin(&auth)?;
    req.validate().map_err(ApiError::from)?;

    let template = state
        .services
        .templates
        .create(CreateTemplate {
            category: req.category,
            message_en: req.message_en,
            message_ro: req.message_ro,
            message_ru: req.message_ru,
            is_active: req.is_active,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(template)))
}

/// `GET /claxon-templates` (public)
pub async fn list_templates(
    State(state): State<AppState>,
    Query(query): Query<TemplateListQuery>,
) -> ApiResult<Json<Vec<LocalizedTemplate>>> {
    let templates = state
        .services
        .templates
        .list(query.category.as_deref(), query.language.as_deref())
        .await?;

    Ok(Json(templates))
}

/// `GET /claxon-templates/category/:category` (public)
pub async fn list_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(query): Query<LanguageQuery>,
) -> ApiResult<Json<Vec<LocalizedTemplate>>> {
    let templates = state
        .services
        .templates
        .find_by_category(&category, query.language.as_deref())
        .await?;

    Ok(Json(templates))
}

/// `GET /claxon-templates/:id` (public)
pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<LanguageQuery>,
) -> ApiResult<Json<LocalizedTemplate>> {
    let template = state
        .services
        .templates
        .find_one(id, query.language.as_deref())
        .await?;

    Ok(Json(template))
}

/// `PATCH /claxon-templates/:id` (admin)
pub async fn update_template(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTemplateRequest>,
) -> ApiResult<Json<ClaxonTemplate>> {
    require_admin(&auth)?;
    req.validate().map_err(ApiError::from)?;

    let template = state
        .services
        .templates
        .update(
            id,
            UpdateTemplate {
                category: req.category,
                message_en: req.message_en,
                message_ro: req.message_ro,
                message_ru: req.message_ru,
                is_active: req.is_active,
            },
        )
        .await?;

    Ok(Json(template))
}

/// `DELETE /claxon-templates/:id` (admin)
pub async fn delete_template(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    require_admin(&auth)?;

    state.services.templates.remove(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
