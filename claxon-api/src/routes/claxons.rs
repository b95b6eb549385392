//! Claxon exchange endpoints.
//!
//! # Endpoints
//!
//! - `POST /claxons` - send a claxon about a recipient's vehicle
//! - `GET /claxons/inbox?read=&claxon_type=&sender_language=&limit=&offset=`
//! - `GET /claxons/inbox/unread-count` - `{ "count": n }`
//! - `GET /claxons/sent` - same filters as the inbox
//! - `GET /claxons/:id` - sender or recipient only
//! - `PATCH /claxons/:id` - recipient-only read-status patch
//!
//! The sender is never taken from the request body; it is always the
//! authenticated caller.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use claxon_shared::auth::middleware::AuthContext;
use claxon_shared::models::claxon::{Claxon, ClaxonFilters, ClaxonView};
use claxon_shared::services::claxons::{CreateClaxonInput, UpdateClaxonInput};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create claxon request.
///
/// Must carry a template reference or a custom message (or both, when a
/// sender annotates a template).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateClaxonRequest {
    #[validate(length(min = 1, max = 128, message = "Recipient id is required"))]
    pub recipient_id: String,

    pub vehicle_id: Uuid,

    pub template_id: Option<Uuid>,

    #[validate(length(min = 1, max = 500, message = "Message must be 1-500 characters"))]
    pub custom_message: Option<String>,

    #[validate(length(max = 20, message = "Type must be at most 20 characters"))]
    pub claxon_type: Option<String>,

    #[validate(length(min = 2, max = 5, message = "Language must be a short code"))]
    pub sender_language: Option<String>,
}

impl CreateClaxonRequest {
    /// Cross-field check that validator's field rules can't express
    fn validate_content(&self) -> ApiResult<()> {
        if self.template_id.is_none() && self.custom_message.is_none() {
            return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
                field: "custom_message".to_string(),
                message: "Either template_id or custom_message is required".to_string(),
            }]));
        }
        Ok(())
    }
}

/// Filters and pagination for inbox/sent listings
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ClaxonListQuery {
    pub read: Option<bool>,

    pub claxon_type: Option<String>,

    pub sender_language: Option<String>,

    /// Page size, 1-100 (default 20)
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<i64>,

    /// Rows to skip (default 0)
    #[validate(range(min = 0, message = "Offset must be non-negative"))]
    pub offset: Option<i64>,
}

impl From<ClaxonListQuery> for ClaxonFilters {
    fn from(q: ClaxonListQuery) -> Self {
        ClaxonFilters {
            read: q.read,
            claxon_type: q.claxon_type,
            sender_language: q.sender_language,
            limit: q.limit.unwrap_or(20),
            offset: q.offset.unwrap_or(0),
        }
    }
}

/// Read-status patch; the only mutation a claxon supports
#[derive(Debug, Default, Deserialize)]
pub struct UpdateClaxonRequest {
    pub read: Option<bool>,
}

/// Unread count response
#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}

/// `POST /claxons`
///
/// Returns 201 with the composite view (sender/recipient projections,
/// vehicle, template). All referential failures are 404; the
/// vehicle-ownership message stays vague on purpose.
pub async fn create_claxon(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateClaxonRequest>,
) -> ApiResult<(StatusCode, Json<ClaxonView>)> {
    req.validate().map_err(ApiError::from)?;
    req.validate_content()?;

    let view = state
        .services
        .claxons
        .create(
            &auth.external_id,
            CreateClaxonInput {
                recipient_id: req.recipient_id,
                vehicle_id: req.vehicle_id,
                template_id: req.template_id,
                custom_message: req.custom_message,
                claxon_type: req.claxon_type,
                sender_language: req.sender_language,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(view)))
}

/// `GET /claxons/inbox`
pub async fn inbox(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ClaxonListQuery>,
) -> ApiResult<Json<Vec<ClaxonView>>> {
    query.validate().map_err(ApiError::from)?;

    let claxons = state
        .services
        .claxons
        .inbox(&auth.external_id, &query.into())
        .await?;

    Ok(Json(claxons))
}

/// `GET /claxons/inbox/unread-count`
pub async fn unread_count(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UnreadCountResponse>> {
    let count = state.services.claxons.unread_count(&auth.external_id).await?;

    Ok(Json(UnreadCountResponse { count }))
}

/// `GET /claxons/sent`
pub async fn sent(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ClaxonListQuery>,
) -> ApiResult<Json<Vec<ClaxonView>>> {
    query.validate().map_err(ApiError::from)?;

    let claxons = state
        .services
        .claxons
        .sent(&auth.external_id, &query.into())
        .await?;

    Ok(Json(claxons))
}

/// `GET /claxons/:id`
pub async fn get_claxon(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ClaxonView>> {
    let view = state
        .services
        .claxons
        .find_one(id, &auth.external_id)
        .await?;

    Ok(Json(view))
}

/// `PATCH /claxons/:id`
///
/// Recipient-only. The sender attempting this gets the same 404 a
/// stranger would.
pub async fn update_claxon(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateClaxonRequest>,
) -> ApiResult<Json<Claxon>> {
    let claxon = state
        .services
        .claxons
        .update(id, &auth.external_id, UpdateClaxonInput { read: req.read })
        .await?;

    Ok(Json(claxon))
}
