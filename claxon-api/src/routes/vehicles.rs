//! Vehicle endpoints.
//!
//! All mutations are scoped to the authenticated owner. The plate search
//! is the one public route: it returns active vehicles only, with the
//! owner reduced to id + names.
//!
//! # Endpoints
//!
//! - `POST /vehicles` - create
//! - `GET /vehicles?brand=&model=&color=&plate_type=&plate_country=&is_active=` - own vehicles
//! - `GET /vehicles/:id` - one of the caller's vehicles
//! - `PATCH /vehicles/:id` / `DELETE /vehicles/:id`
//! - `GET /vehicles/search/:plate_number` - public plate search

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
use claxon_shared::models::vehicle::{
    CreateVehicle, PlateSearchResult, UpdateVehicle, Vehicle, VehicleFilters,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Create vehicle request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 2, max = 20, message = "Plate number must be 2-20 characters"))]
    pub plate_number: String,

    #[validate(length(min = 2, max = 5, message = "Plate country must be a short code"))]
    pub plate_country: Option<String>,

    #[validate(length(max = 20, message = "Plate type must be at most 20 characters"))]
    pub plate_type: Option<String>,

    #[validate(length(max = 100, message = "Brand must be at most 100 characters"))]
    pub brand: Option<String>,

    #[validate(length(max = 100, message = "Model must be at most 100 characters"))]
    pub model: Option<String>,

    #[validate(length(max = 50, message = "Color must be at most 50 characters"))]
    pub color: Option<String>,

    #[validate(length(min = 11, max = 17, message = "VIN must be 11-17 characters"))]
    pub vin: Option<String>,

    pub is_active: Option<bool>,
}

/// Vehicle edit request; all fields optional
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[validate(length(min = 2, max = 20, message = "Plate number must be 2-20 characters"))]
    pub plate_number: Option<String>,

    #[validate(length(min = 2, max = 5, message = "Plate country must be a short code"))]
    pub plate_country: Option<String>,

    #[validate(length(max = 20, message = "Plate type must be at most 20 characters"))]
    pub plate_type: Option<String>,

    #[validate(length(max = 100, message = "Brand must be at most 100 characters"))]
    pub brand: Option<String>,

    #[validate(length(max = 100, message = "Model must be at most 100 characters"))]
    pub model: Option<String>,

    #[validate(length(max = 50, message = "Color must be at most 50 characters"))]
    pub color: Option<String>,

    #[validate(length(min = 11, max = 17, message = "VIN must be 11-17 characters"))]
    pub vin: Option<String>,

    pub is_active: Option<bool>,
}

/// Equality filters for the owner's vehicle listing
#[derive(Debug, Default, Deserialize)]
pub struct VehicleListQuery {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub plate_type: Option<String>,
    pub plate_country: Option<String>,
    pub is_active: Option<bool>,
}

impl From<VehicleListQuery> for VehicleFilters {
    fn from(q: VehicleListQuery) -> Self {
        VehicleFilters {
            brand: q.brand,
            model: q.model,
            color: q.color,
            plate_type: q.plate_type,
            plate_country: q.plate_country,
            is_active: q.is_active,
        }
    }
}

/// `POST /vehicles`
pub async fn create_vehicle(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateVehicleRequest>,
) -> ApiResult<(StatusCode, Json<Vehicle>)> {
    req.validate().map_err(ApiError::from)?;

    let vehicle = state
        .services
        .vehicles
        .create(
            &auth.external_id,
            CreateVehicle {
                plate_number: req.plate_number,
                plate_country: req.plate_country,
                plate_type: req.plate_type,
                brand: req.brand,
                model: req.model,
                color: req.color,
                vin: req.vin,
                is_active: req.is_active,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(vehicle)))
}

/// `GET /vehicles`
pub async fn list_vehicles(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<VehicleListQuery>,
) -> ApiResult<Json<Vec<Vehicle>>> {
    let vehicles = state
        .services
        .vehicles
        .list_by_owner(&auth.external_id, &query.into())
        .await?;

    Ok(Json(vehicles))
}

/// `GET /vehicles/:id`
pub async fn get_vehicle(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vehicle>> {
    let vehicle = state
        .services
        .vehicles
        .find_one(id, &auth.external_id)
        .await?;

    Ok(Json(vehicle))
}

/// `GET /vehicles/search/:plate_number` (public)
pub async fn search_by_plate(
    State(state): State<AppState>,
    Path(plate_number): Path<String>,
) -> ApiResult<Json<Vec<PlateSearchResult>>> {
    let results = state
        .services
        .vehicles
        .search_by_plate(&plate_number)
        .await?;

    Ok(Json(results))
}

/// `PATCH /vehicles/:id`
pub async fn update_vehicle(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateVehicleRequest>,
) -> ApiResult<Json<Vehicle>> {
    req.validate().map_err(ApiError::from)?;

    let vehicle = state
        .services
        .vehicles
        .update(
            id,
            &auth.external_id,
            UpdateVehicle {
                plate_number: req.plate_number,
                plate_country: req.plate_country,
                plate_type: req.plate_type,
                brand: req.brand,
                model: req.model,
                color: req.color,
                vin: req.vin,
                is_active: req.is_active,
            },
        )
        .await?;

    Ok(Json(vehicle))
}

/// `DELETE /vehicles/:id`
pub async fn delete_vehicle(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .services
        .vehicles
        .remove(id, &auth.external_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
