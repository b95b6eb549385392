//! Vehicle flows: owner-scoped CRUD plus the public plate search.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::models::user::User;
use crate::models::vehicle::{
    CreateVehicle, PlateSearchResult, UpdateVehicle, Vehicle, VehicleFilters,
};

/// Vehicle CRUD with ownership enforced on every mutation, and the
/// public case-insensitive plate search.
#[derive(Clone)]
pub struct VehiclesService {
    pool: PgPool,
}

impl VehiclesService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a vehicle for the caller.
    ///
    /// The owner's account must exist; a verified token alone isn't
    /// enough to own vehicles.
    pub async fn create(&self, external_id: &str, data: CreateVehicle) -> ServiceResult<Vehicle> {
        let owner = User::find_by_id(&self.pool, external_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;

        let vehicle = Vehicle::insert(&self.pool, &owner.id, data).await?;

        info!(vehicle_id = %vehicle.id, user_id = %owner.id, "Vehicle created");

        Ok(vehicle)
    }

    /// Lists the caller's vehicles, optionally filtered, newest first.
    pub async fn list_by_owner(
        &self,
        external_id: &str,
        filters: &VehicleFilters,
    ) -> ServiceResult<Vec<Vehicle>> {
        let owner = User::find_by_id(&self.pool, external_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;

        Ok(Vehicle::list_by_owner(&self.pool, &owner.id, filters).await?)
    }

    /// Fetches one of the caller's vehicles. A vehicle belonging to
    /// someone else is indistinguishable from a missing one.
    pub async fn find_one(&self, id: Uuid, external_id: &str) -> ServiceResult<Vehicle> {
        Vehicle::find_by_id_and_owner(&self.pool, id, external_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Vehicle not found".to_string()))
    }

    /// Public plate search: case-insensitive, active vehicles only,
    /// owners reduced to the restricted projection.
    pub async fn search_by_plate(&self, plate_number: &str) -> ServiceResult<Vec<PlateSearchResult>> {
        Ok(Vehicle::search_by_plate(&self.pool, plate_number).await?)
    }

    /// Updates one of the caller's vehicles.
    pub async fn update(
        &self,
        id: Uuid,
        external_id: &str,
        data: UpdateVehicle,
    ) -> ServiceResult<Vehicle> {
        Vehicle::update(&self.pool, id, external_id, data)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Vehicle not found".to_string()))
    }

    /// Deletes one of the caller's vehicles; claxons about it cascade
    /// away at the database level.
    pub async fn remove(&self, id: Uuid, external_id: &str) -> ServiceResult<()> {
        let deleted = Vehicle::delete(&self.pool, id, external_id).await?;

        if !deleted {
            return Err(ServiceError::NotFound("Vehicle not found".to_string()));
        }

        info!(vehicle_id = %id, user_id = %external_id, "Vehicle deleted");

        Ok(())
    }
}
