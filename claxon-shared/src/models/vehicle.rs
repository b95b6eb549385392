//! Vehicle model and database operations.
//!
//! Every vehicle belongs to exactly one user and cascades away with it.
//! Plate numbers are normalized to uppercase on write so the public plate
//! search is case-insensitive with a plain equality index. The `is_active`
//! flag gates visibility in plate search only; owners always see their own
//! vehicles.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE vehicles (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     plate_number VARCHAR(20) NOT NULL,
//!     plate_country VARCHAR(5),
//!     plate_type VARCHAR(20),
//!     brand VARCHAR(100),
//!     model VARCHAR(100),
//!     color VARCHAR(50),
//!     vin VARCHAR(17),
//!     is_active BOOLEAN NOT NULL DEFAULT TRUE,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::user::{PrivacySettings, UserSummary};

/// Normalizes a plate number for storage and lookup.
pub fn normalize_plate(plate: &str) -> String {
    plate.trim().to_uppercase()
}

/// Vehicle model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Vehicle {
    pub id: Uuid,

    /// Owning user's external id
    pub user_id: String,

    /// Uppercase-normalized plate number
    pub plate_number: String,

    pub plate_country: Option<String>,
    pub plate_type: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub vin: Option<String>,

    /// Whether the vehicle is visible in public plate search
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a vehicle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVehicle {
    pub plate_number: String,
    pub plate_country: Option<String>,
    pub plate_type: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub vin: Option<String>,
    /// Defaults to true when omitted
    pub is_active: Option<bool>,
}

/// Input for updating a vehicle; only non-None fields are written
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateVehicle {
    pub plate_number: Option<String>,
    pub plate_country: Option<String>,
    pub plate_type: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub vin: Option<String>,
    pub is_active: Option<bool>,
}

/// Optional equality filters for an owner's vehicle listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VehicleFilters {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub plate_type: Option<String>,
    pub plate_country: Option<String>,
    pub is_active: Option<bool>,
}

/// A plate search hit: the vehicle plus its owner's restricted projection.
///
/// Only id and names are ever exposed; owners who opted out of name
/// visibility appear with both names absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlateSearchResult {
    pub vehicle: Vehicle,
    pub owner: UserSummary,
}

#[derive(sqlx::FromRow)]
struct PlateSearchRow {
    id: Uuid,
    user_id: String,
    plate_number: String,
    plate_country: Option<String>,
    plate_type: Option<String>,
    brand: Option<String>,
    model: Option<String>,
    color: Option<String>,
    vin: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    owner_first_name: Option<String>,
    owner_last_name: Option<String>,
    owner_privacy_settings: Json<PrivacySettings>,
}

impl Vehicle {
    /// Inserts a vehicle for the given owner.
    ///
    /// The plate number is normalized to uppercase before storage.
    pub async fn insert(
        pool: &PgPool,
        user_id: &str,
        data: CreateVehicle,
    ) -> Result<Self, sqlx::Error> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (user_id, plate_number, plate_country, plate_type,
                                  brand, model, color, vin, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, user_id, plate_number, plate_country, plate_type, brand,
                      model, color, vin, is_active, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(normalize_plate(&data.plate_number))
        .bind(data.plate_country)
        .bind(data.plate_type)
        .bind(data.brand)
        .bind(data.model)
        .bind(data.color)
        .bind(data.vin)
        .bind(data.is_active.unwrap_or(true))
        .fetch_one(pool)
        .await?;

        Ok(vehicle)
    }

    /// Lists an owner's vehicles with optional equality filters,
    /// newest first.
    pub async fn list_by_owner(
        pool: &PgPool,
        user_id: &str,
        filters: &VehicleFilters,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = String::from(
            "SELECT id, user_id, plate_number, plate_country, plate_type, brand, \
             model, color, vin, is_active, created_at, updated_at \
             FROM vehicles WHERE user_id = $1",
        );
        let mut bind_count = 1;

        if filters.brand.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND brand = ${}", bind_count));
        }
        if filters.model.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND model = ${}", bind_count));
        }
        if filters.color.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND color = ${}", bind_count));
        }
        if filters.plate_type.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND plate_type = ${}", bind_count));
        }
        if filters.plate_country.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND plate_country = ${}", bind_count));
        }
        if filters.is_active.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND is_active = ${}", bind_count));
        }

        query.push_str(" ORDER BY created_at DESC");

        let mut q = sqlx::query_as::<_, Vehicle>(&query).bind(user_id);

        if let Some(ref brand) = filters.brand {
            q = q.bind(brand);
        }
        if let Some(ref model) = filters.model {
            q = q.bind(model);
        }
        if let Some(ref color) = filters.color {
            q = q.bind(color);
        }
        if let Some(ref plate_type) = filters.plate_type {
            q = q.bind(plate_type);
        }
        if let Some(ref plate_country) = filters.plate_country {
            q = q.bind(plate_country);
        }
        if let Some(is_active) = filters.is_active {
            q = q.bind(is_active);
        }

        let vehicles = q.fetch_all(pool).await?;

        Ok(vehicles)
    }

    /// Finds a vehicle scoped to its owner.
    ///
    /// Generic over the executor: the claxon create flow uses this inside
    /// its transaction to enforce "vehicle belongs to recipient".
    pub async fn find_by_id_and_owner<'e, E>(
        executor: E,
        id: Uuid,
        user_id: &str,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT id, user_id, plate_number, plate_country, plate_type, brand,
                   model, color, vin, is_active, created_at, updated_at
            FROM vehicles
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(vehicle)
    }

    /// Public plate search.
    ///
    /// Case-insensitive via uppercase normalization on both sides,
    /// restricted to active vehicles, with the owner reduced to the
    /// restricted projection. Owners who disabled name visibility are
    /// returned with names absent.
    pub async fn search_by_plate(
        pool: &PgPool,
        plate_number: &str,
    ) -> Result<Vec<PlateSearchResult>, sqlx::Error> {
        let rows = sqlx::query_as::<_, PlateSearchRow>(
            r#"
            SELECT v.id, v.user_id, v.plate_number, v.plate_country, v.plate_type,
                   v.brand, v.model, v.color, v.vin, v.is_active, v.created_at,
                   v.updated_at,
                   u.first_name AS owner_first_name,
                   u.last_name AS owner_last_name,
                   u.privacy_settings AS owner_privacy_settings
            FROM vehicles v
            INNER JOIN users u ON u.id = v.user_id
            WHERE v.plate_number = $1 AND v.is_active = TRUE
            ORDER BY v.created_at DESC
            "#,
        )
        .bind(normalize_plate(plate_number))
        .fetch_all(pool)
        .await?;

        let results = rows
            .into_iter()
            .map(|row| {
                let show_name = row.owner_privacy_settings.0.show_name_in_search;
                PlateSearchResult {
                    owner: UserSummary {
                        id: row.user_id.clone(),
                        first_name: row.owner_first_name.filter(|_| show_name),
                        last_name: row.owner_last_name.filter(|_| show_name),
                    },
                    vehicle: Vehicle {
                        id: row.id,
                        user_id: row.user_id,
                        plate_number: row.plate_number,
                        plate_country: row.plate_country,
                        plate_type: row.plate_type,
                        brand: row.brand,
                        model: row.model,
                        color: row.color,
                        vin: row.vin,
                        is_active: row.is_active,
                        created_at: row.created_at,
                        updated_at: row.updated_at,
                    },
                }
            })
            .collect();

        Ok(results)
    }

    /// Updates a vehicle, re-verifying ownership in the WHERE clause.
    ///
    /// Returns None when the vehicle doesn't exist or belongs to someone
    /// else.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        user_id: &str,
        data: UpdateVehicle,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE vehicles SET updated_at = NOW()");
        let mut bind_count = 2;

        if data.plate_number.is_some() {
            bind_count += 1;
            query.push_str(&format!(", plate_number = ${}", bind_count));
        }
        if data.plate_country.is_some() {
            bind_count += 1;
            query.push_str(&format!(", plate_country = ${}", bind_count));
        }
        if data.plate_type.is_some() {
            bind_count += 1;
            query.push_str(&format!(", plate_type = ${}", bind_count));
        }
        if data.brand.is_some() {
            bind_count += 1;
            query.push_str(&format!(", brand = ${}", bind_count));
        }
        if data.model.is_some() {
            bind_count += 1;
            query.push_str(&format!(", model = ${}", bind_count));
        }
        if data.color.is_some() {
            bind_count += 1;
            query.push_str(&format!(", color = ${}", bind_count));
        }
        if data.vin.is_some() {
            bind_count += 1;
            query.push_str(&format!(", vin = ${}", bind_count));
        }
        if data.is_active.is_some() {
            bind_count += 1;
            query.push_str(&format!(", is_active = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 AND user_id = $2 RETURNING id, user_id, plate_number, \
             plate_country, plate_type, brand, model, color, vin, is_active, \
             created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Vehicle>(&query).bind(id).bind(user_id);

        if let Some(plate_number) = data.plate_number {
            q = q.bind(normalize_plate(&plate_number));
        }
        if let Some(plate_country) = data.plate_country {
            q = q.bind(plate_country);
        }
        if let Some(plate_type) = data.plate_type {
            q = q.bind(plate_type);
        }
        if let Some(brand) = data.brand {
            q = q.bind(brand);
        }
        if let Some(model) = data.model {
            q = q.bind(model);
        }
        if let Some(color) = data.color {
            q = q.bind(color);
        }
        if let Some(vin) = data.vin {
            q = q.bind(vin);
        }
        if let Some(is_active) = data.is_active {
            q = q.bind(is_active);
        }

        let vehicle = q.fetch_optional(pool).await?;

        Ok(vehicle)
    }

    /// Deletes a vehicle, re-verifying ownership.
    pub async fn delete(pool: &PgPool, id: Uuid, user_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_plate() {
        assert_eq!(normalize_plate("abc123"), "ABC123");
        assert_eq!(normalize_plate("  b 01 xyz "), "B 01 XYZ");
        assert_eq!(normalize_plate("ABC123"), "ABC123");
    }

    #[test]
    fn test_create_vehicle_defaults() {
        let create = CreateVehicle {
            plate_number: "b01abc".to_string(),
            plate_country: Some("RO".to_string()),
            plate_type: None,
            brand: Some("Dacia".to_string()),
            model: None,
            color: None,
            vin: None,
            is_active: None,
        };

        assert!(create.is_active.unwrap_or(true));
    }

    #[test]
    fn test_vehicle_filters_default_is_empty() {
        let filters = VehicleFilters::default();
        assert!(filters.brand.is_none());
        assert!(filters.is_active.is_none());
    }
}
