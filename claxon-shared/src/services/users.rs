//! User account flows.

use sqlx::PgPool;
use tracing::info;

use super::{ServiceError, ServiceResult};
use crate::models::user::{CreateUser, UpdateUser, User};

/// Account creation, profile reads/edits, and deletion.
#[derive(Clone)]
pub struct UsersService {
    pool: PgPool,
}

impl UsersService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates an account for a freshly verified external id.
    ///
    /// Runs three sequential uniqueness checks (external id, phone,
    /// email), each failing with `Conflict` before anything is written.
    /// The row's primary key is the external id itself.
    pub async fn create(&self, external_id: &str, data: CreateUser) -> ServiceResult<User> {
        if User::find_by_id(&self.pool, external_id).await?.is_some() {
            return Err(ServiceError::Conflict(
                "An account already exists for this user".to_string(),
            ));
        }

        if User::find_by_phone(&self.pool, &data.phone).await?.is_some() {
            return Err(ServiceError::Conflict(
                "Phone number already in use".to_string(),
            ));
        }

        if User::find_by_email(&self.pool, &data.email).await?.is_some() {
            return Err(ServiceError::Conflict("Email already in use".to_string()));
        }

        let user = User::insert(&self.pool, external_id, data).await?;

        info!(user_id = %user.id, "User account created");

        Ok(user)
    }

    /// Looks up the caller's own account.
    pub async fn find_by_external_id(&self, external_id: &str) -> ServiceResult<User> {
        User::find_by_id(&self.pool, external_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }

    /// Applies a partial profile update, stamping `updated_at`.
    pub async fn update(&self, external_id: &str, data: UpdateUser) -> ServiceResult<User> {
        User::update(&self.pool, external_id, data)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }

    /// Hard-deletes the account. Vehicles and claxons cascade away at the
    /// database level.
    pub async fn remove(&self, external_id: &str) -> ServiceResult<()> {
        let deleted = User::delete(&self.pool, external_id).await?;

        if !deleted {
            return Err(ServiceError::NotFound("User not found".to_string()));
        }

        info!(user_id = %external_id, "User account deleted");

        Ok(())
    }
}
