//! Business services: the single, framework-agnostic implementation of
//! every Claxon flow.
//!
//! Each service owns a clone of the connection pool and is constructed
//! once at process start, then threaded to request handlers through the
//! API's shared state. Handlers validate input into typed structs before
//! any service method runs; services never see unchecked input.
//!
//! Every "must exist" / "must belong to" precondition fails fast with
//! [`ServiceError::NotFound`] before any write. Mutations are single
//! statements downstream of all checks, except claxon creation, which
//! wraps its whole check-then-insert sequence in one transaction.

use sqlx::PgPool;

pub mod claxons;
pub mod templates;
pub mod users;
pub mod vehicles;

pub use claxons::ClaxonsService;
pub use templates::TemplatesService;
pub use users::UsersService;
pub use vehicles::VehiclesService;

/// Error type shared by all services.
///
/// The API layer maps these onto HTTP statuses (404/409/500).
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Referenced entity absent, or the caller has no access to it.
    /// Messages are sometimes deliberately vague so callers can't probe
    /// which condition failed.
    #[error("{0}")]
    NotFound(String),

    /// Uniqueness violation (duplicate account, phone, or email)
    #[error("{0}")]
    Conflict(String),

    /// Invariant violation that should be impossible; surfaces as 500
    #[error("{0}")]
    Internal(String),

    /// Underlying database failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type alias for service methods
pub type ServiceResult<T> = Result<T, ServiceError>;

/// All services bundled for injection into the API state.
#[derive(Clone)]
pub struct Services {
    pub users: UsersService,
    pub vehicles: VehiclesService,
    pub templates: TemplatesService,
    pub claxons: ClaxonsService,
}

impl Services {
    /// Constructs every service over the shared pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UsersService::new(pool.clone()),
            vehicles: VehiclesService::new(pool.clone()),
            templates: TemplatesService::new(pool.clone()),
            claxons: ClaxonsService::new(pool),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_display() {
        let err = ServiceError::NotFound("Vehicle not found".to_string());
        assert_eq!(err.to_string(), "Vehicle not found");

        let err = ServiceError::Conflict("Phone number already in use".to_string());
        assert_eq!(err.to_string(), "Phone number already in use");
    }
}
