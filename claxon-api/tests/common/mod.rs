//! Common test utilities for integration tests.
//!
//! Provides a `TestContext` wiring a real database, the full router, and
//! token helpers that stand in for the identity provider. Each context
//! generates unique external ids/phones/emails/plates so runs don't
//! collide in a shared test database.

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use claxon_api::app::{build_router, AppState};
use claxon_api::config::Config;
use claxon_shared::auth::jwt::{create_token, Claims};
use claxon_shared::models::user::{CreateUser, User};
use claxon_shared::models::vehicle::{CreateVehicle, Vehicle};
use claxon_shared::services::Services;
use sqlx::PgPool;
use tower::ServiceExt as _;
use uuid::Uuid;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub services: Services,
    pub config: Config,
}

impl TestContext {
    /// Creates a new test context against the configured database.
    ///
    /// Requires `DATABASE_URL` and `JWT_SECRET` in the environment (a
    /// `.env` file works).
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Path relative to the claxon-api crate root
        sqlx::migrate!("../migrations").run(&db).await?;

        let services = Services::new(db.clone());
        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(Self {
            db,
            app,
            services,
            config,
        })
    }

    /// Signs a token for the given external id, as the identity provider
    /// would
    pub fn token_for(&self, external_id: &str) -> String {
        let claims = Claims::new(external_id, None, &self.config.jwt.issuer);
        create_token(&claims, &self.config.jwt.secret).expect("token creation failed")
    }

    /// Signs an admin token
    pub fn admin_token_for(&self, external_id: &str) -> String {
        let claims = Claims::new(
            external_id,
            Some("admin".to_string()),
            &self.config.jwt.issuer,
        );
        create_token(&claims, &self.config.jwt.secret).expect("token creation failed")
    }

    /// Creates a user with unique phone/email through the service layer
    pub async fn create_user(&self, first_name: &str) -> anyhow::Result<User> {
        let suffix = Uuid::new_v4().simple().to_string();
        let external_id = format!("user_{}", &suffix[..16]);

        let user = self
            .services
            .users
            .create(
                &external_id,
                CreateUser {
                    phone: format!("+40{}", &suffix[..9]),
                    email: format!("{}@example.com", &suffix[..12]),
                    first_name: Some(first_name.to_string()),
                    last_name: Some("Test".to_string()),
                    date_of_birth: None,
                    gender: None,
                    language: Some("ro".to_string()),
                    avatar_url: None,
                },
            )
            .await?;

        Ok(user)
    }

    /// Creates a vehicle for the given owner with a unique plate
    pub async fn create_vehicle(&self, owner: &User, is_active: bool) -> anyhow::Result<Vehicle> {
        let suffix = Uuid::new_v4().simple().to_string();

        let vehicle = self
            .services
            .vehicles
            .create(
                &owner.id,
                CreateVehicle {
                    plate_number: format!("B{}", &suffix[..8].to_uppercase()),
                    plate_country: Some("RO".to_string()),
                    plate_type: Some("standard".to_string()),
                    brand: Some("Dacia".to_string()),
                    model: Some("Logan".to_string()),
                    color: Some("blue".to_string()),
                    vin: None,
                    is_active: Some(is_active),
                },
            )
            .await?;

        Ok(vehicle)
    }

    /// Sends a request through the router
    pub async fn request(&self, req: Request<Body>) -> Response<axum::body::Body> {
        self.app.clone().oneshot(req).await.expect("request failed")
    }
}

/// Builds an authenticated JSON request
pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request build failed"),
        None => builder.body(Body::empty()).expect("request build failed"),
    }
}

/// Asserts a status, printing the body on mismatch
pub async fn expect_status(
    response: Response<axum::body::Body>,
    expected: StatusCode,
) -> serde_json::Value {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body read failed");

    if status != expected {
        panic!(
            "Expected {}, got {}: {}",
            expected,
            status,
            String::from_utf8_lossy(&bytes)
        );
    }

    if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body was not JSON")
    }
}
