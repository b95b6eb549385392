//! Application state and router builder.
//!
//! `AppState` bundles the connection pool, the services, and the
//! configuration; it is constructed once in `main` and handed to every
//! handler through Axum's `State` extractor (cheap clones, `Arc` inside).
//! There are no module-level singletons anywhere.
//!
//! # Router layout
//!
//! ```text
//! /
//! ├── /health                                  # public
//! ├── /vehicles/search/:plate_number           # public plate search
//! ├── /claxon-templates                        # GET public, POST admin
//! │   ├── /category/:category                  # GET public
//! │   └── /:id                                 # GET public, PATCH/DELETE admin
//! ├── /users                                   # authenticated
//! │   └── /me
//! ├── /vehicles                                # authenticated
//! │   └── /:id
//! └── /claxons                                 # authenticated
//!     ├── /inbox
//!     ├── /inbox/unread-count
//!     ├── /sent
//!     └── /:id
//! ```

use crate::config::Config;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, patch, post},
    Router,
};
use claxon_shared::auth::middleware::authenticate_bearer;
use claxon_shared::services::Services;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state, cloned per request handler.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (health checks only; data access goes
    /// through the services)
    pub db: PgPool,

    /// Business services
    pub services: Services,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state, constructing every service over
    /// the pool.
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            services: Services::new(db.clone()),
            db,
            config: Arc::new(config),
        }
    }

    /// JWT signing secret shared with the identity provider
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Expected JWT issuer
    pub fn jwt_issuer(&self) -> &str {
        &self.config.jwt.issuer
    }
}

/// Builds the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Public routes, no auth
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route(
            "/vehicles/search/:plate_number",
            get(routes::vehicles::search_by_plate),
        )
        .route("/claxon-templates", get(routes::templates::list_templates))
        .route(
            "/claxon-templates/category/:category",
            get(routes::templates::list_by_category),
        )
        .route("/claxon-templates/:id", get(routes::templates::get_template));

    // Everything below requires a valid bearer token. Admin-only routes
    // additionally check the role claim inside the handler.
    let authed_routes = Router::new()
        .route("/users", post(routes::users::create_user))
        .route(
            "/users/me",
            get(routes::users::get_me)
                .patch(routes::users::update_me)
                .delete(routes::users::delete_me),
        )
        .route(
            "/vehicles",
            post(routes::vehicles::create_vehicle).get(routes::vehicles::list_vehicles),
        )
        .route(
            "/vehicles/:id",
            get(routes::vehicles::get_vehicle)
                .patch(routes::vehicles::update_vehicle)
                .delete(routes::vehicles::delete_vehicle),
        )
        .route("/claxon-templates", post(routes::templates::create_template))
        .route(
            "/claxon-templates/:id",
            patch(routes::templates::update_template)
                .delete(routes::templates::delete_template),
        )
        .route("/claxons", post(routes::claxons::create_claxon))
        .route("/claxons/inbox", get(routes::claxons::inbox))
        .route(
            "/claxons/inbox/unread-count",
            get(routes::claxons::unread_count),
        )
        .route("/claxons/sent", get(routes::claxons::sent))
        .route(
            "/claxons/:id",
            get(routes::claxons::get_claxon).patch(routes::claxons::update_claxon),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(public_routes)
        .merge(authed_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Bearer authentication middleware.
///
/// Validates the token from the Authorization header and injects the
/// caller's `AuthContext` into request extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_context = authenticate_bearer(req.headers(), state.jwt_secret(), state.jwt_issuer())?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
