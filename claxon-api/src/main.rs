//! # Claxon API Server
//!
//! REST API for the Claxon plate-to-plate messaging service: user
//! accounts, vehicles with public plate search, admin-managed message
//! templates, and the claxon exchange itself.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/claxon \
//! JWT_SECRET=$(openssl rand -hex 32) \
//! cargo run -p claxon-api
//! ```

use claxon_api::app::{build_router, AppState};
use claxon_api::config::Config;
use claxon_shared::db::{migrations, pool};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "claxon_api=info,claxon_shared=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Claxon API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    migrations::run_migrations(&db).await?;

    let bind_address = config.bind_address();
    let state = AppState::new(db.clone(), config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    pool::close_pool(db).await;

    Ok(())
}
