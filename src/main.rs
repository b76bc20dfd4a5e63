mod app;
mod auth;
mod config;
mod db;
mod de;
mod error;
mod geo;
mod ingest;
mod state;
mod stations;

use crate::{config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "velib_stations=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    let app_state = AppState::init(config).await?;

    if let Some(seed) = &app_state.config.seed_user {
        if let Err(e) = auth::handlers::ensure_seed_user(app_state.users.as_ref(), seed).await {
            tracing::warn!(error = %e, "seed user skipped");
        }
    }

    // Must finish before the listener accepts requests.
    ingest::run_at_startup(&app_state.config.ingest, app_state.stations.as_ref()).await;

    app::serve(app::build_app(app_state)).await
}
