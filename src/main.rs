use std::env;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod core;
mod domain;
mod errors;
mod routes;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_level(true)
        .init();

    let state = app_state::build_app_state()?;
    let app = routes::app_router().with_state(state);

    let addr = env::var("COSTPLAN_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "costplan-core listening");

    axum::serve(listener, app).await?;
    Ok(())
}
