//! Backend entry-point: wires REST endpoints and the WebSocket entry.

use actix_web::web;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http::health::HealthState;
use backend::server::{ServerSettings, create_server};
use ortho_config::OrthoConfig;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load().map_err(std::io::Error::other)?;
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, &settings)?;
    server.await
}
