//! Storefront entry-point: reads configuration, wires adapters, serves HTTP.

mod server;

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Context, Result};
use mockable::{DefaultClock, DefaultEnv};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, create_server};
use storefront::config::{ServerSettings, app_config_from_env};
use storefront::inbound::http::health::HealthState;

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let app_config = app_config_from_env(&DefaultEnv::new()).wrap_err("invalid environment")?;
    let settings = ServerSettings::load().wrap_err("invalid server settings")?;
    let config = ServerConfig::new(&app_config, &settings, Arc::new(DefaultClock));

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config).wrap_err("failed to bind listener")?;
    let (host, port) = settings.bind_addr();
    info!(%host, port, "storefront listening");
    server.await.wrap_err("server terminated")
}
