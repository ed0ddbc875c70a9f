//! Xizuo · Workbook Answer Viewer Backend
//!
//! - Axum HTTP + WebSocket API over publisher-supplied answer JSON
//! - Data from a local directory, an upstream HTTP host, or built-in samples
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT          : u16 (default 3000)
//!   DATA_DIR      : local data root (default "./data"), served at /data
//!   DATA_BASE_URL : upstream /data base URL; overrides DATA_DIR when set
//!   CATALOG_CONFIG_PATH : path to TOML config (academic years per semester)
//!   LOG_LEVEL     : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT    : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod config;
mod schema;
mod seeds;
mod state;
mod protocol;
mod loader;
mod nav;
mod render;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Build shared application state (config, data source, catalog).
  let state = Arc::new(AppState::new());

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "xizuo_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
