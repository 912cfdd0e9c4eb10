mod api;
mod dto;
mod state;

use crate::state::AppState;
use axum::routing::get;
use std::{sync::Arc, time::Instant};
use tracing::{error, info, warn};
use tripscope::repository::TripStore;

const PORT: u32 = 3000;
const DEFAULT_DATA_PATH: &str = "uber_dataset_con_distritos.csv";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().init();

    info!("Starting server...");
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_DATA_PATH.into());

    info!("Loading data from {path}...");
    let now = Instant::now();
    let store = TripStore::load(&path);
    if store.is_empty() {
        warn!("No trips loaded, every view will be empty");
    }
    let state = Arc::new(AppState::new(store));
    info!("Loading data took {:?}", now.elapsed());

    let app = axum::Router::new()
        .route("/session", get(api::session))
        .route("/mode/toggle", get(api::toggle_mode))
        .route("/visible", get(api::visible))
        .route("/trips/{id}", get(api::trip))
        .route("/analysis", get(api::analysis))
        .route("/boroughs", get(api::boroughs))
        .route("/payments/flow", get(api::flow))
        .route("/payments/waffle", get(api::waffle))
        .with_state(state);
    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", PORT)).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Failed to bind port {PORT}: {err}");
            std::process::exit(1);
        }
    };
    info!("Listening to port {PORT}");
    if let Err(err) = axum::serve(listener, app).await {
        error!("Server stopped: {err}");
    }
}
