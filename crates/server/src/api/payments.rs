use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tripscope::analytics;

use crate::{api::unavailable, state::AppState};

pub async fn flow(State(state): State<Arc<AppState>>) -> Result<Response, StatusCode> {
    Ok(match analytics::payment_flow(state.store.trips()) {
        Ok(flow) => Json(flow).into_response(),
        Err(err) => unavailable(err),
    })
}

pub async fn waffle(State(state): State<Arc<AppState>>) -> Result<Response, StatusCode> {
    Ok(match analytics::waffle(state.store.trips()) {
        Ok(waffle) => Json(waffle).into_response(),
        Err(err) => unavailable(err),
    })
}
