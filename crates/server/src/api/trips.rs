use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::{collections::HashMap, sync::Arc};
use tripscope::viewport::{AnchorMode, ViewportState, compute_visible_with};

use crate::{
    api::viewport_from_params,
    dto::{TripDetailDto, VisibleDto},
    state::AppState,
};

pub async fn visible(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, StatusCode> {
    let viewport = viewport_from_params(&params, &state.store);
    let visible = compute_visible_with(&state.store, &viewport, &state.viewport);
    Ok(Json(VisibleDto::from(&visible, &state.icons)).into_response())
}

pub async fn trip(
    Path(id): Path<u32>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, StatusCode> {
    let trip = state.store.row(id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(TripDetailDto::from(trip)).into_response())
}

#[derive(Debug, Clone, Serialize)]
struct SessionDto {
    date: String,
    start: String,
    end: String,
    mode: AnchorMode,
    mode_label: &'static str,
    center: [f64; 2],
    trips: usize,
}

/// Defaults for a fresh session: the first hour of data, pickups, map
/// centered on the median pickup.
pub async fn session(State(state): State<Arc<AppState>>) -> Result<Response, StatusCode> {
    let viewport = ViewportState::initial(&state.store);
    let window = viewport.time_window;
    let center = state.store.center();
    Ok(Json(SessionDto {
        date: window.start().format("%Y-%m-%d").to_string(),
        start: window.start().format("%H:%M").to_string(),
        end: window.end().format("%H:%M").to_string(),
        mode: viewport.anchor_mode,
        mode_label: viewport.anchor_mode.label(),
        center: [center.latitude, center.longitude],
        trips: state.store.len(),
    })
    .into_response())
}

#[derive(Debug, Clone, Serialize)]
struct ModeDto {
    mode: AnchorMode,
    label: &'static str,
}

pub async fn toggle_mode(
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, StatusCode> {
    let current = params
        .get("mode")
        .map(|mode| AnchorMode::parse(mode))
        .unwrap_or_default();
    let mode = current.toggle();
    Ok(Json(ModeDto {
        mode,
        label: mode.label(),
    })
    .into_response())
}
