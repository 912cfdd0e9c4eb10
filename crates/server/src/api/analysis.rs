use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::{collections::HashMap, sync::Arc};
use tripscope::{
    analytics::{self, TripMetric},
    viewport::compute_visible_with,
};

use crate::{
    api::{unavailable, viewport_from_params},
    dto::{AnalysisDto, PassengerDto},
    state::AppState,
};

/// Chart data over the trips visible in the map.
pub async fn analysis(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, StatusCode> {
    let metric = params.get("metric").ok_or(StatusCode::BAD_REQUEST)?;
    let viewport = viewport_from_params(&params, &state.store);
    let visible = compute_visible_with(&state.store, &viewport, &state.viewport);
    let trips = visible.trips.len();

    let result = if visible.is_empty() {
        match metric.as_str() {
            "passengers" | "trip_time" | "trip_distance" => AnalysisDto::Empty {
                message: "No visible trips in the map area.",
            },
            _ => return Err(StatusCode::BAD_REQUEST),
        }
    } else {
        match metric.as_str() {
            "passengers" => AnalysisDto::Passengers {
                trips,
                frequencies: analytics::passenger_frequencies(&visible.trips)
                    .into_iter()
                    .map(|(passenger_count, frequency)| PassengerDto {
                        passenger_count,
                        frequency,
                    })
                    .collect(),
            },
            "trip_time" => AnalysisDto::Distribution {
                trips,
                metric: TripMetric::TripMinutes,
                stats: analytics::distribution(&visible.trips, TripMetric::TripMinutes),
            },
            "trip_distance" => AnalysisDto::Distribution {
                trips,
                metric: TripMetric::TripDistanceKm,
                stats: analytics::distribution(&visible.trips, TripMetric::TripDistanceKm),
            },
            _ => return Err(StatusCode::BAD_REQUEST),
        }
    };
    Ok(Json(result).into_response())
}

/// Borough charts over the whole data set.
pub async fn boroughs(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, StatusCode> {
    let trips = state.store.trips();
    let response = match params.get("metric").map(String::as_str) {
        Some("distance") => match analytics::borough_matrix(trips, TripMetric::TripDistanceKm) {
            Ok(matrix) => Json(matrix).into_response(),
            Err(err) => unavailable(err),
        },
        Some("time") => match analytics::borough_matrix(trips, TripMetric::TripMinutes) {
            Ok(matrix) => Json(matrix).into_response(),
            Err(err) => unavailable(err),
        },
        Some("pyramid") => match analytics::borough_profile(trips) {
            Ok(pyramid) => Json(pyramid).into_response(),
            Err(err) => unavailable(err),
        },
        _ => return Err(StatusCode::BAD_REQUEST),
    };
    Ok(response)
}
