mod analysis;
mod payments;
mod trips;

pub use analysis::*;
pub use payments::*;
pub use trips::*;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use tracing::warn;
use tripscope::{
    analytics,
    repository::TripStore,
    shared::{BoundingBox, TimeWindow},
    viewport::{AnchorMode, ViewportState},
};

use crate::dto::ErrorDto;

/// Builds the viewport of a request. Parameters that do not parse are logged
/// and replaced by their defaults, they never fail the request.
pub(crate) fn viewport_from_params(
    params: &HashMap<String, String>,
    store: &TripStore,
) -> ViewportState {
    let earliest = ViewportState::initial(store).time_window.start();
    let time_window = TimeWindow::from_inputs(
        params.get("date").map(String::as_str),
        params.get("start").map(String::as_str),
        params.get("end").map(String::as_str),
        earliest,
    );
    let anchor_mode = params
        .get("mode")
        .map(|mode| AnchorMode::parse(mode))
        .unwrap_or_default();
    let bounding_box = params.get("bounds").and_then(|value| {
        let bbox = BoundingBox::parse(value);
        if bbox.is_none() {
            warn!("Ignoring malformed bounds: {value}");
        }
        bbox
    });
    let selected_trip = params.get("selected").and_then(|value| {
        value
            .parse()
            .map_err(|err| warn!("Ignoring malformed selection {value}: {err}"))
            .ok()
    });

    ViewportState::new(time_window)
        .with_anchor_mode(anchor_mode)
        .with_bounding_box(bounding_box)
        .with_selected_trip(selected_trip)
}

pub(crate) fn unavailable(err: analytics::Error) -> Response {
    warn!("{err}");
    (
        StatusCode::NOT_FOUND,
        Json(ErrorDto {
            error: err.to_string(),
        }),
    )
        .into_response()
}

#[test]
fn malformed_params_fall_back_to_defaults() {
    let store = TripStore::new();
    let params: HashMap<String, String> = [
        ("bounds", "40.7,-74.0,north"),
        ("selected", "trip-7"),
        ("mode", "dropoff"),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value.to_string()))
    .collect();
    let viewport = viewport_from_params(&params, &store);
    assert_eq!(viewport.bounding_box, None);
    assert_eq!(viewport.selected_trip, None);
    assert_eq!(viewport.anchor_mode, AnchorMode::Dropoff);
    assert_eq!(viewport.time_window, ViewportState::initial(&store).time_window);
}

#[test]
fn well_formed_params_are_kept() {
    let store = TripStore::new();
    let params: HashMap<String, String> = [
        ("bounds", "40.8,-73.9,40.7,-74.0"),
        ("selected", "7"),
        ("date", "2015-01-15"),
        ("start", "19:00"),
        ("end", "20:00"),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value.to_string()))
    .collect();
    let viewport = viewport_from_params(&params, &store);
    assert_eq!(
        viewport.bounding_box,
        Some(BoundingBox::from([[40.7, -74.0], [40.8, -73.9]]))
    );
    assert_eq!(viewport.selected_trip, Some(7));
    assert_eq!(viewport.anchor_mode, AnchorMode::Pickup);
    let format = "%Y-%m-%d %H:%M";
    assert_eq!(
        viewport.time_window.start().format(format).to_string(),
        "2015-01-15 19:00"
    );
    assert_eq!(
        viewport.time_window.end().format(format).to_string(),
        "2015-01-15 20:00"
    );
}
