use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::{
    repository::{TripRecord, TripStore},
    shared::{
        geo::{BoundingBox, Coordinate},
        time::TimeWindow,
    },
};

/// Which end of a trip is placed on the map and tested against the bounds.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorMode {
    #[default]
    Pickup,
    Dropoff,
}

impl AnchorMode {
    /// Accepts `pickup(s)` and `dropoff(s)`, anything else is `Pickup`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "dropoff" | "dropoffs" => Self::Dropoff,
            _ => Self::Pickup,
        }
    }

    pub const fn toggle(&self) -> Self {
        match self {
            Self::Pickup => Self::Dropoff,
            Self::Dropoff => Self::Pickup,
        }
    }

    pub const fn anchor(&self, trip: &TripRecord) -> Coordinate {
        match self {
            Self::Pickup => trip.pickup,
            Self::Dropoff => trip.dropoff,
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pickup => "Showing pickups",
            Self::Dropoff => "Showing dropoffs",
        }
    }
}

/// Everything the user controls about the trips view.
/// Never patched in place, every interaction produces a new state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub time_window: TimeWindow,
    pub anchor_mode: AnchorMode,
    pub bounding_box: Option<BoundingBox>,
    pub selected_trip: Option<u32>,
}

impl ViewportState {
    pub fn new(time_window: TimeWindow) -> Self {
        Self {
            time_window,
            anchor_mode: Default::default(),
            bounding_box: None,
            selected_trip: None,
        }
    }

    /// Session start: the first hour of the data set, pickups, no bounds and
    /// nothing selected.
    pub fn initial(store: &TripStore) -> Self {
        let start = store
            .earliest_pickup()
            .unwrap_or(DateTime::UNIX_EPOCH.naive_utc());
        Self::new(TimeWindow::first_hour(start))
    }

    pub fn with_anchor_mode(self, anchor_mode: AnchorMode) -> Self {
        Self {
            anchor_mode,
            ..self
        }
    }

    pub fn with_bounding_box(self, bounding_box: Option<BoundingBox>) -> Self {
        Self {
            bounding_box,
            ..self
        }
    }

    pub fn with_selected_trip(self, selected_trip: Option<u32>) -> Self {
        Self {
            selected_trip,
            ..self
        }
    }
}
