use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

mod config;
mod state;
pub use config::*;
pub use state::*;

use crate::{
    repository::{TripRecord, TripStore},
    shared::geo::{BoundingBox, Coordinate},
};

/// Where the map should move to when a single trip is isolated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapFocus {
    pub bounds: BoundingBox,
    pub center: Coordinate,
}

/// Result of one filtering pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibleSet {
    pub anchor_mode: AnchorMode,
    /// Trips left after the time filter alone.
    pub time_filtered: usize,
    pub count: usize,
    /// Extent of the anchor coordinates, None when nothing is visible.
    pub bbox: Option<BoundingBox>,
    pub trips: Vec<TripRecord>,
    /// Prefix of `trips` that should be drawn as markers.
    pub markers: Vec<TripRecord>,
    pub focus: Option<MapFocus>,
    pub isolated: bool,
}

impl VisibleSet {
    fn empty(anchor_mode: AnchorMode, time_filtered: usize) -> Self {
        Self {
            anchor_mode,
            time_filtered,
            count: 0,
            bbox: None,
            trips: Vec::new(),
            markers: Vec::new(),
            focus: None,
            isolated: false,
        }
    }

    fn isolated(
        trip: &TripRecord,
        anchor_mode: AnchorMode,
        time_filtered: usize,
        config: &Config,
    ) -> Self {
        let extent = BoundingBox::from_corners(trip.pickup, trip.dropoff);
        let bounds = extent.padded(config.isolation_padding, config.min_padding);
        Self {
            anchor_mode,
            time_filtered,
            count: 1,
            bbox: Some(extent),
            trips: vec![trip.clone()],
            markers: vec![trip.clone()],
            focus: Some(MapFocus {
                bounds,
                center: bounds.center(),
            }),
            isolated: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Short text describing the pass, one line per entry.
    pub fn summary(&self) -> Vec<String> {
        let mut lines = vec![format!("Trips in time window: {}", self.time_filtered)];
        if self.time_filtered == 0 {
            lines.push("No trips in the selected time window.".into());
            return lines;
        }
        match &self.bbox {
            Some(bbox) if self.count > 0 => {
                lines.push(format!("Visible trips: {}", self.count));
                lines.push(format!(
                    "Lat range: {:.4} to {:.4}",
                    bbox.south_west.latitude, bbox.north_east.latitude
                ));
                lines.push(format!(
                    "Lon range: {:.4} to {:.4}",
                    bbox.south_west.longitude, bbox.north_east.longitude
                ));
            }
            _ => lines.push("No trips visible in the current area.".into()),
        }
        lines
    }
}

pub fn compute_visible(store: &TripStore, viewport: &ViewportState) -> VisibleSet {
    compute_visible_with(store, viewport, &Config::default())
}

/// Decides which trips are visible for `viewport`.
///
/// The time window is applied first and an empty result ends the pass. A
/// selected trip that survived the time window is returned alone and skips the
/// spatial filter, a selection that did not is ignored. Otherwise every trip
/// whose anchor lies inside the bounding box is kept, in store order.
pub fn compute_visible_with(
    store: &TripStore,
    viewport: &ViewportState,
    config: &Config,
) -> VisibleSet {
    let anchor_mode = viewport.anchor_mode;
    let window = viewport.time_window;
    let time_filtered: Vec<&TripRecord> = store
        .trips()
        .par_iter()
        .filter(|trip| window.contains(&trip.pickup_time))
        .collect();

    if time_filtered.is_empty() {
        debug!("No trips between {} and {}", window.start(), window.end());
        return VisibleSet::empty(anchor_mode, 0);
    }

    if let Some(id) = viewport.selected_trip {
        match time_filtered.iter().find(|trip| trip.id == id) {
            Some(trip) => {
                return VisibleSet::isolated(trip, anchor_mode, time_filtered.len(), config);
            }
            None => debug!("Ignoring selected trip {id}, it is outside the time window"),
        }
    }

    let trips: Vec<TripRecord> = time_filtered
        .par_iter()
        .filter(|trip| {
            viewport
                .bounding_box
                .is_none_or(|bbox| bbox.contains(&anchor_mode.anchor(trip)))
        })
        .map(|trip| (*trip).clone())
        .collect();

    if trips.is_empty() {
        return VisibleSet::empty(anchor_mode, time_filtered.len());
    }

    let bbox = BoundingBox::enclosing(trips.iter().map(|trip| anchor_mode.anchor(trip)));
    let markers = trips.iter().take(config.marker_limit).cloned().collect();
    VisibleSet {
        anchor_mode,
        time_filtered: time_filtered.len(),
        count: trips.len(),
        bbox,
        trips,
        markers,
        focus: None,
        isolated: false,
    }
}

impl TripStore {
    pub fn visible(&self, viewport: &ViewportState) -> VisibleSet {
        compute_visible(self, viewport)
    }
}
