use serde::Serialize;
use tripscope::{
    repository::TripRecord,
    viewport::{AnchorMode, VisibleSet},
};

use crate::{dto::TripDto, state::MarkerIcons};

#[derive(Debug, Clone, Serialize)]
pub struct MarkerDto {
    pub index: u32,
    pub kind: AnchorMode,
    pub position: [f64; 2],
    pub icon: &'static str,
    pub tooltip: &'static str,
}

impl MarkerDto {
    pub fn from(trip: &TripRecord, kind: AnchorMode, icons: &MarkerIcons) -> Self {
        let coordinate = kind.anchor(trip);
        let (icon, tooltip) = match kind {
            AnchorMode::Pickup => (icons.pickup, "Pickup"),
            AnchorMode::Dropoff => (icons.dropoff, "Dropoff"),
        };
        Self {
            index: trip.id,
            kind,
            position: [coordinate.latitude, coordinate.longitude],
            icon,
            tooltip,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VisibleDto {
    pub mode: AnchorMode,
    pub mode_label: &'static str,
    pub time_filtered: usize,
    pub count: usize,
    /// `[[lat_min, lon_min], [lat_max, lon_max]]` of the visible anchors.
    pub extent: Option<[[f64; 2]; 2]>,
    /// Map bounds to move to, only set when a trip is isolated.
    pub bounds: Option<[[f64; 2]; 2]>,
    pub center: Option<[f64; 2]>,
    pub trips: Vec<TripDto>,
    pub markers: Vec<MarkerDto>,
    pub info: Vec<String>,
}

impl VisibleDto {
    pub fn from(visible: &VisibleSet, icons: &MarkerIcons) -> Self {
        // An isolated trip shows both of its ends
        let markers = if visible.isolated {
            visible
                .markers
                .iter()
                .flat_map(|trip| {
                    [
                        MarkerDto::from(trip, AnchorMode::Pickup, icons),
                        MarkerDto::from(trip, AnchorMode::Dropoff, icons),
                    ]
                })
                .collect()
        } else {
            visible
                .markers
                .iter()
                .map(|trip| MarkerDto::from(trip, visible.anchor_mode, icons))
                .collect()
        };
        Self {
            mode: visible.anchor_mode,
            mode_label: visible.anchor_mode.label(),
            time_filtered: visible.time_filtered,
            count: visible.count,
            extent: visible.bbox.map(Into::into),
            bounds: visible.focus.map(|focus| focus.bounds.into()),
            center: visible
                .focus
                .map(|focus| [focus.center.latitude, focus.center.longitude]),
            trips: visible.trips.iter().map(TripDto::from).collect(),
            markers,
            info: visible.summary(),
        }
    }
}
