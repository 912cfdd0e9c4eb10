pub mod analytics;
pub mod repository;
pub mod shared;
pub mod source;
pub mod viewport;

pub mod prelude {
    pub use crate::{
        analytics::{
            BoroughMatrix, BoroughPyramid, Distribution, PaymentFlow, TripMetric, Waffle,
            borough_matrix, borough_profile, distribution, passenger_frequencies, payment_flow,
            waffle,
        },
        repository::{Column, PaymentType, TripRecord, TripStore},
        shared::{BoundingBox, Coordinate, TimeWindow},
        source::TripSource,
        viewport::{
            AnchorMode, MapFocus, ViewportState, VisibleSet, compute_visible, compute_visible_with,
        },
    };
}
