use serde::Serialize;
use tripscope::analytics::{Distribution, TripMetric};

#[derive(Debug, Clone, Serialize)]
pub struct PassengerDto {
    pub passenger_count: u32,
    pub frequency: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisDto {
    Empty {
        message: &'static str,
    },
    Passengers {
        trips: usize,
        frequencies: Vec<PassengerDto>,
    },
    Distribution {
        trips: usize,
        metric: TripMetric,
        stats: Option<Distribution>,
    },
}
