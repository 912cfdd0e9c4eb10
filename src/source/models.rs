use serde::{Deserialize, Serialize};

/// One raw row of the trip table.
/// Only the coordinates and the pickup time are required, every other column
/// may be missing from the file or empty in a row.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SourceTrip {
    pub pickup_latitude: f64,
    pub pickup_longitude: f64,
    pub dropoff_latitude: f64,
    pub dropoff_longitude: f64,
    pub tpep_pickup_datetime: String,
    #[serde(default)]
    pub tpep_dropoff_datetime: Option<String>,
    // Float because pandas writes "1.0" once a column has holes
    #[serde(default)]
    pub passenger_count: Option<f64>,
    #[serde(default)]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub trip_minutes: Option<f64>,
    #[serde(default)]
    pub trip_distance_km: Option<f64>,
    #[serde(default)]
    pub pickup_borough: Option<String>,
    #[serde(default)]
    pub dropoff_borough: Option<String>,
    #[serde(default)]
    pub payment_type: Option<String>,
    #[serde(default)]
    pub fare_amount: Option<f64>,
    #[serde(default)]
    pub extra: Option<f64>,
    #[serde(default)]
    pub tip_amount: Option<f64>,
    #[serde(default)]
    pub tolls_amount: Option<f64>,
    #[serde(default)]
    pub improvement_surcharge: Option<f64>,
}

pub const REQUIRED_COLUMNS: [&str; 5] = [
    "pickup_latitude",
    "pickup_longitude",
    "dropoff_latitude",
    "dropoff_longitude",
    "tpep_pickup_datetime",
];
