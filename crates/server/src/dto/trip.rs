use serde::Serialize;
use tripscope::repository::TripRecord;

/// Flat trip row as consumed by the chart layer.
#[derive(Debug, Clone, Serialize)]
pub struct TripDto {
    pub index: u32,
    pub pickup_latitude: f64,
    pub pickup_longitude: f64,
    pub dropoff_latitude: f64,
    pub dropoff_longitude: f64,
    pub passenger_count: Option<u32>,
    pub total_amount: Option<f64>,
    pub trip_minutes: Option<f64>,
    pub trip_distance_km: Option<f64>,
    pub tpep_pickup_datetime: String,
}

impl From<&TripRecord> for TripDto {
    fn from(trip: &TripRecord) -> Self {
        Self {
            index: trip.id,
            pickup_latitude: trip.pickup.latitude,
            pickup_longitude: trip.pickup.longitude,
            dropoff_latitude: trip.dropoff.latitude,
            dropoff_longitude: trip.dropoff.longitude,
            passenger_count: trip.passenger_count,
            total_amount: trip.total_amount,
            trip_minutes: trip.trip_minutes,
            trip_distance_km: trip.trip_distance_km,
            tpep_pickup_datetime: trip.pickup_time.to_string(),
        }
    }
}

/// Everything shown in a trip's popup.
#[derive(Debug, Clone, Serialize)]
pub struct TripDetailDto {
    #[serde(flatten)]
    pub trip: TripDto,
    pub tpep_dropoff_datetime: Option<String>,
    pub pickup_borough: Option<String>,
    pub dropoff_borough: Option<String>,
    pub payment_type: String,
    pub payment_icon: &'static str,
    pub lines: Vec<String>,
}

impl From<&TripRecord> for TripDetailDto {
    fn from(trip: &TripRecord) -> Self {
        let payment = trip.payment();
        Self {
            trip: trip.into(),
            tpep_dropoff_datetime: trip.dropoff_time.map(|time| time.to_string()),
            pickup_borough: trip.pickup_borough.as_deref().map(String::from),
            dropoff_borough: trip.dropoff_borough.as_deref().map(String::from),
            payment_type: payment.to_string(),
            payment_icon: payment.icon(),
            lines: popup_lines(trip),
        }
    }
}

fn popup_lines(trip: &TripRecord) -> Vec<String> {
    let or_na = |value: Option<String>| value.unwrap_or_else(|| "N/A".into());
    vec![
        format!(
            "Passengers: {}",
            or_na(trip.passenger_count.map(|count| count.to_string()))
        ),
        format!(
            "Total: {}",
            or_na(trip.total_amount.map(|amount| format!("${amount:.2}")))
        ),
        format!(
            "Duration: {}",
            or_na(trip.trip_minutes.map(|minutes| format!("{minutes:.1} min")))
        ),
        format!(
            "Distance: {}",
            or_na(trip.trip_distance_km.map(|km| format!("{km:.2} km")))
        ),
    ]
}
