use std::{fmt::Display, sync::Arc};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{
    shared::{geo::Coordinate, time::parse_timestamp},
    source::SourceTrip,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FareBreakdown {
    pub fare_amount: Option<f64>,
    pub extra: Option<f64>,
    pub tip_amount: Option<f64>,
    pub tolls_amount: Option<f64>,
    pub improvement_surcharge: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    /// Position of the row among the data rows of the source file.
    pub id: u32,
    pub pickup_time: NaiveDateTime,
    pub dropoff_time: Option<NaiveDateTime>,
    pub pickup: Coordinate,
    pub dropoff: Coordinate,
    pub passenger_count: Option<u32>,
    pub total_amount: Option<f64>,
    pub trip_minutes: Option<f64>,
    pub trip_distance_km: Option<f64>,
    pub pickup_borough: Option<Arc<str>>,
    pub dropoff_borough: Option<Arc<str>>,
    /// Raw label as found in the file, see [`PaymentType::from_label`].
    pub payment_type: Option<Arc<str>>,
    pub fare: FareBreakdown,
}

impl TripRecord {
    /// Converts a raw row, None if the pickup time does not parse.
    pub fn from_source(id: u32, value: SourceTrip) -> Option<Self> {
        let pickup_time = parse_timestamp(&value.tpep_pickup_datetime)?;
        Some(Self {
            id,
            pickup_time,
            dropoff_time: value
                .tpep_dropoff_datetime
                .as_deref()
                .and_then(parse_timestamp),
            pickup: Coordinate::new(value.pickup_latitude, value.pickup_longitude),
            dropoff: Coordinate::new(value.dropoff_latitude, value.dropoff_longitude),
            passenger_count: value
                .passenger_count
                .filter(|count| count.is_finite() && *count >= 0.0)
                .map(|count| count.round() as u32),
            total_amount: finite(value.total_amount),
            trip_minutes: finite(value.trip_minutes),
            trip_distance_km: finite(value.trip_distance_km),
            pickup_borough: label(value.pickup_borough),
            dropoff_borough: label(value.dropoff_borough),
            payment_type: label(value.payment_type),
            fare: FareBreakdown {
                fare_amount: finite(value.fare_amount),
                extra: finite(value.extra),
                tip_amount: finite(value.tip_amount),
                tolls_amount: finite(value.tolls_amount),
                improvement_surcharge: finite(value.improvement_surcharge),
            },
        })
    }

    pub fn payment(&self) -> PaymentType {
        self.payment_type
            .as_deref()
            .map(PaymentType::from_label)
            .unwrap_or_default()
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|value| value.is_finite())
}

fn label(value: Option<String>) -> Option<Arc<str>> {
    value
        .filter(|value| !value.is_empty() && value != "nan")
        .map(|value| value.into())
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PaymentType {
    CreditCard,
    Cash,
    NoCharge,
    Dispute,
    #[default]
    Other,
}

impl Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl PaymentType {
    pub const ALL: [PaymentType; 5] = [
        PaymentType::CreditCard,
        PaymentType::Cash,
        PaymentType::NoCharge,
        PaymentType::Dispute,
        PaymentType::Other,
    ];

    /// Anything that is not one of the known labels is `Other`.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Credit card" => Self::CreditCard,
            "Cash" => Self::Cash,
            "No charge" => Self::NoCharge,
            "Dispute" => Self::Dispute,
            _ => Self::Other,
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::CreditCard => "Credit card",
            Self::Cash => "Cash",
            Self::NoCharge => "No charge",
            Self::Dispute => "Dispute",
            Self::Other => "Other",
        }
    }

    pub const fn icon(&self) -> &'static str {
        match self {
            Self::CreditCard => "/assets/credit_card.png",
            Self::Cash => "/assets/cash.png",
            Self::NoCharge => "/assets/no_charge.png",
            Self::Dispute => "/assets/dispute.png",
            Self::Other => "/assets/unknown.png",
        }
    }
}

/// A single column of the store, typed by what it holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Column {
    Ids(Vec<u32>),
    Timestamps(Vec<NaiveDateTime>),
    OptionalTimestamps(Vec<Option<NaiveDateTime>>),
    Floats(Vec<f64>),
    OptionalFloats(Vec<Option<f64>>),
    Counts(Vec<Option<u32>>),
    Labels(Vec<Option<Arc<str>>>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Ids(values) => values.len(),
            Column::Timestamps(values) => values.len(),
            Column::OptionalTimestamps(values) => values.len(),
            Column::Floats(values) => values.len(),
            Column::OptionalFloats(values) => values.len(),
            Column::Counts(values) => values.len(),
            Column::Labels(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Every column name the store answers to.
pub const COLUMNS: [&str; 19] = [
    "id",
    "tpep_pickup_datetime",
    "tpep_dropoff_datetime",
    "pickup_latitude",
    "pickup_longitude",
    "dropoff_latitude",
    "dropoff_longitude",
    "passenger_count",
    "total_amount",
    "trip_minutes",
    "trip_distance_km",
    "pickup_borough",
    "dropoff_borough",
    "payment_type",
    "fare_amount",
    "extra",
    "tip_amount",
    "tolls_amount",
    "improvement_surcharge",
];
