//! Aggregates behind the dashboard charts.
//!
//! Everything here is a pure function over a slice of trips, either the whole
//! store or the trips of a [`VisibleSet`](crate::viewport::VisibleSet).

use std::collections::HashMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod boroughs;
mod payments;
pub use boroughs::*;
pub use payments::*;

use crate::repository::TripRecord;

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("Data unavailable: {0}")]
    DataUnavailable(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TripMetric {
    TripMinutes,
    TripDistanceKm,
    TotalAmount,
}

impl TripMetric {
    pub fn value(&self, trip: &TripRecord) -> Option<f64> {
        match self {
            Self::TripMinutes => trip.trip_minutes,
            Self::TripDistanceKm => trip.trip_distance_km,
            Self::TotalAmount => trip.total_amount,
        }
    }

    pub const fn column(&self) -> &'static str {
        match self {
            Self::TripMinutes => "trip_minutes",
            Self::TripDistanceKm => "trip_distance_km",
            Self::TotalAmount => "total_amount",
        }
    }
}

/// Running mean over known values.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    pub(crate) fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub(crate) fn get(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

/// How often each passenger count occurs, most frequent first.
/// Trips with an unknown count are left out.
pub fn passenger_frequencies(trips: &[TripRecord]) -> Vec<(u32, usize)> {
    let mut counts: HashMap<u32, usize> = HashMap::new();
    trips
        .iter()
        .filter_map(|trip| trip.passenger_count)
        .for_each(|count| *counts.entry(count).or_default() += 1);
    let mut counts: Vec<_> = counts.into_iter().collect();
    counts.sort_unstable_by(|(a_count, a_freq), (b_count, b_freq)| {
        b_freq.cmp(a_freq).then(a_count.cmp(b_count))
    });
    counts
}

/// Box plot statistics of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Distribution {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
}

/// Summarizes the known values of `metric`, None if there are none.
pub fn distribution(trips: &[TripRecord], metric: TripMetric) -> Option<Distribution> {
    let mut values: Vec<f64> = trips
        .par_iter()
        .filter_map(|trip| metric.value(trip))
        .collect();
    if values.is_empty() {
        return None;
    }
    values.par_sort_unstable_by(f64::total_cmp);
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    Some(Distribution {
        count: values.len(),
        min: values[0],
        q1: quantile(&values, 0.25),
        median: quantile(&values, 0.5),
        q3: quantile(&values, 0.75),
        max: values[values.len() - 1],
        mean,
    })
}

/// Linear interpolation between the closest ranks of sorted `values`.
fn quantile(values: &[f64], q: f64) -> f64 {
    let position = q * (values.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    values[lower] + (values[upper] - values[lower]) * (position - lower as f64)
}

#[cfg(test)]
fn trip_with(minutes: Option<f64>, passengers: Option<u32>) -> TripRecord {
    TripRecord {
        id: 0,
        pickup_time: Default::default(),
        dropoff_time: None,
        pickup: Default::default(),
        dropoff: Default::default(),
        passenger_count: passengers,
        total_amount: None,
        trip_minutes: minutes,
        trip_distance_km: None,
        pickup_borough: None,
        dropoff_borough: None,
        payment_type: None,
        fare: Default::default(),
    }
}

#[test]
fn quantiles_interpolate() {
    let trips: Vec<_> = [1.0, 2.0, 3.0, 4.0]
        .into_iter()
        .map(|minutes| trip_with(Some(minutes), None))
        .collect();
    let stats = distribution(&trips, TripMetric::TripMinutes).unwrap();
    assert_eq!(stats.count, 4);
    assert_eq!(stats.min, 1.0);
    assert_eq!(stats.q1, 1.75);
    assert_eq!(stats.median, 2.5);
    assert_eq!(stats.q3, 3.25);
    assert_eq!(stats.max, 4.0);
    assert_eq!(stats.mean, 2.5);
}

#[test]
fn distribution_skips_unknown() {
    let trips = vec![trip_with(None, None), trip_with(Some(7.0), None)];
    let stats = distribution(&trips, TripMetric::TripMinutes).unwrap();
    assert_eq!(stats.count, 1);
    assert_eq!(stats.median, 7.0);
    assert!(distribution(&trips[..1], TripMetric::TripMinutes).is_none());
}

#[test]
fn passenger_frequencies_sorted() {
    let trips = vec![
        trip_with(None, Some(2)),
        trip_with(None, Some(1)),
        trip_with(None, Some(1)),
        trip_with(None, None),
        trip_with(None, Some(3)),
    ];
    assert_eq!(passenger_frequencies(&trips), vec![(1, 2), (2, 1), (3, 1)]);
}
