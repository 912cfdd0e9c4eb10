use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use serde::Serialize;

use crate::{
    analytics::{Error, Mean, TripMetric},
    repository::TripRecord,
};

/// Mean of a metric for every origin x destination borough pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoroughMatrix {
    pub metric: TripMetric,
    /// Row labels, pickup boroughs in ascending order.
    pub origins: Vec<Arc<str>>,
    /// Column labels, dropoff boroughs in ascending order.
    pub destinations: Vec<Arc<str>>,
    /// `means[origin][destination]`, 0 where no trip has a known value.
    pub means: Vec<Vec<f64>>,
    /// `trips[origin][destination]`
    pub trips: Vec<Vec<usize>>,
}

impl BoroughMatrix {
    pub fn mean(&self, origin: &str, destination: &str) -> Option<f64> {
        let row = self.origins.iter().position(|label| &**label == origin)?;
        let column = self
            .destinations
            .iter()
            .position(|label| &**label == destination)?;
        Some(self.means[row][column])
    }
}

pub fn borough_matrix(trips: &[TripRecord], metric: TripMetric) -> Result<BoroughMatrix, Error> {
    let mut cells: BTreeMap<(Arc<str>, Arc<str>), (Mean, usize)> = BTreeMap::new();
    trips
        .iter()
        .filter_map(|trip| {
            let origin = trip.pickup_borough.clone()?;
            let destination = trip.dropoff_borough.clone()?;
            Some((origin, destination, metric.value(trip)))
        })
        .for_each(|(origin, destination, value)| {
            let (mean, count) = cells.entry((origin, destination)).or_default();
            *count += 1;
            if let Some(value) = value {
                mean.push(value);
            }
        });
    if cells.is_empty() {
        return Err(Error::DataUnavailable("pickup_borough/dropoff_borough"));
    }

    let origins: Vec<Arc<str>> = cells
        .keys()
        .map(|(origin, _)| origin.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let destinations: Vec<Arc<str>> = cells
        .keys()
        .map(|(_, destination)| destination.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut means = vec![vec![0.0; destinations.len()]; origins.len()];
    let mut counts = vec![vec![0; destinations.len()]; origins.len()];
    for ((origin, destination), (mean, count)) in cells.iter() {
        // Both labels come from the keys, so the lookups always succeed
        let (Ok(row), Ok(column)) = (
            origins.binary_search(origin),
            destinations.binary_search(destination),
        ) else {
            continue;
        };
        means[row][column] = mean.get().unwrap_or(0.0);
        counts[row][column] = *count;
    }

    Ok(BoroughMatrix {
        metric,
        origins,
        destinations,
        means,
        trips: counts,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoroughAverages {
    pub trips: usize,
    pub avg_minutes: Option<f64>,
    pub avg_distance_km: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoroughProfile {
    pub borough: Arc<str>,
    /// Trips starting in the borough.
    pub pickup: Option<BoroughAverages>,
    /// Trips ending in the borough.
    pub dropoff: Option<BoroughAverages>,
}

/// Average time and distance per borough, split by pickup and dropoff side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoroughPyramid {
    pub profiles: Vec<BoroughProfile>,
    /// Symmetric axis limit: the largest average plus 10%.
    pub axis_limit: f64,
}

#[derive(Default)]
struct SideAccumulator {
    trips: usize,
    minutes: Mean,
    distance: Mean,
}

impl SideAccumulator {
    fn push(&mut self, trip: &TripRecord) {
        self.trips += 1;
        if let Some(minutes) = trip.trip_minutes {
            self.minutes.push(minutes);
        }
        if let Some(distance) = trip.trip_distance_km {
            self.distance.push(distance);
        }
    }

    fn finish(&self) -> BoroughAverages {
        BoroughAverages {
            trips: self.trips,
            avg_minutes: self.minutes.get(),
            avg_distance_km: self.distance.get(),
        }
    }
}

pub fn borough_profile(trips: &[TripRecord]) -> Result<BoroughPyramid, Error> {
    let mut pickups: BTreeMap<Arc<str>, SideAccumulator> = BTreeMap::new();
    let mut dropoffs: BTreeMap<Arc<str>, SideAccumulator> = BTreeMap::new();
    trips.iter().for_each(|trip| {
        if let Some(borough) = &trip.pickup_borough {
            pickups.entry(borough.clone()).or_default().push(trip);
        }
        if let Some(borough) = &trip.dropoff_borough {
            dropoffs.entry(borough.clone()).or_default().push(trip);
        }
    });
    if pickups.is_empty() && dropoffs.is_empty() {
        return Err(Error::DataUnavailable("pickup_borough/dropoff_borough"));
    }

    let boroughs: BTreeSet<&Arc<str>> = pickups.keys().chain(dropoffs.keys()).collect();
    let profiles: Vec<BoroughProfile> = boroughs
        .into_iter()
        .map(|borough| BoroughProfile {
            borough: borough.clone(),
            pickup: pickups.get(borough).map(SideAccumulator::finish),
            dropoff: dropoffs.get(borough).map(SideAccumulator::finish),
        })
        .collect();

    let largest = profiles
        .iter()
        .flat_map(|profile| [profile.pickup, profile.dropoff])
        .flatten()
        .flat_map(|side| [side.avg_minutes, side.avg_distance_km])
        .flatten()
        .fold(0.0, f64::max);

    Ok(BoroughPyramid {
        profiles,
        axis_limit: largest * 1.1,
    })
}
