use std::{
    collections::HashMap,
    ffi::OsStr,
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};

mod models;
pub use models::*;
use chrono::NaiveDateTime;
use rayon::prelude::*;
use tracing::{debug, error, info, warn};

use crate::{
    shared::geo::Coordinate,
    source::{self, TripSource},
};

/// Map center used when there is no data to take a median from.
pub const FALLBACK_CENTER: Coordinate = Coordinate::new(40.7128, -74.0060);

/// Immutable table of trips.
/// Built once at start up and shared read only afterwards, nothing in the
/// crate hands out mutable access to the rows.
#[derive(Debug, Clone, Default)]
pub struct TripStore {
    trips: Box<[TripRecord]>,
    id_lookup: HashMap<u32, u32>,
}

impl TripStore {
    pub fn new() -> Self {
        Default::default()
    }

    /// Loads the trip table at `path`, a `.zip` archive or a delimited text file.
    /// Never fails: when the data is unavailable the store is empty.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path: PathBuf = path.as_ref().into();
        let source = TripSource::new(Default::default());
        let source = if path.extension().and_then(OsStr::to_str) == Some("zip") {
            source.from_zip(path.clone())
        } else {
            source.from_csv(path.clone())
        };
        match Self::new().load_source(source) {
            Ok(store) => store,
            Err(err) => {
                error!("Trip data unavailable at {}: {err}", path.display());
                Self::new()
            }
        }
    }

    pub fn load_source(mut self, source: TripSource) -> Result<Self, source::Error> {
        debug!("Loading trips...");
        let now = Instant::now();
        let mut trips: Vec<TripRecord> = Vec::new();
        let mut unparsed = 0;
        source.stream_trips(|(i, trip)| match TripRecord::from_source(i as u32, trip) {
            Some(value) => trips.push(value),
            None => unparsed += 1,
        })?;
        if unparsed > 0 {
            debug!("Dropped {unparsed} trips without a readable pickup time");
        }
        self.index(trips);
        debug!("Loading trips took {:?}", now.elapsed());
        info!("Loaded {} trips", self.trips.len());
        Ok(self)
    }

    /// Builds a store from typed rows, keeping their order.
    /// A row whose id is already taken is dropped, the first one wins.
    pub fn from_records(records: Vec<TripRecord>) -> Self {
        let mut store = Self::new();
        store.index(records);
        store
    }

    fn index(&mut self, trips: Vec<TripRecord>) {
        let mut id_lookup: HashMap<u32, u32> = HashMap::with_capacity(trips.len());
        let mut unique: Vec<TripRecord> = Vec::with_capacity(trips.len());
        let mut duplicates = 0;
        for trip in trips {
            if id_lookup.contains_key(&trip.id) {
                duplicates += 1;
                continue;
            }
            id_lookup.insert(trip.id, unique.len() as u32);
            unique.push(trip);
        }
        if duplicates > 0 {
            warn!("Dropped {duplicates} trips with an id that was already taken");
        }
        self.id_lookup = id_lookup;
        self.trips = unique.into();
    }

    pub fn trips(&self) -> &[TripRecord] {
        &self.trips
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    /// Gets the trip with the given id.
    /// If no trip has the id None is returned.
    pub fn row(&self, id: u32) -> Option<&TripRecord> {
        let index = self.id_lookup.get(&id)?;
        Some(&self.trips[*index as usize])
    }

    /// Returns a copy of the named column, None for an unknown name.
    /// Column names follow the source file, see [`COLUMNS`].
    pub fn column(&self, name: &str) -> Option<Column> {
        let trips = &self.trips;
        let floats = |f: fn(&TripRecord) -> f64| Column::Floats(trips.iter().map(f).collect());
        let optional =
            |f: fn(&TripRecord) -> Option<f64>| Column::OptionalFloats(trips.iter().map(f).collect());
        let labels = |f: fn(&TripRecord) -> Option<&Arc<str>>| {
            Column::Labels(trips.iter().map(|trip| f(trip).cloned()).collect())
        };
        let column = match name {
            "id" => Column::Ids(trips.iter().map(|trip| trip.id).collect()),
            "tpep_pickup_datetime" => {
                Column::Timestamps(trips.iter().map(|trip| trip.pickup_time).collect())
            }
            "tpep_dropoff_datetime" => {
                Column::OptionalTimestamps(trips.iter().map(|trip| trip.dropoff_time).collect())
            }
            "pickup_latitude" => floats(|trip| trip.pickup.latitude),
            "pickup_longitude" => floats(|trip| trip.pickup.longitude),
            "dropoff_latitude" => floats(|trip| trip.dropoff.latitude),
            "dropoff_longitude" => floats(|trip| trip.dropoff.longitude),
            "passenger_count" => {
                Column::Counts(trips.iter().map(|trip| trip.passenger_count).collect())
            }
            "total_amount" => optional(|trip| trip.total_amount),
            "trip_minutes" => optional(|trip| trip.trip_minutes),
            "trip_distance_km" => optional(|trip| trip.trip_distance_km),
            "pickup_borough" => labels(|trip| trip.pickup_borough.as_ref()),
            "dropoff_borough" => labels(|trip| trip.dropoff_borough.as_ref()),
            "payment_type" => labels(|trip| trip.payment_type.as_ref()),
            "fare_amount" => optional(|trip| trip.fare.fare_amount),
            "extra" => optional(|trip| trip.fare.extra),
            "tip_amount" => optional(|trip| trip.fare.tip_amount),
            "tolls_amount" => optional(|trip| trip.fare.tolls_amount),
            "improvement_surcharge" => optional(|trip| trip.fare.improvement_surcharge),
            _ => return None,
        };
        Some(column)
    }

    pub fn earliest_pickup(&self) -> Option<NaiveDateTime> {
        self.trips.par_iter().map(|trip| trip.pickup_time).min()
    }

    /// First and last pickup time of the data set.
    pub fn pickup_span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let earliest = self.earliest_pickup()?;
        let latest = self.trips.par_iter().map(|trip| trip.pickup_time).max()?;
        Some((earliest, latest))
    }

    /// Median pickup coordinate, used to center the map.
    pub fn center(&self) -> Coordinate {
        let latitudes: Vec<f64> = self.trips.iter().map(|trip| trip.pickup.latitude).collect();
        let longitudes: Vec<f64> = self.trips.iter().map(|trip| trip.pickup.longitude).collect();
        match (median(latitudes), median(longitudes)) {
            (Some(latitude), Some(longitude)) => Coordinate::new(latitude, longitude),
            _ => FALLBACK_CENTER,
        }
    }
}

fn median(mut values: Vec<f64>) -> Option<f64> {
    values.retain(|value| value.is_finite());
    if values.is_empty() {
        return None;
    }
    values.par_sort_unstable_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
