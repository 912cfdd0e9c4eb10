use std::{fs, io::Write, path::PathBuf};

use tripscope::{
    repository::{COLUMNS, Column, FALLBACK_CENTER, PaymentType, TripStore},
    shared::{Coordinate, parse_timestamp},
    source::{self, TripSource},
};
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

fn fixture(name: &str) -> PathBuf {
    format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR")).into()
}

#[test]
fn load_csv_test() {
    let store = TripStore::load(fixture("trips.csv"));
    assert_eq!(store.len(), 4);
    assert!(!store.is_empty());

    let ids: Vec<u32> = store.trips().iter().map(|trip| trip.id).collect();
    assert_eq!(ids, vec![0, 1, 3, 4]);

    let first = store.row(0).unwrap();
    assert_eq!(first.pickup, Coordinate::new(40.750111, -73.993896));
    assert_eq!(first.dropoff, Coordinate::new(40.750618, -73.974785));
    assert_eq!(first.passenger_count, Some(1));
    assert_eq!(first.total_amount, Some(17.05));
    assert_eq!(first.fare.tip_amount, Some(3.25));
    assert_eq!(first.pickup_borough.as_deref(), Some("Manhattan"));
    assert_eq!(
        first.dropoff_time,
        parse_timestamp("2015-01-15 19:23:42")
    );
    assert_eq!(first.payment(), PaymentType::CreditCard);

    // "2.0" as written by pandas
    assert_eq!(store.row(1).unwrap().passenger_count, Some(2));
}

#[test]
fn skipped_rows_keep_their_id_test() {
    let store = TripStore::load(fixture("trips.csv"));
    // Unparseable longitude
    assert!(store.row(2).is_none());
    // Unparseable pickup time
    assert!(store.row(5).is_none());
    assert!(store.row(4).is_some());
}

#[test]
fn unknown_values_stay_unknown_test() {
    let store = TripStore::load(fixture("trips.csv"));
    let trip = store.row(3).unwrap();
    assert_eq!(trip.passenger_count, None);
    assert_eq!(trip.trip_minutes, None);
    assert_eq!(trip.trip_distance_km, None);
    assert_eq!(trip.dropoff_time, None);
    assert_eq!(trip.dropoff_borough, None);
    // Stored raw, normalized on read
    assert_eq!(trip.payment_type.as_deref(), Some("Bitcoin"));
    assert_eq!(trip.payment(), PaymentType::Other);
}

#[test]
fn column_test() {
    let store = TripStore::load(fixture("trips.csv"));
    match store.column("pickup_latitude") {
        Some(Column::Floats(values)) => assert_eq!(values, vec![40.750111, 40.8, 40.65, 40.76]),
        other => panic!("unexpected column {other:?}"),
    }
    match store.column("trip_minutes") {
        Some(Column::OptionalFloats(values)) => {
            assert_eq!(values, vec![Some(18.05), Some(20.0), None, Some(20.0)])
        }
        other => panic!("unexpected column {other:?}"),
    }
    match store.column("id") {
        Some(Column::Ids(values)) => assert_eq!(values, vec![0, 1, 3, 4]),
        other => panic!("unexpected column {other:?}"),
    }
    assert!(store.column("mta_tax").is_none());
}

#[test]
fn missing_file_gives_empty_store_test() {
    let store = TripStore::load(fixture("does_not_exist.csv"));
    assert!(store.is_empty());
    assert_eq!(store.len(), 0);
    assert!(store.row(0).is_none());
    assert!(store.earliest_pickup().is_none());
    assert_eq!(store.center(), FALLBACK_CENTER);
    for name in COLUMNS {
        let column = store.column(name).unwrap();
        assert!(column.is_empty(), "{name} should be empty");
    }
}

#[test]
fn missing_required_column_test() {
    let source = TripSource::new(Default::default()).from_csv(fixture("no_coordinates.csv"));
    match TripStore::new().load_source(source) {
        Err(source::Error::MissingColumn(column)) => assert_eq!(column, "pickup_latitude"),
        other => panic!("expected a missing column, got {other:?}"),
    }
    assert!(TripStore::load(fixture("no_coordinates.csv")).is_empty());
}

#[test]
fn load_zip_test() {
    let path = std::env::temp_dir().join(format!("tripscope_{}.zip", std::process::id()));
    let file = fs::File::create(&path).unwrap();
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    writer
        .start_file(source::Config::default().trips_file_name, options)
        .unwrap();
    writer
        .write_all(&fs::read(fixture("trips.csv")).unwrap())
        .unwrap();
    writer.finish().unwrap();

    let store = TripStore::load(&path);
    fs::remove_file(&path).unwrap();
    assert_eq!(store.len(), 4);
    assert_eq!(store.row(4).unwrap().pickup_borough.as_deref(), Some("Manhattan"));
}

#[test]
fn pickup_span_and_center_test() {
    let store = TripStore::load(fixture("trips.csv"));
    let (earliest, latest) = store.pickup_span().unwrap();
    assert_eq!(Some(earliest), parse_timestamp("2015-01-15 19:05:39"));
    assert_eq!(Some(latest), parse_timestamp("2015-01-15 21:10:00"));

    // Even count, mean of the two middle values
    let center = store.center();
    assert!((center.latitude - (40.750111 + 40.76) / 2.0).abs() < 1e-9);
    assert!((center.longitude - (-73.98 + -73.9) / 2.0).abs() < 1e-9);
}
