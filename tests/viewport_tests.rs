use chrono::{NaiveDateTime, TimeDelta};
use tripscope::{
    repository::{TripRecord, TripStore},
    shared::{BoundingBox, Coordinate, TimeWindow, parse_timestamp},
    viewport::{AnchorMode, Config, ConfigError, ViewportState, compute_visible, compute_visible_with},
};

fn ts(value: &str) -> NaiveDateTime {
    parse_timestamp(value).unwrap()
}

fn trip(id: u32, pickup_time: &str, pickup: (f64, f64), dropoff: (f64, f64)) -> TripRecord {
    TripRecord {
        id,
        pickup_time: ts(pickup_time),
        dropoff_time: None,
        pickup: pickup.into(),
        dropoff: dropoff.into(),
        passenger_count: Some(1),
        total_amount: Some(10.0),
        trip_minutes: Some(12.0),
        trip_distance_km: Some(3.0),
        pickup_borough: None,
        dropoff_borough: None,
        payment_type: None,
        fare: Default::default(),
    }
}

/// Three trips in the first hour, one an hour later.
fn small_store() -> TripStore {
    TripStore::from_records(vec![
        trip(0, "2015-01-15 19:05:00", (40.75, -73.99), (40.70, -73.95)),
        trip(1, "2015-01-15 19:20:00", (40.80, -73.90), (40.65, -74.01)),
        trip(2, "2015-01-15 19:50:00", (40.72, -73.97), (40.78, -73.96)),
        trip(3, "2015-01-15 21:00:00", (40.60, -73.80), (40.61, -73.81)),
    ])
}

fn window(start: &str, end: &str) -> ViewportState {
    ViewportState::new(TimeWindow::new(ts(start), ts(end)))
}

fn ids(trips: &[TripRecord]) -> Vec<u32> {
    trips.iter().map(|trip| trip.id).collect()
}

#[test]
fn three_trips_without_bounds_test() {
    let store = small_store();
    let viewport = window("2015-01-15 19:00:00", "2015-01-15 20:00:00");
    let visible = compute_visible(&store, &viewport);
    assert_eq!(visible.count, 3);
    assert_eq!(visible.time_filtered, 3);
    assert_eq!(ids(&visible.trips), vec![0, 1, 2]);
    let bbox = visible.bbox.unwrap();
    assert_eq!(bbox.south_west, Coordinate::new(40.72, -73.99));
    assert_eq!(bbox.north_east, Coordinate::new(40.80, -73.90));
    assert!(!visible.isolated);
    assert!(visible.focus.is_none());
}

#[test]
fn empty_time_window_test() {
    let store = small_store();
    let viewport = window("2015-01-16 08:00:00", "2015-01-16 09:00:00")
        .with_selected_trip(Some(0))
        .with_bounding_box(Some(BoundingBox::from([[40.0, -75.0], [41.0, -73.0]])));
    let visible = compute_visible(&store, &viewport);
    assert_eq!(visible.count, 0);
    assert_eq!(visible.time_filtered, 0);
    assert!(visible.bbox.is_none());
    assert!(visible.trips.is_empty());
    assert!(visible.markers.is_empty());
    assert_eq!(
        visible.summary(),
        vec![
            "Trips in time window: 0".to_string(),
            "No trips in the selected time window.".to_string()
        ]
    );
}

#[test]
fn empty_store_test() {
    let store = TripStore::new();
    let viewport = ViewportState::initial(&store);
    let visible = compute_visible(&store, &viewport);
    assert_eq!(visible.count, 0);
    assert!(visible.bbox.is_none());
}

#[test]
fn window_is_inclusive_test() {
    let store = small_store();
    let viewport = window("2015-01-15 19:05:00", "2015-01-15 19:50:00");
    assert_eq!(ids(&compute_visible(&store, &viewport).trips), vec![0, 1, 2]);
}

#[test]
fn malformed_window_becomes_first_hour_test() {
    let store = small_store();
    let inverted = window("2015-01-15 19:00:00", "2015-01-15 18:00:00");
    let explicit = window("2015-01-15 19:00:00", "2015-01-15 20:00:00");
    assert_eq!(
        compute_visible(&store, &inverted),
        compute_visible(&store, &explicit)
    );
}

#[test]
fn widening_window_is_monotonic_test() {
    let store = small_store();
    let start = ts("2015-01-15 19:00:00");
    let mut previous: Vec<u32> = Vec::new();
    for minutes in [10, 25, 55, 90, 130] {
        let end = start + TimeDelta::minutes(minutes);
        let viewport = ViewportState::new(TimeWindow::new(start, end));
        let current = ids(&compute_visible(&store, &viewport).trips);
        assert!(previous.iter().all(|id| current.contains(id)));
        previous = current;
    }
    assert_eq!(previous, vec![0, 1, 2, 3]);
}

#[test]
fn bounds_are_order_independent_test() {
    let store = small_store();
    let base = window("2015-01-15 19:00:00", "2015-01-15 20:00:00");
    let a = base.with_bounding_box(Some(BoundingBox::from([[40.70, -74.0], [40.76, -73.95]])));
    let b = base.with_bounding_box(Some(BoundingBox::from([[40.76, -73.95], [40.70, -74.0]])));
    let c = base.with_bounding_box(Some(BoundingBox::from([[40.70, -73.95], [40.76, -74.0]])));
    let visible_a = compute_visible(&store, &a);
    assert_eq!(ids(&visible_a.trips), vec![0, 2]);
    assert_eq!(visible_a, compute_visible(&store, &b));
    assert_eq!(visible_a, compute_visible(&store, &c));
}

#[test]
fn bounds_are_inclusive_test() {
    let store = small_store();
    let viewport = window("2015-01-15 19:00:00", "2015-01-15 20:00:00")
        .with_bounding_box(Some(BoundingBox::from([[40.75, -73.99], [40.80, -73.90]])));
    assert_eq!(ids(&compute_visible(&store, &viewport).trips), vec![0, 1]);
}

#[test]
fn dropoff_anchor_test() {
    let store = small_store();
    let bounds = Some(BoundingBox::from([[40.60, -74.05], [40.71, -73.90]]));
    let viewport = window("2015-01-15 19:00:00", "2015-01-15 20:00:00").with_bounding_box(bounds);

    let pickups = compute_visible(&store, &viewport);
    assert!(pickups.trips.is_empty());

    let dropoffs = compute_visible(&store, &viewport.with_anchor_mode(AnchorMode::Dropoff));
    assert_eq!(ids(&dropoffs.trips), vec![0, 1]);
    let bbox = dropoffs.bbox.unwrap();
    assert_eq!(bbox.south_west, Coordinate::new(40.65, -74.01));
    assert_eq!(bbox.north_east, Coordinate::new(40.70, -73.95));
    assert_eq!(dropoffs.anchor_mode, AnchorMode::Dropoff);
}

#[test]
fn nothing_in_bounds_test() {
    let store = small_store();
    let viewport = window("2015-01-15 19:00:00", "2015-01-15 20:00:00")
        .with_bounding_box(Some(BoundingBox::from([[10.0, 10.0], [11.0, 11.0]])));
    let visible = compute_visible(&store, &viewport);
    assert_eq!(visible.count, 0);
    assert_eq!(visible.time_filtered, 3);
    assert!(visible.bbox.is_none());
    assert!(visible.markers.is_empty());
    assert_eq!(
        visible.summary(),
        vec![
            "Trips in time window: 3".to_string(),
            "No trips visible in the current area.".to_string()
        ]
    );
}

#[test]
fn isolation_overrides_bounds_test() {
    let store = small_store();
    let base = window("2015-01-15 19:00:00", "2015-01-15 20:00:00").with_selected_trip(Some(1));
    let boxes = [
        None,
        Some(BoundingBox::from([[10.0, 10.0], [11.0, 11.0]])),
        Some(BoundingBox::from([[40.0, -75.0], [41.0, -73.0]])),
    ];
    for bounds in boxes {
        for mode in [AnchorMode::Pickup, AnchorMode::Dropoff] {
            let viewport = base.with_bounding_box(bounds).with_anchor_mode(mode);
            let visible = compute_visible(&store, &viewport);
            assert!(visible.isolated);
            assert_eq!(visible.count, 1);
            assert_eq!(ids(&visible.trips), vec![1]);
            assert_eq!(ids(&visible.markers), vec![1]);
        }
    }
}

#[test]
fn isolation_focus_test() {
    let store = small_store();
    let viewport = window("2015-01-15 19:00:00", "2015-01-15 20:00:00").with_selected_trip(Some(1));
    let visible = compute_visible(&store, &viewport);

    let extent = visible.bbox.unwrap();
    assert_eq!(extent.south_west, Coordinate::new(40.65, -74.01));
    assert_eq!(extent.north_east, Coordinate::new(40.80, -73.90));

    let focus = visible.focus.unwrap();
    let lat_pad = (40.80 - 40.65) * 0.2;
    let lon_pad = (-73.90 - -74.01) * 0.2;
    assert!((focus.bounds.south_west.latitude - (40.65 - lat_pad)).abs() < 1e-9);
    assert!((focus.bounds.north_east.latitude - (40.80 + lat_pad)).abs() < 1e-9);
    assert!((focus.bounds.south_west.longitude - (-74.01 - lon_pad)).abs() < 1e-9);
    assert!((focus.bounds.north_east.longitude - (-73.90 + lon_pad)).abs() < 1e-9);
    assert!((focus.center.latitude - 40.725).abs() < 1e-9);
    assert!((focus.center.longitude - -73.955).abs() < 1e-9);
}

#[test]
fn isolation_of_a_standing_trip_test() {
    let store = TripStore::from_records(vec![trip(
        7,
        "2015-01-15 19:05:00",
        (40.75, -73.99),
        (40.75, -73.99),
    )]);
    let viewport = window("2015-01-15 19:00:00", "2015-01-15 20:00:00").with_selected_trip(Some(7));
    let focus = compute_visible(&store, &viewport).focus.unwrap();
    assert!((focus.bounds.latitude_span() - 0.002).abs() < 1e-9);
    assert!((focus.bounds.longitude_span() - 0.002).abs() < 1e-9);
}

#[test]
fn stale_selection_is_ignored_test() {
    let store = small_store();
    let base = window("2015-01-15 19:00:00", "2015-01-15 20:00:00")
        .with_bounding_box(Some(BoundingBox::from([[40.70, -74.0], [40.76, -73.95]])));
    let without = compute_visible(&store, &base);
    // Trip 3 exists but is outside the window, 99 does not exist at all
    for stale in [3, 99] {
        let with = compute_visible(&store, &base.with_selected_trip(Some(stale)));
        assert_eq!(with, without);
        assert!(!with.isolated);
    }
}

#[test]
fn duplicate_ids_keep_the_first_trip_test() {
    let store = TripStore::from_records(vec![
        trip(5, "2015-01-15 19:05:00", (40.1, -73.99), (40.2, -73.95)),
        trip(5, "2015-01-15 19:10:00", (40.9, -73.90), (40.8, -74.01)),
        trip(6, "2015-01-15 19:15:00", (40.5, -73.90), (40.6, -74.01)),
    ]);
    assert_eq!(store.len(), 2);
    assert_eq!(ids(store.trips()), vec![5, 6]);

    let row = store.row(5).unwrap();
    assert_eq!(row.pickup.latitude, 40.1);
    let viewport =
        window("2015-01-15 19:00:00", "2015-01-15 20:00:00").with_selected_trip(Some(5));
    let visible = compute_visible(&store, &viewport);
    assert!(visible.isolated);
    assert_eq!(&visible.trips[0], row);
}

#[test]
fn marker_cap_test() {
    let start = ts("2015-01-15 19:00:00");
    let records: Vec<TripRecord> = (0..350)
        .rev()
        .map(|i| TripRecord {
            pickup_time: start + TimeDelta::seconds(i as i64),
            ..trip(i, "2015-01-15 19:00:00", (40.7, -73.9), (40.8, -74.0))
        })
        .collect();
    let store = TripStore::from_records(records);
    let viewport = window("2015-01-15 19:00:00", "2015-01-15 20:00:00");
    let visible = compute_visible(&store, &viewport);
    assert_eq!(visible.count, 350);
    assert_eq!(visible.markers.len(), 300);
    // Store order, not time order
    assert_eq!(visible.markers[0].id, 349);
    assert_eq!(&visible.markers[..], &visible.trips[..300]);
}

#[test]
fn marker_cap_small_set_test() {
    let store = small_store();
    let viewport = window("2015-01-15 19:00:00", "2015-01-15 20:00:00");
    let visible = compute_visible(&store, &viewport);
    assert_eq!(visible.markers, visible.trips);
}

#[test]
fn configured_marker_limit_test() {
    let store = small_store();
    let viewport = window("2015-01-15 19:00:00", "2015-01-15 20:00:00");
    let config = Config::new(2, 0.2, 0.001).unwrap();
    let visible = compute_visible_with(&store, &viewport, &config);
    assert_eq!(visible.count, 3);
    assert_eq!(ids(&visible.markers), vec![0, 1]);
}

#[test]
fn invalid_config_test() {
    assert_eq!(Config::new(300, -0.1, 0.001), Err(ConfigError::InvalidPadding(-0.1)));
    assert_eq!(Config::new(300, 0.2, 0.0), Err(ConfigError::InvalidMinPadding(0.0)));
}

#[test]
fn compute_visible_is_idempotent_test() {
    let store = small_store();
    let viewports = [
        window("2015-01-15 19:00:00", "2015-01-15 22:00:00"),
        window("2015-01-15 19:00:00", "2015-01-15 22:00:00")
            .with_anchor_mode(AnchorMode::Dropoff)
            .with_bounding_box(Some(BoundingBox::from([[40.6, -74.1], [40.75, -73.9]]))),
        window("2015-01-15 19:00:00", "2015-01-15 22:00:00").with_selected_trip(Some(2)),
    ];
    for viewport in viewports {
        assert_eq!(compute_visible(&store, &viewport), compute_visible(&store, &viewport));
        assert_eq!(store.visible(&viewport), compute_visible(&store, &viewport));
    }
}

#[test]
fn initial_viewport_test() {
    let store = small_store();
    let viewport = ViewportState::initial(&store);
    assert_eq!(viewport.time_window.start(), ts("2015-01-15 19:05:00"));
    assert_eq!(viewport.time_window.end(), ts("2015-01-15 20:05:00"));
    assert_eq!(viewport.anchor_mode, AnchorMode::Pickup);
    assert!(viewport.bounding_box.is_none());
    assert!(viewport.selected_trip.is_none());
}

#[test]
fn anchor_mode_test() {
    assert_eq!(AnchorMode::parse("dropoffs"), AnchorMode::Dropoff);
    assert_eq!(AnchorMode::parse("pickups"), AnchorMode::Pickup);
    assert_eq!(AnchorMode::parse("sideways"), AnchorMode::Pickup);
    assert_eq!(AnchorMode::Pickup.toggle(), AnchorMode::Dropoff);
    assert_eq!(AnchorMode::Dropoff.toggle(), AnchorMode::Pickup);
}

#[test]
fn summary_test() {
    let store = small_store();
    let viewport = window("2015-01-15 19:00:00", "2015-01-15 20:00:00");
    let visible = compute_visible(&store, &viewport);
    assert_eq!(
        visible.summary(),
        vec![
            "Trips in time window: 3".to_string(),
            "Visible trips: 3".to_string(),
            "Lat range: 40.7200 to 40.8000".to_string(),
            "Lon range: -73.9900 to -73.9000".to_string(),
        ]
    );
}
