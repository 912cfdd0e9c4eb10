use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// Length of the window substituted for a malformed one.
pub const DEFAULT_WINDOW_HOURS: i64 = 1;

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

fn parse_clock(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

fn add_hours(start: NaiveDateTime, hours: i64) -> NaiveDateTime {
    TimeDelta::try_hours(hours)
        .and_then(|delta| start.checked_add_signed(delta))
        .unwrap_or(NaiveDateTime::MAX)
}

/// Pickup time window, inclusive on both ends.
/// `end` is always after `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawTimeWindow")]
pub struct TimeWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

#[derive(Deserialize)]
struct RawTimeWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl From<RawTimeWindow> for TimeWindow {
    fn from(value: RawTimeWindow) -> Self {
        Self::new(value.start, value.end)
    }
}

impl TimeWindow {
    /// A window where `end <= start` becomes `[start, start + 1h]`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        if end <= start {
            Self::first_hour(start)
        } else {
            Self { start, end }
        }
    }

    pub fn first_hour(start: NaiveDateTime) -> Self {
        Self {
            start,
            end: add_hours(start, DEFAULT_WINDOW_HOURS),
        }
    }

    /// Builds a window from the raw inputs of the dashboard: a `YYYY-MM-DD`
    /// date and two `HH:MM` clock times. Missing parts default to the hour
    /// starting at `earliest`, unparseable ones make the whole window fall back
    /// to that hour.
    pub fn from_inputs(
        date: Option<&str>,
        start: Option<&str>,
        end: Option<&str>,
        earliest: NaiveDateTime,
    ) -> Self {
        let fallback = Self::first_hour(earliest);
        let parsed = || -> Option<Self> {
            let date = match date {
                Some(date) => NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?,
                None => earliest.date(),
            };
            let start = match start {
                Some(start) => parse_clock(start)?,
                None => parse_clock(&earliest.format("%H:%M").to_string())?,
            };
            let end = match end {
                Some(end) => parse_clock(end)?,
                None => parse_clock(&fallback.end.format("%H:%M").to_string())?,
            };
            Some(Self::new(date.and_time(start), date.and_time(end)))
        };
        parsed().unwrap_or(fallback)
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn contains(&self, time: &NaiveDateTime) -> bool {
        *time >= self.start && *time <= self.end
    }
}

#[cfg(test)]
fn ts(value: &str) -> NaiveDateTime {
    parse_timestamp(value).unwrap()
}

#[test]
fn parse_timestamp_formats() {
    assert_eq!(ts("2015-01-15 19:05:39"), ts("2015-01-15T19:05:39"));
    assert_eq!(ts("2015-01-15 19:05"), ts("2015-01-15 19:05:00"));
    assert!(parse_timestamp("2015-01-15 19:05:39.250").is_some());
    assert!(parse_timestamp("15/01/2015").is_none());
}

#[test]
fn malformed_window_becomes_one_hour() {
    let start = ts("2015-01-15 19:00:00");
    let window = TimeWindow::new(start, ts("2015-01-15 18:00:00"));
    assert_eq!(window.end(), ts("2015-01-15 20:00:00"));

    let window = TimeWindow::new(start, start);
    assert_eq!(window.end(), ts("2015-01-15 20:00:00"));
}

#[test]
fn window_is_inclusive() {
    let window = TimeWindow::new(ts("2015-01-15 19:00:00"), ts("2015-01-15 19:30:00"));
    assert!(window.contains(&ts("2015-01-15 19:00:00")));
    assert!(window.contains(&ts("2015-01-15 19:30:00")));
    assert!(!window.contains(&ts("2015-01-15 19:30:01")));
}

#[test]
fn inputs_default_to_earliest_hour() {
    let earliest = ts("2015-01-15 19:05:39");
    let window = TimeWindow::from_inputs(None, None, None, earliest);
    assert_eq!(window.start(), ts("2015-01-15 19:05:00"));
    assert_eq!(window.end(), ts("2015-01-15 20:05:00"));
}

#[test]
fn inputs_are_combined_with_date() {
    let earliest = ts("2015-01-15 19:05:39");
    let window = TimeWindow::from_inputs(Some("2015-01-16"), Some("08:00"), Some("09:30"), earliest);
    assert_eq!(window.start(), ts("2015-01-16 08:00:00"));
    assert_eq!(window.end(), ts("2015-01-16 09:30:00"));
}

#[test]
fn bad_inputs_fall_back_to_earliest_hour() {
    let earliest = ts("2015-01-15 19:05:39");
    let window = TimeWindow::from_inputs(Some("2015-01-16"), Some("8h"), None, earliest);
    assert_eq!(window, TimeWindow::first_hour(earliest));
}

#[test]
fn inverted_inputs_become_one_hour() {
    let earliest = ts("2015-01-15 19:05:39");
    let window = TimeWindow::from_inputs(None, Some("10:00"), Some("09:00"), earliest);
    assert_eq!(window.start(), ts("2015-01-15 10:00:00"));
    assert_eq!(window.end(), ts("2015-01-15 11:00:00"));
}

#[test]
fn deserialized_inverted_window_becomes_one_hour() {
    use serde::de::value::{Error, MapDeserializer};

    let fields = [("start", "2015-01-15T19:00:00"), ("end", "2015-01-15T18:00:00")];
    let window =
        TimeWindow::deserialize(MapDeserializer::<_, Error>::new(fields.into_iter())).unwrap();
    assert_eq!(window.start(), ts("2015-01-15 19:00:00"));
    assert_eq!(window.end(), ts("2015-01-15 20:00:00"));
}
