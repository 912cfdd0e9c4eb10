use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}, {}", self.latitude, self.longitude))
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<Coordinate> for (f64, f64) {
    fn from(value: Coordinate) -> Self {
        (value.latitude, value.longitude)
    }
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// Axis aligned lat/lon rectangle.
/// The corners are always stored normalized, `south_west` holds the minimums
/// and `north_east` the maximums.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub south_west: Coordinate,
    pub north_east: Coordinate,
}

impl From<[[f64; 2]; 2]> for BoundingBox {
    fn from([a, b]: [[f64; 2]; 2]) -> Self {
        Self::from_corners(Coordinate::new(a[0], a[1]), Coordinate::new(b[0], b[1]))
    }
}

impl From<BoundingBox> for [[f64; 2]; 2] {
    fn from(value: BoundingBox) -> Self {
        [
            [value.south_west.latitude, value.south_west.longitude],
            [value.north_east.latitude, value.north_east.longitude],
        ]
    }
}

impl BoundingBox {
    /// Builds a box from two opposite corners given in any order.
    pub fn from_corners(a: Coordinate, b: Coordinate) -> Self {
        Self {
            south_west: Coordinate::new(a.latitude.min(b.latitude), a.longitude.min(b.longitude)),
            north_east: Coordinate::new(a.latitude.max(b.latitude), a.longitude.max(b.longitude)),
        }
    }

    /// Smallest box covering every coordinate, None if there are none.
    pub fn enclosing<I>(coordinates: I) -> Option<Self>
    where
        I: IntoIterator<Item = Coordinate>,
    {
        coordinates.into_iter().fold(None, |acc, coordinate| match acc {
            None => Some(Self::from_corners(coordinate, coordinate)),
            Some(bbox) => Some(Self {
                south_west: Coordinate::new(
                    bbox.south_west.latitude.min(coordinate.latitude),
                    bbox.south_west.longitude.min(coordinate.longitude),
                ),
                north_east: Coordinate::new(
                    bbox.north_east.latitude.max(coordinate.latitude),
                    bbox.north_east.longitude.max(coordinate.longitude),
                ),
            }),
        })
    }

    /// Parses `lat,lon,lat,lon`.
    pub fn parse(value: &str) -> Option<Self> {
        let parts: Vec<f64> = value
            .split(',')
            .map(|part| part.trim().parse().ok())
            .collect::<Option<_>>()?;
        if parts.len() != 4 || parts.iter().any(|part| !part.is_finite()) {
            return None;
        }
        Some(Self::from_corners(
            Coordinate::new(parts[0], parts[1]),
            Coordinate::new(parts[2], parts[3]),
        ))
    }

    /// Inclusive on every edge.
    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        coordinate.latitude >= self.south_west.latitude
            && coordinate.latitude <= self.north_east.latitude
            && coordinate.longitude >= self.south_west.longitude
            && coordinate.longitude <= self.north_east.longitude
    }

    pub fn latitude_span(&self) -> f64 {
        self.north_east.latitude - self.south_west.latitude
    }

    pub fn longitude_span(&self) -> f64 {
        self.north_east.longitude - self.south_west.longitude
    }

    /// Grows each axis by `ratio` of its span on both sides.
    /// An axis with zero span grows by `min_padding` instead.
    pub fn padded(&self, ratio: f64, min_padding: f64) -> Self {
        let pad = |span: f64| {
            if span != 0.0 {
                span * ratio
            } else {
                min_padding
            }
        };
        let lat_pad = pad(self.latitude_span());
        let lon_pad = pad(self.longitude_span());
        Self {
            south_west: Coordinate::new(
                self.south_west.latitude - lat_pad,
                self.south_west.longitude - lon_pad,
            ),
            north_east: Coordinate::new(
                self.north_east.latitude + lat_pad,
                self.north_east.longitude + lon_pad,
            ),
        }
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.south_west.latitude + self.north_east.latitude) / 2.0,
            (self.south_west.longitude + self.north_east.longitude) / 2.0,
        )
    }
}

#[test]
fn corners_are_normalized() {
    let a = BoundingBox::from_corners(Coordinate::new(40.8, -73.9), Coordinate::new(40.7, -74.0));
    let b = BoundingBox::from_corners(Coordinate::new(40.7, -74.0), Coordinate::new(40.8, -73.9));
    assert_eq!(a, b);
    assert_eq!(a.south_west, Coordinate::new(40.7, -74.0));
}

#[test]
fn contains_is_inclusive() {
    let bbox = BoundingBox::from_corners(Coordinate::new(40.7, -74.0), Coordinate::new(40.8, -73.9));
    assert!(bbox.contains(&Coordinate::new(40.7, -74.0)));
    assert!(bbox.contains(&Coordinate::new(40.8, -73.9)));
    assert!(!bbox.contains(&Coordinate::new(40.81, -73.95)));
}

#[test]
fn padding_uses_epsilon_on_flat_axis() {
    let bbox = BoundingBox::from_corners(Coordinate::new(40.0, -74.0), Coordinate::new(41.0, -74.0));
    let padded = bbox.padded(0.2, 0.001);
    assert!((padded.south_west.latitude - 39.8).abs() < 1e-9);
    assert!((padded.north_east.latitude - 41.2).abs() < 1e-9);
    assert!((padded.south_west.longitude - -74.001).abs() < 1e-9);
    assert!((padded.north_east.longitude - -73.999).abs() < 1e-9);
}

#[test]
fn parse_bounds() {
    let bbox = BoundingBox::parse("40.8,-73.9, 40.7,-74.0").unwrap();
    assert_eq!(bbox.south_west, Coordinate::new(40.7, -74.0));
    assert!(BoundingBox::parse("40.8,-73.9,40.7").is_none());
    assert!(BoundingBox::parse("a,b,c,d").is_none());
}

#[test]
fn enclosing_empty_is_none() {
    assert!(BoundingBox::enclosing(Vec::new()).is_none());
}
