/// Geographic point and bounding-box types.
/// All coordinate math uses f64 degrees.

use serde::{Deserialize, Serialize};

/// A named reference point (town, community hub, water body).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub name: String,
    /// Latitude in degrees, -90 to +90.
    pub lat: f64,
    /// Longitude in degrees, -180 to +180.
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self { name: name.into(), lat, lng }
    }
}

/// An axis-aligned lat/lng box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub min_lng: f64,
    pub max_lat: f64,
    pub max_lng: f64,
}

impl Bounds {
    pub fn new(min_lat: f64, min_lng: f64, max_lat: f64, max_lng: f64) -> Self {
        Self { min_lat, min_lng, max_lat, max_lng }
    }

    /// Smallest box holding every `(lat, lng)` pair, grown by `pad_deg` on
    /// each side and clamped to valid coordinates. `None` for no points.
    pub fn around<I>(points: I, pad_deg: f64) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut iter = points.into_iter();
        let (lat0, lng0) = iter.next()?;
        let mut b = Self::new(lat0, lng0, lat0, lng0);
        for (lat, lng) in iter {
            b.min_lat = b.min_lat.min(lat);
            b.max_lat = b.max_lat.max(lat);
            b.min_lng = b.min_lng.min(lng);
            b.max_lng = b.max_lng.max(lng);
        }
        Some(Self {
            min_lat: (b.min_lat - pad_deg).max(-90.0),
            min_lng: (b.min_lng - pad_deg).max(-180.0),
            max_lat: (b.max_lat + pad_deg).min(90.0),
            max_lng: (b.max_lng + pad_deg).min(180.0),
        })
    }

    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lng >= self.min_lng && lng <= self.max_lng
    }

    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn lng_span(&self) -> f64 {
        self.max_lng - self.min_lng
    }
}

impl Default for Bounds {
    /// Province-wide view of Québec.
    fn default() -> Self {
        Self::new(44.9, -79.8, 62.6, -57.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn around_pads_and_contains_inputs() {
        let pts = [(45.5, -73.6), (50.4, -73.9), (48.2, -79.0)];
        let b = Bounds::around(pts, 0.5).unwrap();
        assert!((b.min_lat - 45.0).abs() < 1e-12);
        assert!((b.max_lat - 50.9).abs() < 1e-12);
        assert!((b.min_lng - -79.5).abs() < 1e-12);
        assert!((b.max_lng - -73.1).abs() < 1e-12);
        for (lat, lng) in pts {
            assert!(b.contains(lat, lng), "({lat}, {lng}) should be inside {b:?}");
        }
    }

    #[test]
    fn around_empty_is_none() {
        assert!(Bounds::around(std::iter::empty(), 1.0).is_none());
    }

    #[test]
    fn around_clamps_to_globe() {
        let b = Bounds::around([(89.5, 179.5)], 2.0).unwrap();
        assert_eq!(b.max_lat, 90.0);
        assert_eq!(b.max_lng, 180.0);
    }

    #[test]
    fn default_covers_montreal_and_nunavik() {
        let b = Bounds::default();
        assert!(b.contains(45.5017, -73.5673));
        assert!(b.contains(58.1, -68.4));
        assert!(!b.contains(40.7, -74.0), "New York should be outside");
    }
}
