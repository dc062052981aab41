//! Nearest reference point by great-circle distance.

use serde::{Deserialize, Serialize};

use crate::coords::GeoPoint;
use crate::sphere::haversine_km;

/// The closest reference point and its distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearestResult {
    pub item: GeoPoint,
    pub distance_km: f64,
}

/// Closest point of `points` to `(lat, lng)` by linear scan.
///
/// Ties keep the earliest point (strict `<`). An empty set yields `None`,
/// which callers render as "n/a".
pub fn nearest(lat: f64, lng: f64, points: &[GeoPoint]) -> Option<NearestResult> {
    let (first, rest) = points.split_first()?;
    let mut best = first;
    let mut best_d = haversine_km(lat, lng, first.lat, first.lng);
    for p in rest {
        let d = haversine_km(lat, lng, p.lat, p.lng);
        if d < best_d {
            best_d = d;
            best = p;
        }
    }
    Some(NearestResult { item: best.clone(), distance_km: best_d })
}
