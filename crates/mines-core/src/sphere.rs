//! Great-circle distance on a spherical Earth.
//! All operations use f64 degrees in, kilometres out.

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine great-circle distance in kilometres.
///
/// Symmetric in its two points and exactly 0 for identical coordinates.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    // Rounding can push `a` a hair above 1 for near-antipodal points.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn same_point_is_zero() {
        for (lat, lng) in [(0.0, 0.0), (45.5017, -73.5673), (89.9, 179.9), (-90.0, -180.0)] {
            let d = haversine_km(lat, lng, lat, lng);
            assert_eq!(d, 0.0, "self-distance at ({lat}, {lng}) should be 0, got {d}");
        }
    }

    #[test]
    fn symmetric_for_random_pairs() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            let lat1 = rng.gen_range(-90.0..=90.0);
            let lng1 = rng.gen_range(-180.0..=180.0);
            let lat2 = rng.gen_range(-90.0..=90.0);
            let lng2 = rng.gen_range(-180.0..=180.0);
            let ab = haversine_km(lat1, lng1, lat2, lng2);
            let ba = haversine_km(lat2, lng2, lat1, lng1);
            assert!(ab >= 0.0, "distance must be non-negative, got {ab}");
            assert_relative_eq!(ab, ba, epsilon = 1e-9);
        }
    }

    #[test]
    fn montreal_to_quebec_city() {
        // Roughly 233 km by great circle.
        let d = haversine_km(45.5017, -73.5673, 46.8139, -71.2080);
        assert!((d - 233.0).abs() < 3.0, "Montréal to Québec should be ~233 km, got {d:.1}");
    }

    #[test]
    fn one_degree_of_latitude() {
        let d = haversine_km(45.0, -73.0, 46.0, -73.0);
        assert_relative_eq!(d, EARTH_RADIUS_KM * 1.0_f64.to_radians(), epsilon = 1e-9);
    }

    #[test]
    fn pole_to_pole_is_half_circumference() {
        let d = haversine_km(90.0, 0.0, -90.0, 0.0);
        assert_relative_eq!(d, EARTH_RADIUS_KM * std::f64::consts::PI, epsilon = 1e-6);
    }
}
