//! Nearby-site clusters: which other sites lie within a radius of a site.
//!
//! Clusters are recomputed per query. Which markers are currently
//! highlighted is the caller's business.

use serde::{Deserialize, Serialize};

use crate::site::{Site, SiteId};
use crate::sphere::haversine_km;

/// Radius used by the map's cluster highlight.
pub const DEFAULT_CLUSTER_RADIUS_KM: f64 = 40.0;

/// Other sites within the radius, in candidate order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterResult {
    pub count: usize,
    pub members: Vec<SiteId>,
}

impl ClusterResult {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn contains(&self, id: SiteId) -> bool {
        self.members.contains(&id)
    }
}

/// Sites of `candidates` within `radius_km` (inclusive) of `center`,
/// excluding `center` itself by identity. A distinct site sharing the exact
/// same coordinates still counts.
pub fn cluster_within(center: &Site, candidates: &[Site], radius_km: f64) -> ClusterResult {
    cluster_around(center.lat, center.lng, candidates, radius_km, Some(center.id))
}

/// Sites of `candidates` within `radius_km` (inclusive) of `(lat, lng)`,
/// skipping the one whose id is `exclude`.
pub fn cluster_around(
    lat: f64,
    lng: f64,
    candidates: &[Site],
    radius_km: f64,
    exclude: Option<SiteId>,
) -> ClusterResult {
    let members: Vec<SiteId> = candidates
        .iter()
        .filter(|s| Some(s.id) != exclude)
        .filter(|s| haversine_km(lat, lng, s.lat, s.lng) <= radius_km)
        .map(|s| s.id)
        .collect();
    ClusterResult { count: members.len(), members }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::SiteAttributes;

    fn site(id: usize, lat: f64, lng: f64) -> Site {
        Site::new(id, lat, lng, SiteAttributes::default())
    }

    #[test]
    fn excludes_self_but_counts_duplicates() {
        let sites = vec![
            site(0, 48.0, -77.0),
            site(1, 48.0, -77.0), // same coordinates, different site
            site(2, 48.1, -77.0), // ~11 km north
            site(3, 49.0, -77.0), // ~111 km north
        ];
        let r = cluster_within(&sites[0], &sites, DEFAULT_CLUSTER_RADIUS_KM);
        assert_eq!(r.count, 2);
        assert_eq!(r.members, vec![SiteId(1), SiteId(2)]);
        assert!(!r.contains(SiteId(0)));
    }

    #[test]
    fn boundary_is_inclusive() {
        let center = site(0, 47.0, -75.0);
        let edge = site(1, 47.3, -75.0);
        let d = haversine_km(center.lat, center.lng, edge.lat, edge.lng);
        let sites = vec![center.clone(), edge];
        let r = cluster_within(&center, &sites, d);
        assert_eq!(r.count, 1, "a site exactly at the radius must be included");
        let r = cluster_within(&center, &sites, d - 1e-6);
        assert_eq!(r.count, 0);
    }

    #[test]
    fn site_forty_km_away_is_included_at_default_radius() {
        // 40 km due north: 40 / 6371 rad of latitude.
        let dlat = (DEFAULT_CLUSTER_RADIUS_KM / crate::sphere::EARTH_RADIUS_KM).to_degrees();
        let center = site(0, 47.0, -75.0);
        let sites = vec![center.clone(), site(1, 47.0 + dlat * 0.999_999, -75.0)];
        let r = cluster_within(&center, &sites, DEFAULT_CLUSTER_RADIUS_KM);
        assert_eq!(r.count, 1);
    }

    #[test]
    fn empty_candidates_give_zero() {
        let center = site(0, 47.0, -75.0);
        let r = cluster_within(&center, &[], DEFAULT_CLUSTER_RADIUS_KM);
        assert!(r.is_empty());
        assert!(r.members.is_empty());
    }

    #[test]
    fn repeated_queries_are_independent() {
        let sites = vec![site(0, 48.0, -77.0), site(1, 48.1, -77.0), site(2, 50.0, -70.0)];
        let a = cluster_within(&sites[0], &sites, DEFAULT_CLUSTER_RADIUS_KM);
        let b = cluster_within(&sites[2], &sites, DEFAULT_CLUSTER_RADIUS_KM);
        let a2 = cluster_within(&sites[0], &sites, DEFAULT_CLUSTER_RADIUS_KM);
        assert_eq!(a, a2);
        assert!(b.is_empty());
    }

    #[test]
    fn cluster_around_without_exclusion_counts_everything_in_range() {
        let sites = vec![site(0, 48.0, -77.0), site(1, 48.1, -77.0)];
        let r = cluster_around(48.0, -77.0, &sites, DEFAULT_CLUSTER_RADIUS_KM, None);
        assert_eq!(r.count, 2);
    }
}
