//! Reference point sets used for proximity rules and nearest-feature lookups.
//!
//! The built-in lists are small, manually curated and illustrative; they are
//! not an authoritative gazetteer. A JSON file with the same shape can
//! replace them at startup:
//!
//! ```json
//! {
//!   "population_centers": [{ "name": "Montréal", "lat": 45.5017, "lng": -73.5673 }],
//!   "indigenous_hubs":    [{ "name": "Mistissini", "lat": 50.43, "lng": -73.87 }],
//!   "water_bodies":       [{ "name": "Lac Mistassini", "lat": 50.7, "lng": -73.9 }]
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::coords::GeoPoint;
use crate::error::Result;

/// The three static point sets. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSets {
    #[serde(default)]
    pub population_centers: Vec<GeoPoint>,
    #[serde(default)]
    pub indigenous_hubs: Vec<GeoPoint>,
    #[serde(default)]
    pub water_bodies: Vec<GeoPoint>,
}

impl ReferenceSets {
    pub fn new(
        population_centers: Vec<GeoPoint>,
        indigenous_hubs: Vec<GeoPoint>,
        water_bodies: Vec<GeoPoint>,
    ) -> Self {
        Self { population_centers, indigenous_hubs, water_bodies }
    }

    /// Sets with no points at all. Every nearest lookup against them is absent.
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new(), Vec::new())
    }

    /// Built-in Québec lists.
    pub fn quebec() -> Self {
        Self::new(quebec_population_centers(), quebec_indigenous_hubs(), quebec_water_bodies())
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let sets: Self = serde_json::from_str(s)?;
        sets.warn_if_empty();
        Ok(sets)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading reference points");
        let sets = Self::from_json_str(&fs::read_to_string(path)?)?;
        debug!(
            population_centers = sets.population_centers.len(),
            indigenous_hubs = sets.indigenous_hubs.len(),
            water_bodies = sets.water_bodies.len(),
            "reference points loaded"
        );
        Ok(sets)
    }

    /// Total number of reference points across the three sets.
    pub fn len(&self) -> usize {
        self.population_centers.len() + self.indigenous_hubs.len() + self.water_bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn warn_if_empty(&self) {
        for (label, set) in [
            ("population_centers", &self.population_centers),
            ("indigenous_hubs", &self.indigenous_hubs),
            ("water_bodies", &self.water_bodies),
        ] {
            if set.is_empty() {
                warn!(set = label, "reference set is empty; nearest lookups will be absent");
            }
        }
    }
}

impl Default for ReferenceSets {
    fn default() -> Self {
        Self::quebec()
    }
}

// ── Built-in lists ────────────────────────────────────────────────────────────

fn quebec_population_centers() -> Vec<GeoPoint> {
    vec![
        GeoPoint::new("Montréal", 45.5017, -73.5673),
        GeoPoint::new("Québec", 46.8139, -71.2080),
        GeoPoint::new("Gatineau", 45.4765, -75.7013),
        GeoPoint::new("Sherbrooke", 45.4042, -71.8929),
        GeoPoint::new("Trois-Rivières", 46.3430, -72.5421),
        GeoPoint::new("Saguenay", 48.4167, -71.0667),
        GeoPoint::new("Rouyn-Noranda", 48.2366, -79.0230),
        GeoPoint::new("Val-d'Or", 48.0975, -77.7974),
        GeoPoint::new("Sept-Îles", 50.2169, -66.3810),
    ]
}

/// Indigenous communities plus northern service hubs.
fn quebec_indigenous_hubs() -> Vec<GeoPoint> {
    vec![
        GeoPoint::new("Mistissini", 50.43, -73.87),
        GeoPoint::new("Chibougamau", 49.913, -74.379),
        GeoPoint::new("Wendake", 46.87, -71.33),
        GeoPoint::new("Manawan", 46.92, -73.78),
        GeoPoint::new("Uashat", 50.25, -66.40),
        GeoPoint::new("Kahnawake", 45.40, -73.69),
        GeoPoint::new("Kanesatake", 45.50, -74.08),
        GeoPoint::new("Waskaganish", 51.47, -78.75),
    ]
}

fn quebec_water_bodies() -> Vec<GeoPoint> {
    vec![
        GeoPoint::new("St. Lawrence River – Montréal", 45.5, -73.55),
        GeoPoint::new("St. Lawrence River – Québec City", 46.82, -71.20),
        GeoPoint::new("Saguenay River", 48.43, -71.15),
        GeoPoint::new("Lac Saint-Jean", 48.55, -72.0),
        GeoPoint::new("Réservoir Manicouagan", 50.65, -68.7),
        GeoPoint::new("Baie James (James Bay)", 52.0, -79.0),
        GeoPoint::new("Lac Mistassini", 50.7, -73.9),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quebec_lists_have_expected_sizes() {
        let r = ReferenceSets::quebec();
        assert_eq!(r.population_centers.len(), 9);
        assert_eq!(r.indigenous_hubs.len(), 8);
        assert_eq!(r.water_bodies.len(), 7);
        assert_eq!(r.len(), 24);
    }

    #[test]
    fn quebec_points_are_valid_coordinates() {
        let r = ReferenceSets::quebec();
        for p in r.population_centers.iter().chain(&r.indigenous_hubs).chain(&r.water_bodies) {
            assert!((-90.0..=90.0).contains(&p.lat), "{} lat out of range", p.name);
            assert!((-180.0..=180.0).contains(&p.lng), "{} lng out of range", p.name);
        }
    }

    #[test]
    fn json_missing_sets_default_to_empty() {
        let r = ReferenceSets::from_json_str(
            r#"{ "indigenous_hubs": [{ "name": "Mistissini", "lat": 50.43, "lng": -73.87 }] }"#,
        )
        .unwrap();
        assert_eq!(r.indigenous_hubs.len(), 1);
        assert!(r.population_centers.is_empty());
        assert!(r.water_bodies.is_empty());
        assert!(!r.is_empty());
    }

    #[test]
    fn json_roundtrip_preserves_quebec_lists() {
        let r = ReferenceSets::quebec();
        let s = serde_json::to_string(&r).unwrap();
        assert_eq!(ReferenceSets::from_json_str(&s).unwrap(), r);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(ReferenceSets::from_json_str("{ not json").is_err());
    }
}
