//! Candidate sites and their GeoJSON source.
//!
//! Only `Point` features become sites. Anything else in the collection is
//! skipped with a warning, the same way a point-marker layer ignores it.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Display name used when a feature has none.
pub const DEFAULT_SITE_NAME: &str = "Mine / site";

/// Identity of a site within its loaded collection (its index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(pub usize);

/// Free-text attributes attached to a site.
///
/// `category`, `name` and `description` feed classification; the rest are
/// carried through for reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteAttributes {
    pub category: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub commodity: Option<String>,
    pub last_year: Option<String>,
}

impl SiteAttributes {
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Site name, or [`DEFAULT_SITE_NAME`] when absent or blank.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(n) if !n.trim().is_empty() => n,
            _ => DEFAULT_SITE_NAME,
        }
    }

    fn from_properties(props: &Map<String, Value>) -> Self {
        Self {
            category: prop_string(props, "category"),
            name: prop_string(props, "name"),
            description: prop_string(props, "description"),
            status: prop_string(props, "status"),
            commodity: prop_string(props, "commodity"),
            last_year: prop_string(props, "last_year"),
        }
    }
}

/// A candidate site: coordinates plus attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: SiteId,
    pub lat: f64,
    pub lng: f64,
    pub attributes: SiteAttributes,
}

impl Site {
    pub fn new(id: usize, lat: f64, lng: f64, attributes: SiteAttributes) -> Self {
        Self { id: SiteId(id), lat, lng, attributes }
    }

    pub fn name(&self) -> &str {
        self.attributes.display_name()
    }
}

// ── GeoJSON ───────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct FeatureCollection {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

/// Parse a GeoJSON `FeatureCollection` into sites with sequential ids.
pub fn parse_feature_collection(s: &str) -> Result<Vec<Site>> {
    let fc: FeatureCollection = serde_json::from_str(s)?;
    if fc.kind != "FeatureCollection" {
        return Err(Error::InvalidGeoJson(format!(
            "expected a FeatureCollection, got {:?}",
            fc.kind
        )));
    }

    let mut sites = Vec::with_capacity(fc.features.len());
    for (index, feature) in fc.features.into_iter().enumerate() {
        let Some((lat, lng)) = point_lat_lng(feature.geometry.as_ref()) else {
            warn!(feature = index, "skipping feature without a usable Point geometry");
            continue;
        };
        let attributes = feature
            .properties
            .as_ref()
            .map(SiteAttributes::from_properties)
            .unwrap_or_default();
        sites.push(Site::new(sites.len(), lat, lng, attributes));
    }
    Ok(sites)
}

/// Read and parse a GeoJSON file of sites.
pub fn load_sites(path: impl AsRef<Path>) -> Result<Vec<Site>> {
    let path = path.as_ref();
    let sites = parse_feature_collection(&fs::read_to_string(path)?)?;
    debug!(path = %path.display(), sites = sites.len(), "sites loaded");
    Ok(sites)
}

/// GeoJSON positions are `[lng, lat]`.
fn point_lat_lng(geometry: Option<&Geometry>) -> Option<(f64, f64)> {
    let g = geometry?;
    if g.kind != "Point" {
        return None;
    }
    let coords = g.coordinates.as_array()?;
    let lng = coords.first()?.as_f64()?;
    let lat = coords.get(1)?.as_f64()?;
    (lat.is_finite() && lng.is_finite()).then_some((lat, lng))
}

/// Strings pass through; numbers and booleans are stringified; null and
/// empty strings are absent.
fn prop_string(props: &Map<String, Value>, key: &str) -> Option<String> {
    match props.get(key)? {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
