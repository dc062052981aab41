//! Impact classes and the ordered rules that assign one to a site.
//!
//! Proximity rules run first; attribute keywords only decide between
//! `WaterTailings` and `Remote`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::reference::ReferenceSets;
use crate::site::SiteAttributes;
use crate::sphere::haversine_km;

/// Primary context of concern for a site. Exactly one per site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactClass {
    NearIndigenous,
    NearPopulation,
    WaterTailings,
    Remote,
}

impl ImpactClass {
    /// All classes in precedence order.
    pub const ALL: [ImpactClass; 4] = [
        ImpactClass::NearIndigenous,
        ImpactClass::NearPopulation,
        ImpactClass::WaterTailings,
        ImpactClass::Remote,
    ];

    /// Machine token, as used in filters and serialized output.
    pub fn token(self) -> &'static str {
        match self {
            ImpactClass::NearIndigenous => "near_indigenous",
            ImpactClass::NearPopulation => "near_population",
            ImpactClass::WaterTailings => "water_tailings",
            ImpactClass::Remote => "remote",
        }
    }

    /// Human label: the token with a space instead of the underscore.
    pub fn label(self) -> &'static str {
        match self {
            ImpactClass::NearIndigenous => "near indigenous",
            ImpactClass::NearPopulation => "near population",
            ImpactClass::WaterTailings => "water tailings",
            ImpactClass::Remote => "remote",
        }
    }
}

impl fmt::Display for ImpactClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ImpactClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ImpactClass::ALL
            .into_iter()
            .find(|c| c.token() == s)
            .ok_or_else(|| Error::InvalidParameter {
                name: "impact_class",
                value: s.to_string(),
                reason: "expected near_indigenous, near_population, water_tailings or remote"
                    .to_string(),
            })
    }
}

// ── Parameters ────────────────────────────────────────────────────────────────

/// Distance and latitude thresholds for the proximity rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierParams {
    /// Max distance (km, inclusive) to an Indigenous/northern hub.
    pub indigenous_radius_km: f64,
    /// Latitude (degrees, inclusive) at and above which every site is northern.
    pub northern_latitude: f64,
    /// Max distance (km, inclusive) to a population center.
    pub population_radius_km: f64,
    /// Radius (km, inclusive) for nearby-site clusters.
    pub cluster_radius_km: f64,
}

impl Default for ClassifierParams {
    fn default() -> Self {
        Self {
            indigenous_radius_km: 55.0,
            northern_latitude: 51.5,
            population_radius_km: 30.0,
            cluster_radius_km: 40.0,
        }
    }
}

impl ClassifierParams {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(s)?;
        params.validate()?;
        Ok(params)
    }

    /// Radii must be finite and non-negative; the latitude must be a latitude.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("indigenous_radius_km", self.indigenous_radius_km),
            ("population_radius_km", self.population_radius_km),
            ("cluster_radius_km", self.cluster_radius_km),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidParameter {
                    name,
                    value: value.to_string(),
                    reason: "must be a finite, non-negative distance".to_string(),
                });
            }
        }
        if !(-90.0..=90.0).contains(&self.northern_latitude) {
            return Err(Error::InvalidParameter {
                name: "northern_latitude",
                value: self.northern_latitude.to_string(),
                reason: "must lie in [-90, 90]".to_string(),
            });
        }
        Ok(())
    }
}

// ── Rules ─────────────────────────────────────────────────────────────────────

/// Tailings tokens looked for in the category.
const CATEGORY_TOKENS: [&str; 3] = ["tailings", "résidu", "residu"];

/// Residue tokens looked for in the description.
const DESCRIPTION_TOKENS: [&str; 2] = ["résidu", "residu"];

/// Water-body tokens (French and English) looked for in the name.
///
/// A name near a lake or river lands in the same class as a tailings
/// facility. That conflation is a known modeling simplification and is kept
/// as is.
const NAME_TOKENS: [&str; 5] = ["lac", "lake", "river", "rivière", "riviere"];

/// Classify a site. Rules are tried in order and the first match wins:
///
/// 1. within `indigenous_radius_km` of any hub, or at/above
///    `northern_latitude` → `NearIndigenous`
/// 2. within `population_radius_km` of any population center → `NearPopulation`
/// 3. category mentions tailings/residue, description mentions residue, or
///    name mentions a water body → `WaterTailings`
/// 4. `Remote`
pub fn classify_impact(
    lat: f64,
    lng: f64,
    attributes: &SiteAttributes,
    refs: &ReferenceSets,
    params: &ClassifierParams,
) -> ImpactClass {
    let near_hub = refs
        .indigenous_hubs
        .iter()
        .any(|hub| haversine_km(lat, lng, hub.lat, hub.lng) <= params.indigenous_radius_km);
    if near_hub || lat >= params.northern_latitude {
        return ImpactClass::NearIndigenous;
    }

    let near_town = refs
        .population_centers
        .iter()
        .any(|c| haversine_km(lat, lng, c.lat, c.lng) <= params.population_radius_km);
    if near_town {
        return ImpactClass::NearPopulation;
    }

    if mentions_water_or_tailings(attributes) {
        return ImpactClass::WaterTailings;
    }

    ImpactClass::Remote
}

fn mentions_water_or_tailings(attributes: &SiteAttributes) -> bool {
    field_mentions(&attributes.category, &CATEGORY_TOKENS)
        || field_mentions(&attributes.description, &DESCRIPTION_TOKENS)
        || field_mentions(&attributes.name, &NAME_TOKENS)
}

/// Case-insensitive substring match of any token; an absent field matches nothing.
fn field_mentions(field: &Option<String>, tokens: &[&str]) -> bool {
    field.as_deref().is_some_and(|text| {
        let text = text.to_lowercase();
        tokens.iter().any(|token| text.contains(token))
    })
}
