//! Impact classification and proximity context for abandoned mine and
//! tailings sites in Québec.
//!
//! Everything in this crate is a pure function over its arguments and a set
//! of immutable reference points. Rendering layers own all mutable state
//! (selected site, active filter, highlighted cluster) and feed the core
//! plain coordinates and attributes.

pub mod classifier;
pub mod classify;
pub mod cluster;
pub mod coords;
pub mod error;
pub mod heatmap;
pub mod nearest;
pub mod policy;
pub mod reference;
pub mod report;
pub mod site;
pub mod sphere;

pub use classifier::GeoClassifier;
pub use classify::{classify_impact, ClassifierParams, ImpactClass};
pub use cluster::{cluster_around, cluster_within, ClusterResult, DEFAULT_CLUSTER_RADIUS_KM};
pub use coords::{Bounds, GeoPoint};
pub use error::{Error, Result};
pub use nearest::{nearest, NearestResult};
pub use policy::{buffer_radius_m, style_for, BufferStyle, MarkerStyle, BUFFER_STYLE};
pub use reference::ReferenceSets;
pub use report::{ImpactFilter, ImpactSummary, SiteReport};
pub use site::{Site, SiteAttributes, SiteId};
pub use sphere::haversine_km;
