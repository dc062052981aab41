//! Per-site context reports, the impact filter, and summary counts.
//!
//! Reports are plain data; turning them into text or markup is up to the
//! consumer. The helpers here only cover the small phrases every consumer
//! shares.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::classify::ImpactClass;
use crate::cluster::ClusterResult;
use crate::error::Result;
use crate::nearest::NearestResult;
use crate::site::SiteId;

/// Everything an info panel shows for a selected site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteReport {
    pub id: SiteId,
    pub name: String,
    pub impact: ImpactClass,
    pub category: Option<String>,
    pub status: Option<String>,
    pub commodity: Option<String>,
    pub last_year: Option<String>,
    pub buffer_radius_m: u32,
    pub cluster_radius_km: f64,
    pub cluster: ClusterResult,
    pub nearest_town: Option<NearestResult>,
    pub nearest_indigenous: Option<NearestResult>,
    pub nearest_water: Option<NearestResult>,
}

impl SiteReport {
    /// "3 other site(s) within 40 km." or "No other sites within 40 km."
    pub fn cluster_text(&self) -> String {
        if self.cluster.count > 0 {
            format!(
                "{} other site(s) within {} km.",
                self.cluster.count,
                fmt_km(self.cluster_radius_km)
            )
        } else {
            format!("No other sites within {} km.", fmt_km(self.cluster_radius_km))
        }
    }

    /// The three nearest-feature lines, in display order.
    pub fn nearest_lines(&self) -> [String; 3] {
        [
            nearest_line("Town / city", self.nearest_town.as_ref()),
            nearest_line("Indigenous / northern community", self.nearest_indigenous.as_ref()),
            nearest_line("Major water body (manual)", self.nearest_water.as_ref()),
        ]
    }
}

/// "Label: Name (12.3 km)", or "Label: n/a" when nothing was found.
pub fn nearest_line(label: &str, nearest: Option<&NearestResult>) -> String {
    match nearest {
        Some(n) => format!("{label}: {} ({:.1} km)", n.item.name, n.distance_km),
        None => format!("{label}: n/a"),
    }
}

/// Whole kilometres print without a decimal point.
fn fmt_km(km: f64) -> String {
    if km.fract() == 0.0 {
        format!("{km:.0}")
    } else {
        format!("{km}")
    }
}

// ── Filter ────────────────────────────────────────────────────────────────────

/// Which sites a map layer shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImpactFilter {
    #[default]
    All,
    Class(ImpactClass),
}

impl ImpactFilter {
    pub fn matches(self, class: ImpactClass) -> bool {
        match self {
            ImpactFilter::All => true,
            ImpactFilter::Class(want) => want == class,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ImpactFilter::All => "All sites",
            ImpactFilter::Class(c) => c.token(),
        }
    }
}

impl FromStr for ImpactFilter {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        if s == "all" {
            Ok(ImpactFilter::All)
        } else {
            s.parse().map(ImpactFilter::Class)
        }
    }
}

impl fmt::Display for ImpactFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// "12 site(s) shown for filter: All sites"
pub fn stats_line(visible: usize, filter: ImpactFilter) -> String {
    format!("{visible} site(s) shown for filter: {}", filter.label())
}

// ── Summary ───────────────────────────────────────────────────────────────────

/// Site counts per impact class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpactSummary {
    pub total: usize,
    pub by_class: BTreeMap<ImpactClass, usize>,
}

impl ImpactSummary {
    pub fn from_classes<I>(classes: I) -> Self
    where
        I: IntoIterator<Item = ImpactClass>,
    {
        let mut summary = Self::default();
        for class in classes {
            summary.total += 1;
            *summary.by_class.entry(class).or_default() += 1;
        }
        summary
    }

    pub fn count(&self, class: ImpactClass) -> usize {
        self.by_class.get(&class).copied().unwrap_or(0)
    }

    /// Number of sites a filter leaves visible.
    pub fn visible(&self, filter: ImpactFilter) -> usize {
        match filter {
            ImpactFilter::All => self.total,
            ImpactFilter::Class(c) => self.count(c),
        }
    }
}
