//! Class-driven display policy: buffer radii and marker styles.
//!
//! These are fixed tables. Every value comes from an exhaustive match on
//! [`ImpactClass`], never from site data.

use serde::Serialize;

use crate::classify::ImpactClass;

/// Radius in metres of the hypothetical area-of-influence circle drawn
/// around a selected site. Not a validated risk model.
pub fn buffer_radius_m(class: ImpactClass) -> u32 {
    match class {
        ImpactClass::NearIndigenous => 60_000,
        ImpactClass::NearPopulation => 30_000,
        ImpactClass::WaterTailings => 15_000,
        ImpactClass::Remote => 10_000,
    }
}

/// Circle-marker style tokens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarkerStyle {
    pub color: &'static str,
    pub fill_color: &'static str,
    pub radius: u32,
    pub weight: u32,
    pub opacity: f32,
    pub fill_opacity: f32,
}

impl MarkerStyle {
    const fn base(color: &'static str) -> Self {
        Self { color, fill_color: color, radius: 5, weight: 1, opacity: 1.0, fill_opacity: 0.65 }
    }

    /// Emphasis applied to members of the selected site's cluster.
    pub fn highlighted(self) -> Self {
        Self { radius: self.radius + 2, weight: 2, ..self }
    }
}

pub fn style_for(class: ImpactClass) -> MarkerStyle {
    match class {
        ImpactClass::NearIndigenous => MarkerStyle::base("#ff6b6b"),
        ImpactClass::NearPopulation => MarkerStyle::base("#4dabf7"),
        ImpactClass::WaterTailings => MarkerStyle::base("#ffd166"),
        ImpactClass::Remote => MarkerStyle::base("#ced4da"),
    }
}

/// Style of the buffer circle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BufferStyle {
    pub color: &'static str,
    pub weight: u32,
    pub fill_color: &'static str,
    pub fill_opacity: f32,
}

pub const BUFFER_STYLE: BufferStyle =
    BufferStyle { color: "#ff3333", weight: 2, fill_color: "#ff6666", fill_opacity: 0.18 };
