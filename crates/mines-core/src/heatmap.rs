//! Site density heatmap on an equirectangular grid.
//!
//! Each site contributes one weighted point. Points are splatted with a
//! truncated Gaussian, the grid is normalised to [0, 1], and `heat_color`
//! maps the result onto the usual blue → red heat gradient.

use serde::{Deserialize, Serialize};

use crate::coords::Bounds;
use crate::error::{Error, Result};
use crate::site::Site;

/// A weighted point for the density layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatPoint {
    pub lat: f64,
    pub lng: f64,
    pub intensity: f32,
}

/// Kernel and weight settings. Pixel sizes refer to the output grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapParams {
    pub radius_px: f64,
    pub blur_px: f64,
    /// Weight given to every site.
    pub intensity: f32,
}

impl Default for HeatmapParams {
    fn default() -> Self {
        Self { radius_px: 25.0, blur_px: 15.0, intensity: 0.9 }
    }
}

/// Upper bound for `radius_px` and `blur_px`.
pub const MAX_KERNEL_PX: f64 = 1024.0;

impl HeatmapParams {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(s)?;
        params.validate()?;
        Ok(params)
    }

    /// Kernel sizes must be finite, non-negative and at most [`MAX_KERNEL_PX`];
    /// the intensity must be finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("radius_px", self.radius_px), ("blur_px", self.blur_px)] {
            if !value.is_finite() || !(0.0..=MAX_KERNEL_PX).contains(&value) {
                return Err(Error::InvalidParameter {
                    name,
                    value: value.to_string(),
                    reason: format!("must be a finite size in [0, {MAX_KERNEL_PX}] px"),
                });
            }
        }
        if !self.intensity.is_finite() || self.intensity < 0.0 {
            return Err(Error::InvalidParameter {
                name: "intensity",
                value: self.intensity.to_string(),
                reason: "must be finite and non-negative".to_string(),
            });
        }
        Ok(())
    }

    /// Kernel support in pixels; nothing is drawn beyond it.
    pub fn extent_px(&self) -> f64 {
        (self.radius_px + self.blur_px).max(1.0)
    }

    fn sigma_px(&self) -> f64 {
        self.extent_px() / 3.0
    }
}

/// One heat point per site, all with the configured intensity.
pub fn heat_points(sites: &[Site], params: &HeatmapParams) -> Vec<HeatPoint> {
    sites
        .iter()
        .map(|s| HeatPoint { lat: s.lat, lng: s.lng, intensity: params.intensity })
        .collect()
}

/// Normalised density values, row-major, row 0 at `bounds.max_lat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DensityGrid {
    pub data: Vec<f32>,
    pub width: usize,
    pub height: usize,
    pub bounds: Bounds,
}

impl DensityGrid {
    pub fn from_points(
        points: &[HeatPoint],
        bounds: Bounds,
        width: usize,
        height: usize,
        params: &HeatmapParams,
    ) -> Self {
        let mut data = vec![0.0f32; width * height];
        let lat_span = bounds.lat_span();
        let lng_span = bounds.lng_span();
        if width == 0 || height == 0 || lat_span <= 0.0 || lng_span <= 0.0 {
            return Self { data, width, height, bounds };
        }

        let extent = params.extent_px();
        let two_sigma_sq = 2.0 * params.sigma_px().powi(2);
        let reach = extent.ceil() as i64;

        for p in points {
            let fx = (p.lng - bounds.min_lng) / lng_span * (width - 1).max(1) as f64;
            let fy = (bounds.max_lat - p.lat) / lat_span * (height - 1).max(1) as f64;
            let cx = fx.round() as i64;
            let cy = fy.round() as i64;
            for dy in -reach..=reach {
                let y = cy + dy;
                if y < 0 || y >= height as i64 {
                    continue;
                }
                for dx in -reach..=reach {
                    let x = cx + dx;
                    if x < 0 || x >= width as i64 {
                        continue;
                    }
                    let d_sq = (x as f64 - fx).powi(2) + (y as f64 - fy).powi(2);
                    if d_sq > extent * extent {
                        continue;
                    }
                    let w = (-d_sq / two_sigma_sq).exp() as f32;
                    data[y as usize * width + x as usize] += p.intensity * w;
                }
            }
        }

        let max = data.iter().cloned().fold(0.0f32, f32::max);
        if max > 0.0 {
            for v in &mut data {
                *v /= max;
            }
        }
        Self { data, width, height, bounds }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.width + col]
    }

    pub fn max_value(&self) -> f32 {
        self.data.iter().cloned().fold(0.0f32, f32::max)
    }
}

// ── Colour ramp ───────────────────────────────────────────────────────────────

/// Gradient stops: blue, cyan, lime, yellow, red.
const GRADIENT: [(f32, [u8; 3]); 5] = [
    (0.4, [0, 0, 255]),
    (0.6, [0, 255, 255]),
    (0.7, [0, 255, 0]),
    (0.8, [255, 255, 0]),
    (1.0, [255, 0, 0]),
];

/// Floor opacity for any cell that received some heat.
const MIN_OPACITY: f32 = 0.05;

/// Density in [0, 1] → RGBA. Zero density is fully transparent.
pub fn heat_color(t: f32) -> [u8; 4] {
    let t = t.clamp(0.0, 1.0);
    if t == 0.0 {
        return [0, 0, 0, 0];
    }
    let alpha = (t.max(MIN_OPACITY) * 255.0).round() as u8;

    let (first_stop, first_rgb) = GRADIENT[0];
    if t <= first_stop {
        return [first_rgb[0], first_rgb[1], first_rgb[2], alpha];
    }
    for pair in GRADIENT.windows(2) {
        let (t0, c0) = pair[0];
        let (t1, c1) = pair[1];
        if t <= t1 {
            let f = (t - t0) / (t1 - t0);
            let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * f).round() as u8;
            return [lerp(c0[0], c1[0]), lerp(c0[1], c1[1]), lerp(c0[2], c1[2]), alpha];
        }
    }
    let [r, g, b] = GRADIENT[GRADIENT.len() - 1].1;
    [r, g, b, alpha]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::SiteAttributes;

    fn pt(lat: f64, lng: f64) -> HeatPoint {
        HeatPoint { lat, lng, intensity: 0.9 }
    }

    #[test]
    fn heat_points_use_configured_intensity() {
        let sites = vec![
            Site::new(0, 46.0, -72.0, SiteAttributes::default()),
            Site::new(1, 47.0, -73.0, SiteAttributes::default()),
        ];
        let pts = heat_points(&sites, &HeatmapParams::default());
        assert_eq!(pts.len(), 2);
        assert!(pts.iter().all(|p| (p.intensity - 0.9).abs() < 1e-6));
    }

    #[test]
    fn grid_is_normalised_and_peaks_at_the_point() {
        let bounds = Bounds::new(45.0, -75.0, 47.0, -71.0);
        let params = HeatmapParams { radius_px: 3.0, blur_px: 2.0, intensity: 0.9 };
        let grid = DensityGrid::from_points(&[pt(46.0, -73.0)], bounds, 41, 21, &params);
        assert!((grid.max_value() - 1.0).abs() < 1e-6);
        // (46, -73) sits at the grid centre.
        assert!((grid.get(10, 20) - 1.0).abs() < 1e-6, "centre = {}", grid.get(10, 20));
        assert!(grid.get(0, 0) == 0.0, "corner lies beyond the kernel");
    }

    #[test]
    fn denser_area_is_hotter() {
        let bounds = Bounds::new(45.0, -75.0, 47.0, -71.0);
        let params = HeatmapParams { radius_px: 2.0, blur_px: 1.0, intensity: 0.9 };
        let pts = [pt(46.0, -74.5), pt(46.0, -74.5), pt(46.0, -74.5), pt(46.0, -71.5)];
        let grid = DensityGrid::from_points(&pts, bounds, 41, 21, &params);
        let west = grid.get(10, 5);
        let east = grid.get(10, 35);
        assert!(west > east, "west={west} east={east}");
    }

    #[test]
    fn empty_input_gives_zero_grid() {
        let grid =
            DensityGrid::from_points(&[], Bounds::default(), 16, 8, &HeatmapParams::default());
        assert_eq!(grid.data.len(), 128);
        assert!(grid.data.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn degenerate_bounds_do_not_panic() {
        let b = Bounds::new(46.0, -73.0, 46.0, -73.0);
        let grid = DensityGrid::from_points(&[pt(46.0, -73.0)], b, 4, 4, &HeatmapParams::default());
        assert!(grid.data.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn color_ramp_endpoints() {
        assert_eq!(heat_color(0.0), [0, 0, 0, 0]);
        assert_eq!(heat_color(1.0), [255, 0, 0, 255]);
        assert_eq!(heat_color(0.2)[..3], [0, 0, 255]);
        assert_eq!(heat_color(0.7)[..3], [0, 255, 0]);
        assert_eq!(heat_color(0.01)[3], (MIN_OPACITY * 255.0).round() as u8);
    }

    #[test]
    fn params_reject_oversized_or_non_finite_kernels() {
        for bad in [
            HeatmapParams { radius_px: 1e18, ..HeatmapParams::default() },
            HeatmapParams { blur_px: f64::INFINITY, ..HeatmapParams::default() },
            HeatmapParams { radius_px: -1.0, ..HeatmapParams::default() },
            HeatmapParams { intensity: f32::NAN, ..HeatmapParams::default() },
        ] {
            let err = bad.validate().unwrap_err();
            assert!(matches!(err, Error::InvalidParameter { .. }), "got {err} for {bad:?}");
        }
        assert!(HeatmapParams::default().validate().is_ok());
        assert!(HeatmapParams::from_json_str(r#"{ "radius_px": 1e18 }"#).is_err());
        let p = HeatmapParams::from_json_str(r#"{ "blur_px": 5.0 }"#).unwrap();
        assert_eq!(p.radius_px, 25.0);
    }
}
