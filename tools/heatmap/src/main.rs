//! Site density heatmap: renders every site of a collection as a
//! transparent RGBA PNG over the collection's bounding box (or the default
//! Québec view when the collection is empty).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mines_core::heatmap::{heat_color, heat_points, DensityGrid, HeatmapParams};
use mines_core::site::load_sites;
use mines_core::{Bounds, Site};

/// Degrees added around the collection's bounding box.
const PAD_DEG: f64 = 0.5;

#[derive(Parser, Debug)]
#[command(name = "heatmap", about = "Render a site density heatmap PNG")]
struct Args {
    #[arg(short, long, default_value = "data/mines.geojson")]
    sites: PathBuf,

    #[arg(short, long, default_value = "data/debug/heatmap.png")]
    output: PathBuf,

    #[arg(long, default_value_t = 1024)]
    width: u32,

    #[arg(long, default_value_t = 768)]
    height: u32,

    /// Kernel/intensity JSON (missing fields keep their defaults).
    #[arg(short, long)]
    params: Option<PathBuf>,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn view_bounds(sites: &[Site]) -> Bounds {
    Bounds::around(sites.iter().map(|s| (s.lat, s.lng)), PAD_DEG).unwrap_or_default()
}

fn render(grid: &DensityGrid) -> image::RgbaImage {
    let mut img = image::RgbaImage::new(grid.width as u32, grid.height as u32);
    for r in 0..grid.height {
        for c in 0..grid.width {
            img.put_pixel(c as u32, r as u32, image::Rgba(heat_color(grid.get(r, c))));
        }
    }
    img
}

fn load_params(path: Option<&Path>) -> Result<HeatmapParams> {
    match path {
        Some(p) => {
            let text = fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?;
            HeatmapParams::from_json_str(&text).with_context(|| format!("parsing {}", p.display()))
        }
        None => Ok(HeatmapParams::default()),
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("heatmap=info".parse()?)
                .add_directive("mines_core=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let params = load_params(args.params.as_deref())?;

    let sites = load_sites(&args.sites)
        .with_context(|| format!("loading sites from {}", args.sites.display()))?;
    let bounds = view_bounds(&sites);
    info!(sites = sites.len(), ?bounds, "rendering density grid");

    let points = heat_points(&sites, &params);
    let grid = DensityGrid::from_points(
        &points,
        bounds,
        args.width as usize,
        args.height as usize,
        &params,
    );

    if let Some(dir) = args.output.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    render(&grid)
        .save(&args.output)
        .with_context(|| format!("saving {}", args.output.display()))?;
    eprintln!("Wrote {}", args.output.display());
    Ok(())
}
