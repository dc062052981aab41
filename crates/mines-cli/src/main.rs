/// Command-line front end for the mines atlas: classify a site collection,
/// inspect one site, print filter statistics, or look up nearest features.
/// Data goes to stdout; logs go to stderr.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mines_core::report::stats_line;
use mines_core::site::load_sites;
use mines_core::{
    buffer_radius_m, ClassifierParams, GeoClassifier, ImpactClass, ImpactFilter, ReferenceSets,
    Site, SiteAttributes, SiteId, SiteReport,
};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "mines", about = "Impact classes and proximity context for abandoned mine sites")]
struct Cli {
    /// Reference-points JSON replacing the built-in Québec lists.
    #[arg(short, long, global = true)]
    references: Option<PathBuf>,

    /// Classifier thresholds JSON (missing fields keep their defaults).
    #[arg(short, long, global = true)]
    params: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify every site of a GeoJSON collection.
    Classify {
        #[arg(short, long, default_value = "data/mines.geojson")]
        sites: PathBuf,

        /// Emit one JSON object per line instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Full context for one site: class, buffer, cluster, nearest features.
    Inspect {
        #[arg(short, long, default_value = "data/mines.geojson")]
        sites: PathBuf,

        /// Site id (position among the collection's point features).
        #[arg(long)]
        id: usize,

        #[arg(long)]
        json: bool,
    },

    /// Count sites per class and for an impact filter.
    Stats {
        #[arg(short, long, default_value = "data/mines.geojson")]
        sites: PathBuf,

        /// `all` or one of near_indigenous, near_population, water_tailings, remote.
        #[arg(short, long, default_value = "all")]
        filter: String,
    },

    /// Classify a single coordinate and list its nearest reference features.
    Point {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },
}

// ── Output rows ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ClassifiedRow<'a> {
    id: SiteId,
    name: &'a str,
    lat: f64,
    lng: f64,
    impact: ImpactClass,
    buffer_radius_m: u32,
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("mines=info".parse()?))
        .init();

    let cli = Cli::parse();
    let classifier = build_classifier(cli.references.as_ref(), cli.params.as_ref())?;

    match cli.command {
        Command::Classify { sites, json } => {
            let sites = read_sites(&sites)?;
            let classes = classifier.classify_all(&sites);
            for (site, &impact) in sites.iter().zip(&classes) {
                if json {
                    println!("{}", serde_json::to_string(&classified_row(site, impact))?);
                } else {
                    println!(
                        "{:>5}  {:<16} {:>9.4} {:>10.4}  {}",
                        site.id.0,
                        impact.token(),
                        site.lat,
                        site.lng,
                        site.name()
                    );
                }
            }
        }
        Command::Inspect { sites, id, json } => {
            let sites = read_sites(&sites)?;
            let site = sites
                .get(id)
                .with_context(|| format!("no site with id {id} ({} sites loaded)", sites.len()))?;
            let report = classifier.site_report(site, &sites);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render_report(&report));
            }
        }
        Command::Stats { sites, filter } => {
            let filter: ImpactFilter = filter.parse()?;
            let sites = read_sites(&sites)?;
            let summary = classifier.summarize(&sites);
            for class in ImpactClass::ALL {
                println!("{:<16} {:>6}", class.token(), summary.count(class));
            }
            println!("{:<16} {:>6}", "total", summary.total);
            println!("{}", stats_line(summary.visible(filter), filter));
        }
        Command::Point { lat, lng, name, category, description } => {
            let attrs = SiteAttributes { name, category, description, ..SiteAttributes::default() };
            let site = Site::new(0, lat, lng, attrs);
            let report = classifier.site_report(&site, std::slice::from_ref(&site));
            println!("Impact class: {}", report.impact);
            println!("Buffer radius: {} m", report.buffer_radius_m);
            for line in report.nearest_lines() {
                println!("  {line}");
            }
        }
    }

    Ok(())
}

fn build_classifier(
    references: Option<&PathBuf>,
    params: Option<&PathBuf>,
) -> Result<GeoClassifier> {
    let refs = match references {
        Some(path) => ReferenceSets::load(path)
            .with_context(|| format!("loading reference points from {}", path.display()))?,
        None => ReferenceSets::quebec(),
    };
    let params = match params {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            ClassifierParams::from_json_str(&text)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => ClassifierParams::default(),
    };
    Ok(GeoClassifier::with_params(refs, params)?)
}

fn read_sites(path: &Path) -> Result<Vec<Site>> {
    let sites = load_sites(path).with_context(|| format!("loading sites from {}", path.display()))?;
    info!(path = %path.display(), sites = sites.len(), "sites loaded");
    Ok(sites)
}

fn classified_row(site: &Site, impact: ImpactClass) -> ClassifiedRow<'_> {
    ClassifiedRow {
        id: site.id,
        name: site.name(),
        lat: site.lat,
        lng: site.lng,
        impact,
        buffer_radius_m: buffer_radius_m(impact),
    }
}

/// Plain-text info panel.
fn render_report(r: &SiteReport) -> String {
    let na = |v: &Option<String>| v.clone().unwrap_or_else(|| "n/a".to_string());
    let mut out = String::new();
    out.push_str(&format!("{}\n", r.name));
    out.push_str(&format!("Impact class:   {}\n", r.impact));
    out.push_str(&format!("Category:       {}\n", na(&r.category)));
    out.push_str(&format!("Status:         {}\n", na(&r.status)));
    out.push_str(&format!("Commodity:      {}\n", na(&r.commodity)));
    out.push_str(&format!("Last operation: {}\n", na(&r.last_year)));
    out.push_str(&format!("Buffer radius:  {} m\n", r.buffer_radius_m));
    out.push_str(&format!("Cluster:        {}\n", r.cluster_text()));
    out.push_str("Nearest features:\n");
    for line in r.nearest_lines() {
        out.push_str(&format!("  {line}\n"));
    }
    out
}
