//! Batch report generator.
//! Classifies a GeoJSON site collection, builds the full context report for
//! every site, and writes one JSON file per impact class:
//! `{output}/{impact_class}.json`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mines_core::site::load_sites;
use mines_core::{
    buffer_radius_m, ClassifierParams, GeoClassifier, ImpactClass, ReferenceSets, SiteId, SiteReport,
};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "report", about = "Write per-impact-class site reports as JSON")]
struct Args {
    /// GeoJSON FeatureCollection of mine sites.
    #[arg(short, long, default_value = "data/mines.geojson")]
    sites: PathBuf,

    /// Reference-points JSON replacing the built-in lists.
    #[arg(short, long)]
    references: Option<PathBuf>,

    /// Classifier thresholds JSON (missing fields keep their defaults).
    #[arg(short, long)]
    params: Option<PathBuf>,

    /// Output directory for per-class report files.
    #[arg(short, long, default_value = "data/reports")]
    output: PathBuf,

    /// Write only this class (e.g. water_tailings).
    #[arg(short = 'c', long)]
    class: Option<ImpactClass>,
}

// ── Output types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct SiteEntry {
    id: SiteId,
    name: String,
    lat: f64,
    lng: f64,
    category: Option<String>,
    cluster_count: usize,
    nearest_town: Option<String>,
    nearest_town_km: Option<f64>,
    nearest_indigenous: Option<String>,
    nearest_indigenous_km: Option<f64>,
    nearest_water: Option<String>,
    nearest_water_km: Option<f64>,
}

#[derive(Serialize)]
struct ClassReport {
    impact_class: ImpactClass,
    label: &'static str,
    n_sites: usize,
    buffer_radius_m: u32,
    mean_cluster_size: f64,
    sites: Vec<SiteEntry>,
}

impl SiteEntry {
    fn from_report(r: &SiteReport, lat: f64, lng: f64) -> Self {
        let name_of = |n: &Option<mines_core::NearestResult>| n.as_ref().map(|n| n.item.name.clone());
        let km_of = |n: &Option<mines_core::NearestResult>| n.as_ref().map(|n| n.distance_km);
        Self {
            id: r.id,
            name: r.name.clone(),
            lat,
            lng,
            category: r.category.clone(),
            cluster_count: r.cluster.count,
            nearest_town: name_of(&r.nearest_town),
            nearest_town_km: km_of(&r.nearest_town),
            nearest_indigenous: name_of(&r.nearest_indigenous),
            nearest_indigenous_km: km_of(&r.nearest_indigenous),
            nearest_water: name_of(&r.nearest_water),
            nearest_water_km: km_of(&r.nearest_water),
        }
    }
}

fn class_report(class: ImpactClass, sites: Vec<SiteEntry>) -> ClassReport {
    let mean_cluster_size = if sites.is_empty() {
        0.0
    } else {
        sites.iter().map(|s| s.cluster_count as f64).sum::<f64>() / sites.len() as f64
    };
    ClassReport {
        impact_class: class,
        label: class.label(),
        n_sites: sites.len(),
        buffer_radius_m: buffer_radius_m(class),
        mean_cluster_size,
        sites,
    }
}

/// Group site entries by class, keeping every class (possibly empty).
fn group_by_class(entries: Vec<(ImpactClass, SiteEntry)>) -> BTreeMap<ImpactClass, Vec<SiteEntry>> {
    let mut by_class: BTreeMap<ImpactClass, Vec<SiteEntry>> =
        ImpactClass::ALL.into_iter().map(|c| (c, Vec::new())).collect();
    for (class, entry) in entries {
        by_class.entry(class).or_default().push(entry);
    }
    by_class
}

fn build_classifier(references: Option<&Path>, params: Option<&Path>) -> Result<GeoClassifier> {
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

fn write_report(out_dir: &Path, report: &ClassReport) -> Result<PathBuf> {
    let out_path = out_dir.join(format!("{}.json", report.impact_class.token()));
    fs::write(&out_path, serde_json::to_string_pretty(report)?)
        .with_context(|| format!("writing {}", out_path.display()))?;
    Ok(out_path)
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("report=info".parse()?)
                .add_directive("mines_core=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let classifier = build_classifier(args.references.as_deref(), args.params.as_deref())?;

    let sites = load_sites(&args.sites)
        .with_context(|| format!("loading sites from {}", args.sites.display()))?;
    info!(sites = sites.len(), path = %args.sites.display(), "building site reports");
    if sites.is_empty() {
        warn!("no point features found; reports will be empty");
    }

    let entries: Vec<(ImpactClass, SiteEntry)> = sites
        .par_iter()
        .map(|site| {
            let r = classifier.site_report(site, &sites);
            (r.impact, SiteEntry::from_report(&r, site.lat, site.lng))
        })
        .collect();

    fs::create_dir_all(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;

    eprintln!("\n{:<18} {:>6} {:>10} {:>12}", "Class", "N", "Buffer(m)", "MeanCluster");
    eprintln!("{}", "-".repeat(49));

    for (class, entries) in group_by_class(entries) {
        if args.class.is_some_and(|only| only != class) {
            continue;
        }
        let report = class_report(class, entries);
        let out_path = write_report(&args.output, &report)?;
        eprintln!(
            "{:<18} {:>6} {:>10} {:>12.2}",
            class.token(),
            report.n_sites,
            report.buffer_radius_m,
            report.mean_cluster_size
        );
        eprintln!("  -> {}", out_path.display());
    }

    eprintln!("\nDone. Reports in {}.", args.output.display());
    Ok(())
}

// ── Unit tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: usize, cluster_count: usize) -> SiteEntry {
        SiteEntry {
            id: SiteId(id),
            name: format!("Mine {id}"),
            lat: 47.0,
            lng: -75.0,
            category: None,
            cluster_count,
            nearest_town: None,
            nearest_town_km: None,
            nearest_indigenous: None,
            nearest_indigenous_km: None,
            nearest_water: None,
            nearest_water_km: None,
        }
    }

    #[test]
    fn group_keeps_all_classes() {
        let grouped = group_by_class(vec![(ImpactClass::Remote, entry(0, 0))]);
        assert_eq!(grouped.len(), 4);
        assert_eq!(grouped[&ImpactClass::Remote].len(), 1);
        assert!(grouped[&ImpactClass::NearPopulation].is_empty());
    }

    #[test]
    fn mean_cluster_size() {
        let r = class_report(ImpactClass::WaterTailings, vec![entry(0, 1), entry(1, 4)]);
        assert_eq!(r.n_sites, 2);
        assert!((r.mean_cluster_size - 2.5).abs() < 1e-12);
        assert_eq!(r.buffer_radius_m, 15_000);
        let empty = class_report(ImpactClass::Remote, Vec::new());
        assert_eq!(empty.mean_cluster_size, 0.0);
    }

    #[test]
    fn class_flag_parses_tokens() {
        let args = Args::try_parse_from(["report", "--class", "near_population"]).unwrap();
        assert_eq!(args.class, Some(ImpactClass::NearPopulation));
        assert!(Args::try_parse_from(["report", "--class", "urban"]).is_err());
    }

    #[test]
    fn params_file_overrides_cluster_radius() {
        let path = std::env::temp_dir().join(format!("mines-report-params-{}.json", std::process::id()));
        fs::write(&path, r#"{ "cluster_radius_km": 5.0 }"#).unwrap();
        let gc = build_classifier(None, Some(&path)).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(gc.params().cluster_radius_km, 5.0);
        assert_eq!(gc.params().indigenous_radius_km, 55.0);

        let args = Args::try_parse_from(["report", "--params", "p.json"]).unwrap();
        assert_eq!(args.params.as_deref(), Some(Path::new("p.json")));
        assert_eq!(build_classifier(None, None).unwrap().params().cluster_radius_km, 40.0);
    }

    #[test]
    fn writes_one_file_per_class() {
        let dir = std::env::temp_dir().join(format!("mines-report-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let report = class_report(ImpactClass::NearIndigenous, vec![entry(3, 2)]);
        let path = write_report(&dir, &report).unwrap();
        assert_eq!(path.file_name().unwrap(), "near_indigenous.json");
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["impact_class"], "near_indigenous");
        assert_eq!(json["n_sites"], 1);
        assert_eq!(json["sites"][0]["name"], "Mine 3");
        fs::remove_dir_all(&dir).unwrap();
    }
}
