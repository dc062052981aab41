//! Browser bindings for the mines atlas.
//!
//! `MineAtlas` is the map layer's state holder: the loaded sites, their
//! classes, the active filter and the current selection all live here, on
//! the caller side of the classifier. JavaScript draws what these methods
//! return and never recomputes classes itself.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use mines_core::heatmap::{heat_points, HeatPoint, HeatmapParams};
use mines_core::report::stats_line;
use mines_core::site::parse_feature_collection;
use mines_core::{
    buffer_radius_m, style_for, BufferStyle, ClusterResult, GeoClassifier,
    ImpactClass, ImpactFilter, MarkerStyle, ReferenceSets, Site, SiteId, SiteReport, BUFFER_STYLE,
};

// ── Views handed to JavaScript ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct MarkerView {
    pub id: SiteId,
    pub lat: f64,
    pub lng: f64,
    pub impact: ImpactClass,
    pub style: MarkerStyle,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkerUpdate {
    pub id: SiteId,
    pub style: MarkerStyle,
}

#[derive(Debug, Clone, Serialize)]
pub struct BufferView {
    pub lat: f64,
    pub lng: f64,
    pub radius_m: u32,
    pub style: BufferStyle,
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectionView {
    pub report: SiteReport,
    pub cluster_text: String,
    pub nearest_lines: [String; 3],
    pub buffer: BufferView,
    /// Cluster members to draw emphasised.
    pub highlight: Vec<MarkerUpdate>,
    /// Previously emphasised markers to put back to their base style.
    pub restore: Vec<MarkerUpdate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FilterView {
    pub visible: Vec<SiteId>,
    pub stats: String,
    pub restore: Vec<MarkerUpdate>,
}

// ── State holder ──────────────────────────────────────────────────────────────

#[wasm_bindgen]
pub struct MineAtlas {
    classifier: GeoClassifier,
    sites: Vec<Site>,
    classes: Vec<ImpactClass>,
    filter: ImpactFilter,
    selected: Option<SiteId>,
    highlighted: ClusterResult,
}

#[wasm_bindgen]
impl MineAtlas {
    /// Load sites from GeoJSON text, optionally with a reference-points JSON
    /// replacing the built-in lists.
    #[wasm_bindgen(constructor)]
    pub fn new(sites_geojson: &str, references_json: Option<String>) -> Result<MineAtlas, JsValue> {
        Self::load(sites_geojson, references_json.as_deref()).map_err(|e| JsValue::from_str(&e))
    }

    #[wasm_bindgen(js_name = siteCount)]
    pub fn site_count(&self) -> usize {
        self.sites.len()
    }

    /// Every marker with its class and base style.
    pub fn markers(&self) -> Result<JsValue, JsValue> {
        to_js(&self.marker_views())
    }

    /// Select a site: report, buffer circle and cluster highlight.
    pub fn select(&mut self, id: usize) -> Result<JsValue, JsValue> {
        let view = self.select_site(SiteId(id)).map_err(|e| JsValue::from_str(&e))?;
        to_js(&view)
    }

    /// Apply an impact filter (`"all"` or a class token).
    pub fn filter(&mut self, token: &str) -> Result<JsValue, JsValue> {
        let view = self.apply_filter(token).map_err(|e| JsValue::from_str(&e))?;
        to_js(&view)
    }

    #[wasm_bindgen(js_name = heatPoints)]
    pub fn heat_points(&self) -> Result<JsValue, JsValue> {
        let pts: Vec<[f64; 3]> = self
            .heat_layer()
            .into_iter()
            .map(|p| [p.lat, p.lng, p.intensity as f64])
            .collect();
        to_js(&pts)
    }
}

// ── Native-side logic (also used by tests) ────────────────────────────────────

impl MineAtlas {
    pub fn load(sites_geojson: &str, references_json: Option<&str>) -> Result<Self, String> {
        let refs = match references_json {
            Some(json) => ReferenceSets::from_json_str(json).map_err(|e| e.to_string())?,
            None => ReferenceSets::quebec(),
        };
        let sites = parse_feature_collection(sites_geojson).map_err(|e| e.to_string())?;
        Ok(Self::from_sites(GeoClassifier::new(refs), sites))
    }

    /// Sites are renumbered `0..n` in the given order; ids are positions.
    pub fn from_sites(classifier: GeoClassifier, mut sites: Vec<Site>) -> Self {
        for (index, site) in sites.iter_mut().enumerate() {
            site.id = SiteId(index);
        }
        let classes = classifier.classify_all(&sites);
        Self {
            classifier,
            sites,
            classes,
            filter: ImpactFilter::All,
            selected: None,
            highlighted: ClusterResult::default(),
        }
    }

    pub fn marker_views(&self) -> Vec<MarkerView> {
        self.sites
            .iter()
            .zip(&self.classes)
            .map(|(s, &impact)| MarkerView {
                id: s.id,
                lat: s.lat,
                lng: s.lng,
                impact,
                style: style_for(impact),
            })
            .collect()
    }

    pub fn select_site(&mut self, id: SiteId) -> Result<SelectionView, String> {
        let site = self.sites.get(id.0).ok_or_else(|| format!("no site with id {}", id.0))?;
        let report = self.classifier.site_report(site, &self.sites);
        let buffer = BufferView {
            lat: site.lat,
            lng: site.lng,
            radius_m: buffer_radius_m(report.impact),
            style: BUFFER_STYLE,
        };

        let restore = self.take_highlight();
        let highlight = report
            .cluster
            .members
            .iter()
            .map(|&m| MarkerUpdate { id: m, style: self.base_style(m).highlighted() })
            .collect();
        self.highlighted = report.cluster.clone();
        self.selected = Some(id);

        Ok(SelectionView {
            cluster_text: report.cluster_text(),
            nearest_lines: report.nearest_lines(),
            report,
            buffer,
            highlight,
            restore,
        })
    }

    /// Changing the filter drops the selection and its highlight.
    pub fn apply_filter(&mut self, token: &str) -> Result<FilterView, String> {
        let filter: ImpactFilter = token.parse().map_err(|e: mines_core::Error| e.to_string())?;
        self.filter = filter;
        self.selected = None;
        let restore = self.take_highlight();
        let visible: Vec<SiteId> = self
            .sites
            .iter()
            .zip(&self.classes)
            .filter(|&(_, &c)| filter.matches(c))
            .map(|(s, _)| s.id)
            .collect();
        Ok(FilterView { stats: stats_line(visible.len(), filter), visible, restore })
    }

    pub fn heat_layer(&self) -> Vec<HeatPoint> {
        heat_points(&self.sites, &HeatmapParams::default())
    }

    pub fn selected(&self) -> Option<SiteId> {
        self.selected
    }

    pub fn active_filter(&self) -> ImpactFilter {
        self.filter
    }

    fn base_style(&self, id: SiteId) -> MarkerStyle {
        style_for(self.classes[id.0])
    }

    fn take_highlight(&mut self) -> Vec<MarkerUpdate> {
        std::mem::take(&mut self.highlighted)
            .members
            .into_iter()
            .map(|m| MarkerUpdate { id: m, style: self.base_style(m) })
            .collect()
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}
