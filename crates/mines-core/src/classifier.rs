//! `GeoClassifier`: reference sets + thresholds behind one handle.
//!
//! The handle is immutable after construction, so it can be shared across
//! threads freely. With the `threading` feature `classify_all` fans out over
//! rayon's global pool.

use crate::classify::{classify_impact, ClassifierParams, ImpactClass};
use crate::cluster::{cluster_within, ClusterResult};
use crate::error::Result;
use crate::nearest::{nearest, NearestResult};
use crate::policy::buffer_radius_m;
use crate::reference::ReferenceSets;
use crate::report::{ImpactSummary, SiteReport};
use crate::site::{Site, SiteAttributes};

#[cfg(feature = "threading")]
use rayon::prelude::*;

#[derive(Debug, Clone, Default)]
pub struct GeoClassifier {
    refs: ReferenceSets,
    params: ClassifierParams,
}

impl GeoClassifier {
    /// Classifier over the given references with default thresholds.
    pub fn new(refs: ReferenceSets) -> Self {
        Self { refs, params: ClassifierParams::default() }
    }

    pub fn with_params(refs: ReferenceSets, params: ClassifierParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { refs, params })
    }

    pub fn references(&self) -> &ReferenceSets {
        &self.refs
    }

    pub fn params(&self) -> &ClassifierParams {
        &self.params
    }

    pub fn classify(&self, lat: f64, lng: f64, attributes: &SiteAttributes) -> ImpactClass {
        classify_impact(lat, lng, attributes, &self.refs, &self.params)
    }

    pub fn classify_site(&self, site: &Site) -> ImpactClass {
        self.classify(site.lat, site.lng, &site.attributes)
    }

    /// Classes for every site, index-aligned with `sites`.
    pub fn classify_all(&self, sites: &[Site]) -> Vec<ImpactClass> {
        #[cfg(feature = "threading")]
        {
            sites.par_iter().map(|s| self.classify_site(s)).collect()
        }
        #[cfg(not(feature = "threading"))]
        {
            sites.iter().map(|s| self.classify_site(s)).collect()
        }
    }

    pub fn summarize(&self, sites: &[Site]) -> ImpactSummary {
        ImpactSummary::from_classes(self.classify_all(sites))
    }

    pub fn nearest_town(&self, lat: f64, lng: f64) -> Option<NearestResult> {
        nearest(lat, lng, &self.refs.population_centers)
    }

    pub fn nearest_indigenous(&self, lat: f64, lng: f64) -> Option<NearestResult> {
        nearest(lat, lng, &self.refs.indigenous_hubs)
    }

    pub fn nearest_water(&self, lat: f64, lng: f64) -> Option<NearestResult> {
        nearest(lat, lng, &self.refs.water_bodies)
    }

    /// Other sites within the configured cluster radius of `site`.
    pub fn cluster(&self, site: &Site, sites: &[Site]) -> ClusterResult {
        cluster_within(site, sites, self.params.cluster_radius_km)
    }

    /// Full context for one site against the collection it belongs to.
    pub fn site_report(&self, site: &Site, sites: &[Site]) -> SiteReport {
        let impact = self.classify_site(site);
        let a = &site.attributes;
        SiteReport {
            id: site.id,
            name: site.name().to_string(),
            impact,
            category: a.category.clone(),
            status: a.status.clone(),
            commodity: a.commodity.clone(),
            last_year: a.last_year.clone(),
            buffer_radius_m: buffer_radius_m(impact),
            cluster_radius_km: self.params.cluster_radius_km,
            cluster: self.cluster(site, sites),
            nearest_town: self.nearest_town(site.lat, site.lng),
            nearest_indigenous: self.nearest_indigenous(site.lat, site.lng),
            nearest_water: self.nearest_water(site.lat, site.lng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::SiteId;

    fn sites() -> Vec<Site> {
        vec![
            Site::new(0, 50.43, -73.87, SiteAttributes::default().with_name("Mine Mistissini")),
            Site::new(1, 50.50, -73.80, SiteAttributes::default()),
            Site::new(2, 47.5, -76.0, SiteAttributes::default().with_category("Tailings pond")),
            Site::new(3, 47.5, -76.0, SiteAttributes::default().with_name("Mine Abcourt")),
        ]
    }

    #[test]
    fn classify_all_is_index_aligned() {
        let gc = GeoClassifier::default();
        let classes = gc.classify_all(&sites());
        assert_eq!(
            classes,
            vec![
                ImpactClass::NearIndigenous,
                ImpactClass::NearIndigenous,
                ImpactClass::WaterTailings,
                ImpactClass::Remote,
            ]
        );
    }

    #[test]
    fn site_report_bundles_context() {
        let gc = GeoClassifier::default();
        let all = sites();
        let r = gc.site_report(&all[0], &all);
        assert_eq!(r.name, "Mine Mistissini");
        assert_eq!(r.impact, ImpactClass::NearIndigenous);
        assert_eq!(r.buffer_radius_m, 60_000);
        assert_eq!(r.cluster.members, vec![SiteId(1)]);
        assert_eq!(r.nearest_indigenous.as_ref().unwrap().item.name, "Mistissini");
        assert_eq!(r.nearest_water.as_ref().unwrap().item.name, "Lac Mistassini");
        assert!(r.nearest_town.is_some());
    }

    #[test]
    fn co_located_sites_cluster_with_each_other() {
        let gc = GeoClassifier::default();
        let all = sites();
        let r = gc.site_report(&all[2], &all);
        assert_eq!(r.cluster.members, vec![SiteId(3)]);
        assert_eq!(r.name, "Mine / site");
    }

    #[test]
    fn empty_references_give_absent_nearest() {
        let gc = GeoClassifier::new(ReferenceSets::empty());
        let all = sites();
        let r = gc.site_report(&all[3], &all);
        assert!(r.nearest_town.is_none());
        assert!(r.nearest_indigenous.is_none());
        assert!(r.nearest_water.is_none());
        assert_eq!(r.impact, ImpactClass::Remote);
    }

    #[test]
    fn custom_params_are_validated() {
        let bad = ClassifierParams { indigenous_radius_km: -5.0, ..ClassifierParams::default() };
        assert!(GeoClassifier::with_params(ReferenceSets::quebec(), bad).is_err());
    }

    #[test]
    fn summary_matches_classes() {
        let gc = GeoClassifier::default();
        let s = gc.summarize(&sites());
        assert_eq!(s.total, 4);
        assert_eq!(s.count(ImpactClass::NearIndigenous), 2);
        assert_eq!(s.count(ImpactClass::WaterTailings), 1);
        assert_eq!(s.count(ImpactClass::Remote), 1);
    }

    #[test]
    fn classifier_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GeoClassifier>();
    }
}
