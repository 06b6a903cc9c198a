use crate::model::{Record, View};
use crate::registry::Registry;
use tracing::debug;

pub const DEFAULT_SEARCH_THRESHOLD: f64 = 0.4;

/// Dropdown value meaning "no filtering".
pub const ALL: &str = "All";

/// User-selected predicates; every unset, blank or "All" field is a no-op.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    pub category: Option<String>,
    pub region: Option<String>,
    pub campus: Option<String>,
    pub certification: Option<String>,
    pub search_text: Option<String>,
    pub distributor: Option<String>,
    pub supplier: Option<String>,
}

impl Criteria {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn category(mut self, value: impl Into<String>) -> Self {
        self.category = Some(value.into());
        self
    }

    pub fn region(mut self, value: impl Into<String>) -> Self {
        self.region = Some(value.into());
        self
    }

    pub fn campus(mut self, value: impl Into<String>) -> Self {
        self.campus = Some(value.into());
        self
    }

    pub fn certification(mut self, value: impl Into<String>) -> Self {
        self.certification = Some(value.into());
        self
    }

    pub fn search(mut self, value: impl Into<String>) -> Self {
        self.search_text = Some(value.into());
        self
    }

    pub fn distributor(mut self, value: impl Into<String>) -> Self {
        self.distributor = Some(value.into());
        self
    }

    pub fn supplier(mut self, value: impl Into<String>) -> Self {
        self.supplier = Some(value.into());
        self
    }

    pub fn is_noop(&self) -> bool {
        [
            &self.category,
            &self.region,
            &self.campus,
            &self.certification,
            &self.search_text,
            &self.distributor,
            &self.supplier,
        ]
        .into_iter()
        .all(|f| active(f).is_none())
    }
}

/// The selected value, or `None` for the no-op sentinels.
pub fn active(field: &Option<String>) -> Option<&str> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != ALL)
}

/// Ratio `2 * LCS(a, b) / (|a| + |b|)` over lower-cased characters.
///
/// Same shape as a sequence-matcher ratio but uses the true longest common
/// subsequence, so it is symmetric and independent of matching-block order.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.trim().to_lowercase().chars().collect();
    let b: Vec<char> = b.trim().to_lowercase().chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 0.0;
    }
    2.0 * lcs_len(&a, &b) as f64 / total as f64
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for ca in a {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Applies criteria to views. Filtering only ever narrows a view and keeps
/// row order.
pub struct FilterPipeline<'r> {
    registry: &'r Registry,
    search_threshold: f64,
}

impl<'r> FilterPipeline<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            search_threshold: DEFAULT_SEARCH_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.search_threshold = threshold;
        self
    }

    pub fn apply<'a>(&self, view: &View<'a>, criteria: &Criteria) -> View<'a> {
        if criteria.is_noop() {
            return view.clone();
        }

        let region_campuses = match active(&criteria.region) {
            Some(region) => match self.registry.region_campuses(region) {
                Some(codes) => Some(codes),
                None => return View::default(),
            },
            None => None,
        };
        if let Some(campus) = active(&criteria.campus).filter(|c| self.registry.campus(c).is_none()) {
            debug!("Campus '{}' is not registered; nothing will match", campus);
        }
        if let Some(cert) = active(&criteria.certification).filter(|c| self.registry.certification(c).is_none()) {
            debug!("Certification '{}' is not registered; nothing will match", cert);
        }
        let query = active(&criteria.search_text).map(str::to_lowercase);

        let rows = view
            .iter()
            .copied()
            .filter(|record| {
                self.matches(record, criteria, region_campuses.as_deref(), query.as_deref())
            })
            .collect();
        View::from_rows(rows)
    }

    fn matches(
        &self,
        record: &Record,
        criteria: &Criteria,
        region_campuses: Option<&[&str]>,
        query: Option<&str>,
    ) -> bool {
        if let Some(category) = active(&criteria.category) {
            if record.category != category {
                return false;
            }
        }
        if let Some(distributor) = active(&criteria.distributor) {
            if record.distributor != distributor {
                return false;
            }
        }
        if let Some(supplier) = active(&criteria.supplier) {
            if record.supplier != supplier {
                return false;
            }
        }
        if let Some(codes) = region_campuses {
            if !codes.iter().any(|code| record.has_campus(code)) {
                return false;
            }
        }
        if let Some(campus) = active(&criteria.campus) {
            if !record.has_campus(campus) {
                return false;
            }
        }
        if let Some(cert) = active(&criteria.certification) {
            if !record.has_certification(cert) {
                return false;
            }
        }
        if let Some(query) = query {
            let score = similarity(query, &record.product_name).max(similarity(query, &record.supplier));
            if score <= self.search_threshold {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Dataset;

    fn record(category: &str, product: &str, campuses: &[&str], certs: &[&str]) -> Record {
        let mut r = Record {
            category: category.into(),
            product_name: product.into(),
            ..Default::default()
        };
        for c in campuses {
            r.campus_flags.insert((*c).into(), true);
        }
        for c in certs {
            r.certification_flags.insert((*c).into(), true);
        }
        r
    }

    fn scenario() -> Dataset {
        Dataset::new(vec![
            record("Produce", "A", &["UCB"], &["OG"]),
            record("Produce", "B", &["UCLA"], &[]),
            record("Dairy", "C", &["UCB"], &["OG"]),
        ])
    }

    fn names(view: &View<'_>) -> Vec<String> {
        view.iter().map(|r| r.product_name.clone()).collect()
    }

    #[test]
    fn noop_criteria_is_identity() {
        let registry = Registry::default();
        let dataset = scenario();
        let pipeline = FilterPipeline::new(&registry);
        let full = dataset.view();
        for criteria in [
            Criteria::all(),
            Criteria::all().category("All").region("").campus(" ").certification("All").search(""),
        ] {
            assert_eq!(pipeline.apply(&full, &criteria), full);
        }
    }

    #[test]
    fn scenario_category_and_certification() {
        let registry = Registry::default();
        let dataset = scenario();
        let pipeline = FilterPipeline::new(&registry);
        let full = dataset.view();

        let produce = pipeline.apply(&full, &Criteria::all().category("Produce"));
        assert_eq!(names(&produce), vec!["A", "B"]);

        let organic_produce = pipeline.apply(&full, &Criteria::all().category("Produce").certification("OG"));
        assert_eq!(names(&organic_produce), vec!["A"]);
    }

    #[test]
    fn composition_matches_conjunction() {
        let registry = Registry::default();
        let dataset = scenario();
        let pipeline = FilterPipeline::new(&registry);
        let full = dataset.view();

        let c1 = Criteria::all().certification("OG");
        let c2 = Criteria::all().region("NorCal");
        let both = Criteria::all().certification("OG").region("NorCal");

        let stepwise = pipeline.apply(&pipeline.apply(&full, &c1), &c2);
        let reversed = pipeline.apply(&pipeline.apply(&full, &c2), &c1);
        let combined = pipeline.apply(&full, &both);
        assert_eq!(stepwise, combined);
        assert_eq!(reversed, combined);
        assert_eq!(names(&combined), vec!["A", "C"]);
    }

    #[test]
    fn region_and_campus_filters() {
        let registry = Registry::default();
        let dataset = scenario();
        let pipeline = FilterPipeline::new(&registry);
        let full = dataset.view();

        assert_eq!(names(&pipeline.apply(&full, &Criteria::all().region("SoCal"))), vec!["B"]);
        assert!(pipeline.apply(&full, &Criteria::all().region("Central")).is_empty());
        assert_eq!(names(&pipeline.apply(&full, &Criteria::all().campus("UCB"))), vec!["A", "C"]);
    }

    #[test]
    fn unknown_values_yield_empty_views() {
        let registry = Registry::default();
        let dataset = scenario();
        let pipeline = FilterPipeline::new(&registry);
        let full = dataset.view();

        assert!(pipeline.apply(&full, &Criteria::all().category("Bakery")).is_empty());
        assert!(pipeline.apply(&full, &Criteria::all().region("Mars")).is_empty());
        assert!(pipeline.apply(&full, &Criteria::all().campus("UCX")).is_empty());
        assert!(pipeline.apply(&full, &Criteria::all().certification("ZZ")).is_empty());
    }

    #[test]
    fn distributor_and_supplier_equality() {
        let registry = Registry::default();
        let mut a = record("Produce", "A", &[], &[]);
        a.distributor = "Sysco".into();
        a.supplier = "Farm A".into();
        let mut b = record("Produce", "B", &[], &[]);
        b.distributor = "US Foods".into();
        b.supplier = "Farm A".into();
        let dataset = Dataset::new(vec![a, b]);
        let pipeline = FilterPipeline::new(&registry);
        let full = dataset.view();

        assert_eq!(names(&pipeline.apply(&full, &Criteria::all().distributor("Sysco"))), vec!["A"]);
        assert_eq!(names(&pipeline.apply(&full, &Criteria::all().supplier("Farm A"))), vec!["A", "B"]);
        assert!(pipeline.apply(&full, &Criteria::all().supplier("Farm")).is_empty());
    }

    #[test]
    fn filtering_leaves_base_untouched() {
        let registry = Registry::default();
        let dataset = scenario();
        let before = dataset.clone();
        let pipeline = FilterPipeline::new(&registry);
        let _ = pipeline.apply(&dataset.view(), &Criteria::all().category("Dairy"));
        assert_eq!(dataset, before);
    }

    #[test]
    fn search_matches_product_by_similarity() {
        let registry = Registry::default();
        let dataset = Dataset::new(vec![
            record("Beverages", "Apple Juice", &[], &[]),
            record("Spreads", "Grape Jelly", &[], &[]),
        ]);
        let pipeline = FilterPipeline::new(&registry);
        let hits = pipeline.apply(&dataset.view(), &Criteria::all().search("appl"));
        assert_eq!(names(&hits), vec!["Apple Juice"]);
    }

    #[test]
    fn search_uses_best_of_product_and_supplier() {
        let registry = Registry::default();
        let mut r = record("Dairy", "Whole Milk 1gal", &[], &[]);
        r.supplier = "Clover".into();
        let dataset = Dataset::new(vec![r]);
        let pipeline = FilterPipeline::new(&registry);
        let hits = pipeline.apply(&dataset.view(), &Criteria::all().search("CLOVER"));
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn threshold_is_configurable() {
        let registry = Registry::default();
        let dataset = Dataset::new(vec![record("Spreads", "Grape Jelly", &[], &[])]);
        let strict = FilterPipeline::new(&registry);
        let loose = FilterPipeline::new(&registry).with_threshold(0.3);
        let criteria = Criteria::all().search("appl");
        assert!(strict.apply(&dataset.view(), &criteria).is_empty());
        assert_eq!(loose.apply(&dataset.view(), &criteria).len(), 1);
    }

    #[test]
    fn similarity_scores() {
        assert!((similarity("appl", "Apple Juice") - 8.0 / 15.0).abs() < 1e-9);
        assert!((similarity("appl", "Grape Jelly") - 0.4).abs() < 1e-9);
        assert_eq!(similarity("Milk", "milk"), 1.0);
        assert_eq!(similarity("", ""), 0.0);
        assert_eq!(similarity("abc", ""), 0.0);
        assert_eq!(similarity("abc", "xyz"), similarity("xyz", "abc"));
    }
}
