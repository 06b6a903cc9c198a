use crate::model::{Column, View};
use crate::registry::{CampusInfo, Registry};
use std::collections::{BTreeMap, BTreeSet};

/// One bar of the certification chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificationCount {
    pub code: String,
    pub label: String,
    pub count: usize,
}

/// Aggregations over a (possibly filtered) view.
pub struct Reporter<'r> {
    registry: &'r Registry,
}

impl<'r> Reporter<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// Certifications with at least one flagged record, largest count first.
    /// Ties keep registry order.
    pub fn certification_counts(&self, view: &View<'_>) -> Vec<CertificationCount> {
        let mut counts: Vec<CertificationCount> = self
            .registry
            .certifications
            .iter()
            .map(|cert| CertificationCount {
                code: cert.code.clone(),
                label: cert.label.clone(),
                count: view.iter().filter(|r| r.has_certification(&cert.code)).count(),
            })
            .filter(|c| c.count > 0)
            .collect();
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        counts
    }

    /// Registered campuses with at least one flagged record in the view.
    pub fn procuring_campuses(&self, view: &View<'_>) -> Vec<&'r CampusInfo> {
        self.registry
            .campuses
            .iter()
            .filter(|campus| view.iter().any(|r| r.has_campus(&campus.code)))
            .collect()
    }
}

/// Sorted, de-duplicated, non-empty values of a column.
pub fn unique_values(view: &View<'_>, column: Column) -> Vec<String> {
    view.iter()
        .map(|r| r.value(column))
        .filter(|v| !v.is_empty())
        .map(|v| v.into_owned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Row count per non-empty value of a column.
pub fn value_frequency(view: &View<'_>, column: Column) -> BTreeMap<String, usize> {
    let mut freq: BTreeMap<String, usize> = BTreeMap::new();
    for record in view.iter() {
        let value = record.value(column);
        if value.is_empty() {
            continue;
        }
        *freq.entry(value.into_owned()).or_default() += 1;
    }
    freq
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Dataset, Record};

    fn record(category: &str, supplier: &str, campuses: &[&str], certs: &[&str]) -> Record {
        let mut r = Record {
            category: category.into(),
            supplier: supplier.into(),
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
            record("Produce", "Farm A", &["UCB"], &["OG"]),
            record("Produce", "Farm B", &["UCLA"], &[]),
            record("Dairy", "Farm A", &["UCB"], &["OG"]),
        ])
    }

    #[test]
    fn scenario_counts_and_categories() {
        let registry = Registry::default();
        let dataset = scenario();
        let reporter = Reporter::new(&registry);
        let counts = reporter.certification_counts(&dataset.view());
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].label, "Organic");
        assert_eq!(counts[0].count, 2);
        assert_eq!(unique_values(&dataset.view(), Column::Category), vec!["Dairy", "Produce"]);
    }

    #[test]
    fn counts_sorted_descending_with_registry_tiebreak() {
        let registry = Registry::default();
        let dataset = Dataset::new(vec![
            record("X", "", &[], &["FT", "CH"]),
            record("X", "", &[], &["FT", "CH"]),
            record("X", "", &[], &["MSC", "OG"]),
            record("X", "", &[], &["MSC"]),
            record("X", "", &[], &["MSC"]),
        ]);
        let counts = Reporter::new(&registry).certification_counts(&dataset.view());
        let order: Vec<(&str, usize)> = counts.iter().map(|c| (c.code.as_str(), c.count)).collect();
        assert_eq!(order, vec![("MSC", 3), ("CH", 2), ("FT", 2), ("OG", 1)]);
        assert!(counts.iter().all(|c| c.count > 0));
    }

    #[test]
    fn repeated_counts_are_stable() {
        let registry = Registry::default();
        let dataset = scenario();
        let reporter = Reporter::new(&registry);
        assert_eq!(
            reporter.certification_counts(&dataset.view()),
            reporter.certification_counts(&dataset.view())
        );
    }

    #[test]
    fn unique_values_sorted_and_idempotent() {
        let dataset = Dataset::new(vec![
            record("Produce", "b", &[], &[]),
            record("Dairy", "", &[], &[]),
            record("Produce", "a", &[], &[]),
        ]);
        let first = unique_values(&dataset.view(), Column::Supplier);
        let second = unique_values(&dataset.view(), Column::Supplier);
        assert_eq!(first, vec!["a", "b"]);
        assert_eq!(first, second);
    }

    #[test]
    fn frequency_counts_rows() {
        let dataset = scenario();
        let freq = value_frequency(&dataset.view(), Column::Supplier);
        assert_eq!(freq.get("Farm A"), Some(&2));
        assert_eq!(freq.get("Farm B"), Some(&1));
    }

    #[test]
    fn procuring_campuses_in_registry_order() {
        let registry = Registry::default();
        let dataset = scenario();
        let campuses = Reporter::new(&registry).procuring_campuses(&dataset.view());
        let codes: Vec<&str> = campuses.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["UCLA", "UCB"]);
    }

    #[test]
    fn empty_view_gives_empty_results() {
        let registry = Registry::default();
        let empty = View::default();
        let reporter = Reporter::new(&registry);
        assert!(reporter.certification_counts(&empty).is_empty());
        assert!(reporter.procuring_campuses(&empty).is_empty());
        assert!(unique_values(&empty, Column::Category).is_empty());
        assert!(value_frequency(&empty, Column::Supplier).is_empty());
    }
}
