use crate::model::{Dataset, RawTable, Record, SchemaError};
use crate::registry::Registry;
use crate::utils::parse_flag;
use std::collections::BTreeMap;
use tracing::{debug, warn};

const PRODUCT_NAME_ALIASES: &[&str] = &["ProductName", "Product Name", "Product", "Item"];
const SUPPLIER_ALIASES: &[&str] = &["Supplier"];
const DISTRIBUTOR_ALIASES: &[&str] = &["Distributor"];
const CATEGORY_ALIASES: &[&str] = &["Category"];
const STANDARD_ALIASES: &[&str] = &["Standard", "Standards"];

/// Column positions resolved once per table.
struct ColumnMap {
    category: usize,
    product_name: Option<usize>,
    supplier: Option<usize>,
    distributor: Option<usize>,
    standard: Option<usize>,
    campuses: Vec<(String, Option<usize>)>,
    certifications: Vec<(String, Option<usize>)>,
}

impl ColumnMap {
    fn resolve(headers: &[String], registry: &Registry) -> Result<Self, SchemaError> {
        let headers: Vec<&str> = headers.iter().map(|h| h.trim()).collect();

        let category = find_column(&headers, CATEGORY_ALIASES)
            .ok_or_else(|| SchemaError::MissingColumn(CATEGORY_ALIASES[0].to_string()))?;

        let flag_columns = |codes: Vec<&str>| -> Vec<(String, Option<usize>)> {
            codes
                .into_iter()
                .map(|code| {
                    let idx = find_column(&headers, &[code]);
                    if idx.is_none() {
                        debug!("Column '{}' absent from feed, defaulting to 0", code);
                    }
                    (code.to_string(), idx)
                })
                .collect()
        };

        Ok(Self {
            category,
            product_name: find_column(&headers, PRODUCT_NAME_ALIASES),
            supplier: find_column(&headers, SUPPLIER_ALIASES),
            distributor: find_column(&headers, DISTRIBUTOR_ALIASES),
            standard: find_column(&headers, STANDARD_ALIASES),
            campuses: flag_columns(registry.campus_codes().collect()),
            certifications: flag_columns(registry.certification_codes().collect()),
        })
    }

    fn mapped_indices(&self) -> impl Iterator<Item = usize> + '_ {
        [self.product_name, self.supplier, self.distributor, self.standard]
            .into_iter()
            .flatten()
            .chain(std::iter::once(self.category))
            .chain(self.campuses.iter().filter_map(|(_, idx)| *idx))
            .chain(self.certifications.iter().filter_map(|(_, idx)| *idx))
    }
}

/// First alias present wins; comparison ignores case and surrounding blanks.
fn find_column(headers: &[&str], aliases: &[&str]) -> Option<usize> {
    aliases
        .iter()
        .find_map(|alias| headers.iter().position(|h| h.eq_ignore_ascii_case(alias)))
}

fn cell(row: &[String], idx: Option<usize>) -> String {
    idx.and_then(|i| row.get(i))
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Reconciles a raw feed table into the canonical dataset.
///
/// Only `Category` is mandatory; every other column degrades to an empty
/// string or an unset flag. Unregistered campus/certification columns are
/// ignored.
pub fn normalize(table: &RawTable, registry: &Registry) -> Result<Dataset, SchemaError> {
    let columns = ColumnMap::resolve(&table.headers, registry)?;

    let mut records = Vec::with_capacity(table.rows.len());
    let mut skipped = 0usize;
    for row in &table.rows {
        if columns
            .mapped_indices()
            .all(|i| row.get(i).is_none_or(|c| c.trim().is_empty()))
        {
            skipped += 1;
            continue;
        }
        records.push(normalize_row(row, &columns));
    }

    if skipped > 0 {
        warn!("Skipped {} blank rows while normalizing feed", skipped);
    }
    Ok(Dataset::new(records))
}

fn normalize_row(row: &[String], columns: &ColumnMap) -> Record {
    let flags = |cols: &[(String, Option<usize>)]| -> BTreeMap<String, bool> {
        cols.iter()
            .map(|(code, idx)| (code.clone(), parse_flag(&cell(row, *idx))))
            .collect()
    };

    Record {
        product_name: cell(row, columns.product_name),
        supplier: cell(row, columns.supplier),
        distributor: cell(row, columns.distributor),
        category: cell(row, Some(columns.category)),
        standard: cell(row, columns.standard),
        campus_flags: flags(&columns.campuses),
        certification_flags: flags(&columns.certifications),
        derived: Default::default(),
    }
}
