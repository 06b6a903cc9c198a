// CSV export of the currently displayed table
use crate::analyzer::filter::{Criteria, active};
use crate::model::{Column, View};
use crate::utils::sanitize_filename;
use csv::Writer;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV buffer error: {0}")]
    Buffer(String),
}

/// A rendered CSV document and the name it should be saved under.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    pub fn from_rows<I>(filename: String, headers: &[&str], rows: I) -> Result<Self, ExportError>
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        let mut writer = Writer::from_writer(Vec::new());
        writer.write_record(headers)?;
        for row in rows {
            writer.write_record(&row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| ExportError::Buffer(e.to_string()))?;
        Ok(Self { filename, bytes })
    }

    /// Exactly the given columns of every row in the view, in view order.
    pub fn from_view(filename: String, view: &View<'_>, columns: &[Column]) -> Result<Self, ExportError> {
        let headers: Vec<&str> = columns.iter().map(|c| c.header()).collect();
        let rows = view
            .iter()
            .map(|record| columns.iter().map(|c| record.value(*c).into_owned()).collect());
        Self::from_rows(filename, &headers, rows)
    }

    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        fs::write(&path, &self.bytes)?;
        info!("Exported {} bytes to {}", self.bytes.len(), path.display());
        Ok(path)
    }
}

/// `filtered_<selection>.csv`, or `filtered_data.csv` when nothing is selected.
pub fn explorer_filename(criteria: &Criteria) -> String {
    let parts: Vec<String> = [
        &criteria.category,
        &criteria.region,
        &criteria.campus,
        &criteria.certification,
        &criteria.search_text,
    ]
    .into_iter()
    .filter_map(active)
    .map(sanitize_filename)
    .collect();

    if parts.is_empty() {
        "filtered_data.csv".to_string()
    } else {
        format!("filtered_{}.csv", parts.join("_"))
    }
}

/// `<selection>_products.csv` for the distributor and supplier views.
pub fn products_filename(selection: &str) -> String {
    format!("{}_products.csv", sanitize_filename(selection))
}
