// Core structs: Record, Dataset, View, and the error taxonomy
use crate::registry::Registry;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::ops::Deref;
use thiserror::Error;

/// Campus lists computed from a record's campus flags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedFields {
    pub procuring_campus_codes: Vec<String>,
    pub procuring_campus_names: Vec<String>,
    pub procuring_campus_contacts: Vec<String>,
}

/// One procurement item after normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub product_name: String,
    pub supplier: String,
    pub distributor: String,
    pub category: String,
    pub standard: String,
    pub campus_flags: BTreeMap<String, bool>,
    pub certification_flags: BTreeMap<String, bool>,
    pub derived: DerivedFields,
}

impl Record {
    pub fn has_campus(&self, code: &str) -> bool {
        self.campus_flags.get(code).copied().unwrap_or(false)
    }

    pub fn has_certification(&self, code: &str) -> bool {
        self.certification_flags.get(code).copied().unwrap_or(false)
    }

    pub fn value(&self, column: Column) -> Cow<'_, str> {
        match column {
            Column::Category => Cow::Borrowed(&self.category),
            Column::ProductName => Cow::Borrowed(&self.product_name),
            Column::Supplier => Cow::Borrowed(&self.supplier),
            Column::Distributor => Cow::Borrowed(&self.distributor),
            Column::Standard => Cow::Borrowed(&self.standard),
            Column::CampusesProcuring => Cow::Owned(self.derived.procuring_campus_codes.join(", ")),
            Column::FullCampusNames => Cow::Owned(self.derived.procuring_campus_names.join(", ")),
            Column::CampusContacts => Cow::Owned(self.derived.procuring_campus_contacts.join(", ")),
        }
    }
}

/// Displayable columns of a record, text fields first, then derived ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Category,
    ProductName,
    Supplier,
    Distributor,
    Standard,
    CampusesProcuring,
    FullCampusNames,
    CampusContacts,
}

impl Column {
    pub fn header(self) -> &'static str {
        match self {
            Column::Category => "Category",
            Column::ProductName => "ProductName",
            Column::Supplier => "Supplier",
            Column::Distributor => "Distributor",
            Column::Standard => "Standard",
            Column::CampusesProcuring => "Campuses Procuring",
            Column::FullCampusNames => "Full Campus Names",
            Column::CampusContacts => "Campus Contacts",
        }
    }
}

/// Rows of string cells keyed by header position, as read from the feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Canonical dataset, never mutated once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn view(&self) -> View<'_> {
        View {
            rows: self.records.iter().collect(),
        }
    }

    /// Canonical table form: text columns, then one `1`/`0` column per
    /// registered campus and certification code.
    pub fn to_table(&self, registry: &Registry) -> RawTable {
        let text_columns = [
            Column::Category,
            Column::ProductName,
            Column::Supplier,
            Column::Distributor,
            Column::Standard,
        ];
        let mut headers: Vec<String> = text_columns.iter().map(|c| c.header().to_string()).collect();
        headers.extend(registry.campus_codes().map(String::from));
        headers.extend(registry.certification_codes().map(String::from));

        let flag = |set: bool| if set { "1".to_string() } else { "0".to_string() };
        let rows = self
            .records
            .iter()
            .map(|record| {
                let mut row: Vec<String> = text_columns
                    .iter()
                    .map(|c| record.value(*c).into_owned())
                    .collect();
                row.extend(registry.campus_codes().map(|code| flag(record.has_campus(code))));
                row.extend(
                    registry
                        .certification_codes()
                        .map(|code| flag(record.has_certification(code))),
                );
                row
            })
            .collect();

        RawTable { headers, rows }
    }
}

/// Ordered, read-only subsequence of a dataset.
#[derive(Debug, Clone, Default)]
pub struct View<'a> {
    rows: Vec<&'a Record>,
}

impl<'a> View<'a> {
    pub fn from_rows(rows: Vec<&'a Record>) -> Self {
        Self { rows }
    }
}

impl<'a> Deref for View<'a> {
    type Target = [&'a Record];

    fn deref(&self) -> &Self::Target {
        &self.rows
    }
}

impl PartialEq for View<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.rows.len() == other.rows.len()
            && self
                .rows
                .iter()
                .zip(other.rows.iter())
                .all(|(a, b)| std::ptr::eq(*a, *b))
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("feed host answered with HTTP {0}")]
    Status(u16),
    #[error(
        "feed host returned an HTML page instead of CSV (page title: {}); check that the sheet is shared as 'Anyone with the link: Viewer'",
        .title.as_deref().unwrap_or("none")
    )]
    HtmlResponse { title: Option<String> },
    #[error("feed unavailable after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: Box<FetchError> },
}

impl FetchError {
    /// HTML bodies come from a permissions/login page and will not change on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Transport(_) | FetchError::Status(_))
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParserError {
    #[error("CSV parse error: {0}")]
    Csv(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("feed is missing the mandatory '{0}' column")]
    MissingColumn(String),
}

/// Anything that keeps the dataset from loading, in displayable form.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParserError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    #[error("please log in to continue")]
    NotLoggedIn,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("credential store error: {0}")]
    Store(String),
}
