// Analyzer module: derivation, filtering and reporting over the canonical dataset.

pub mod derivation;
pub mod filter;
pub mod report;

pub use derivation::derive_all;
pub use filter::{Criteria, FilterPipeline};
pub use report::{Reporter, unique_values, value_frequency};
