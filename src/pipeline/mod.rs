//! Pipeline module - loading, enrichment, filtering and segment aggregation

pub mod aggregate;
pub mod cache;
pub mod error;
pub mod filter;
pub mod loader;
pub mod metrics;
pub mod record;
pub mod segments;

pub use aggregate::*;
pub use cache::*;
pub use error::*;
pub use filter::*;
pub use loader::*;
pub use metrics::*;
pub use record::*;
pub use segments::*;
