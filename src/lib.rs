//! churnlens: Customer Churn Analytics Library
//!
//! Loads a retail-bank customer dataset, derives categorical segments and
//! computes churn statistics grouped by one or two dimensions.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
