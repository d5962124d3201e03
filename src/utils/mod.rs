//! Terminal output helpers shared by the binary and the report renderer

pub mod progress;
pub mod styling;

pub use progress::*;
pub use styling::*;
