//! Report module - page composition, terminal rendering and JSON export

pub mod export;
pub mod pages;
pub mod summary;
pub mod tables;

pub use export::*;
pub use pages::*;
pub use summary::*;
pub use tables::*;
