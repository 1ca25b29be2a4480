#![forbid(unsafe_code)]
//! Domain model for learner progress and achievement badges.

pub mod catalog;
pub mod criteria;
pub mod model;
pub mod time;

pub use catalog::{BadgeCatalog, CatalogError, default_catalog};
pub use time::Clock;
