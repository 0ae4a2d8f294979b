// Service catalog: billable services persisted as rows of a CSV file.
// Ids are positional and derived on every read, never stored.

pub mod handlers;
pub mod models;
pub mod store;

pub use store::{CatalogError, CatalogStore};
