//! Book catalog service: authors, categories and books behind role-based
//! token authentication.

pub mod app;
pub mod error;
pub mod modules;
pub mod policy;
pub mod store;

pub use app::{Catalog, Repositories};
pub use error::{CatalogError, CatalogResult};
