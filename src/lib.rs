//! Book catalog service.
//!
//! The `books` module turns untrusted query strings and request bodies into
//! validated records, store predicates, sort directives and page windows, and
//! serves them over HTTP. [`bootstrap`] wires settings, storage and the HTTP
//! server together.

pub mod bootstrap;
pub mod modules;

pub use modules::books::{CatalogError, CatalogService};
