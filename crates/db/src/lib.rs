//! Document storage for the catalog.
//!
//! Exposes the [`DocumentStore`] contract the catalog talks to, the query
//! primitives it is driven with ([`Filter`], [`SortSpec`], [`FindOptions`]),
//! and [`connect`], which turns a configured endpoint into a live store.

pub mod error;
pub mod memory;
pub mod query;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use query::{Clause, Direction, Filter, FindOptions, SortSpec};
pub use store::{connect, Document, DocumentStore, ID_FIELD};
