//! # acervo-store: Persistence Boundary
//!
//! Every record the engine persists goes through one [`Repository`]. There is
//! no second write path: documents, transactions, the fiscal configuration
//! and governance entries are all written by [`Repository::commit`], which
//! applies a [`WriteBatch`] atomically. A decision and its governance entry
//! are therefore either both durable or both absent.
//!
//! Archive items and beneficiaries belong to the surrounding catalog and are
//! only read, through [`ArchiveCatalog`].
//!
//! ## Implementations
//!
//! - [`InMemoryRepository`] / [`InMemoryCatalog`]: `parking_lot` locks, used
//!   by tests and by the CLI when no database is configured.
//! - [`PgRepository`] / [`PgCatalog`]: PostgreSQL via `sqlx`, with embedded
//!   migrations (see [`postgres::init_pool`]).

pub mod batch;
pub mod catalog;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod repository;

pub use batch::{RecordWrite, WriteBatch};
pub use catalog::{ArchiveCatalog, Beneficiary, CatalogItem};
pub use error::StoreError;
pub use memory::{InMemoryCatalog, InMemoryRepository};
pub use postgres::{PgCatalog, PgRepository};
pub use repository::{LedgerFilter, Repository};
