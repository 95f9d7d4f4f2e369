//! Inventory record store boundary.
//!
//! This module defines the storage-facing abstraction used by the service,
//! plus an in-memory implementation (dev/tests) and a PostgreSQL one.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryRecordStore;
pub use postgres::PostgresRecordStore;
pub use r#trait::{LookupOrder, RecordFilter, RecordStore, StoreError};
