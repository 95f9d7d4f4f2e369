//! Infrastructure layer: record storage, cell-name lookup, and the service
//! that orchestrates them.

pub mod resolver;
pub mod service;
pub mod store;

pub use resolver::{
    CellNameResolver, InMemoryCellNameResolver, PostgresCellNameResolver, ResolverError,
};
pub use service::{InventoryService, ServiceError, ServiceResult};
pub use store::{
    InMemoryRecordStore, LookupOrder, PostgresRecordStore, RecordFilter, RecordStore, StoreError,
};
