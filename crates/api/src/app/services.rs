//! Storage and resolver wiring.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use x3pl_infra::{
    CellNameResolver, InMemoryCellNameResolver, InMemoryRecordStore, InventoryService,
    PostgresCellNameResolver, PostgresRecordStore, RecordStore, StoreError,
};

use crate::config::Args;

/// Service as shared by every handler, with type-erased backends.
pub type AppServices = InventoryService<Arc<dyn RecordStore>, Arc<dyn CellNameResolver>>;

#[derive(Debug, Error)]
pub enum WiringError {
    #[error("failed to connect to Postgres: {0}")]
    Connect(#[from] sqlx::Error),

    #[error("failed to prepare schema: {0}")]
    Schema(#[from] StoreError),
}

/// Build services from configuration: Postgres when a database URL is
/// configured, in-memory otherwise.
pub async fn build_services(args: &Args) -> Result<AppServices, WiringError> {
    match &args.database_url {
        Some(url) => build_persistent_services(url, args.db_max_connections).await,
        None => Ok(build_in_memory_services(args)),
    }
}

pub fn build_in_memory_services(args: &Args) -> AppServices {
    if !args.cells.is_empty() {
        tracing::info!(cells = args.cells.len(), "seeding in-memory cell registry");
    }
    let resolver = InMemoryCellNameResolver::from_pairs(
        args.cells.iter().map(|c| (c.barcode.clone(), c.name.clone())),
    );

    let store: Arc<dyn RecordStore> = Arc::new(InMemoryRecordStore::new());
    let resolver: Arc<dyn CellNameResolver> = Arc::new(resolver);
    InventoryService::new(store, resolver)
}

async fn build_persistent_services(
    url: &str,
    max_connections: u32,
) -> Result<AppServices, WiringError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await?;

    let store = PostgresRecordStore::new(pool.clone());
    store.ensure_schema().await?;
    tracing::info!(max_connections, "connected to Postgres record store");

    let store: Arc<dyn RecordStore> = Arc::new(store);
    let resolver: Arc<dyn CellNameResolver> = Arc::new(PostgresCellNameResolver::new(pool));
    Ok(InventoryService::new(store, resolver))
}
