//! Warehouse cell name lookup.
//!
//! Cells are identified by barcode (`wr_shk`); their display name (`wr_name`)
//! is owned by a separate registry. A cell without a usable name is treated
//! as unknown.

mod postgres;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;

pub use postgres::PostgresCellNameResolver;

#[derive(Debug, Clone, Error)]
pub enum ResolverError {
    #[error("cell lookup failed: {0}")]
    Lookup(String),

    #[error("cell registry unavailable: {0}")]
    Unavailable(String),
}

/// Resolves a cell barcode to its display name.
#[async_trait::async_trait]
pub trait CellNameResolver: Send + Sync {
    /// `Ok(None)` when the cell is unknown or has an empty name.
    async fn resolve(&self, cell_barcode: &str) -> Result<Option<String>, ResolverError>;
}

#[async_trait::async_trait]
impl<R> CellNameResolver for Arc<R>
where
    R: CellNameResolver + ?Sized,
{
    async fn resolve(&self, cell_barcode: &str) -> Result<Option<String>, ResolverError> {
        (**self).resolve(cell_barcode).await
    }
}

/// Fixed cell registry for tests/dev, seeded from configuration.
#[derive(Debug, Default)]
pub struct InMemoryCellNameResolver {
    cells: RwLock<HashMap<String, String>>,
}

impl InMemoryCellNameResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            cells: RwLock::new(
                pairs
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    pub fn insert(
        &self,
        cell_barcode: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<(), ResolverError> {
        let mut cells = self
            .cells
            .write()
            .map_err(|_| ResolverError::Unavailable("cell registry lock poisoned".to_string()))?;
        cells.insert(cell_barcode.into(), name.into());
        Ok(())
    }
}

#[async_trait::async_trait]
impl CellNameResolver for InMemoryCellNameResolver {
    async fn resolve(&self, cell_barcode: &str) -> Result<Option<String>, ResolverError> {
        let cells = self
            .cells
            .read()
            .map_err(|_| ResolverError::Unavailable("cell registry lock poisoned".to_string()))?;
        Ok(cells
            .get(cell_barcode)
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string))
    }
}
