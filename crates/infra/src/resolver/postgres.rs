use std::sync::Arc;

use sqlx::{PgPool, Row};
use tracing::instrument;

use super::{CellNameResolver, ResolverError};

/// Looks cell names up in the shared `storage_cells` registry table.
#[derive(Debug, Clone)]
pub struct PostgresCellNameResolver {
    pool: Arc<PgPool>,
}

impl PostgresCellNameResolver {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl CellNameResolver for PostgresCellNameResolver {
    #[instrument(skip(self), err)]
    async fn resolve(&self, cell_barcode: &str) -> Result<Option<String>, ResolverError> {
        let row = sqlx::query("SELECT name FROM storage_cells WHERE shk = $1 LIMIT 1")
            .bind(cell_barcode)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut => {
                    ResolverError::Unavailable(e.to_string())
                }
                other => ResolverError::Lookup(other.to_string()),
            })?;

        let Some(row) = row else {
            return Ok(None);
        };
        let name: Option<String> = row
            .try_get("name")
            .map_err(|e| ResolverError::Lookup(e.to_string()))?;

        Ok(name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()))
    }
}
