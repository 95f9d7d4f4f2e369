use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use x3pl_core::RecordId;
use x3pl_inventory::{
    InventoryCorrection, InventoryRecord, LikeSearch, NewRecord, PageRequest, Placement,
    PlacementUpdate, RecordIdentity,
};

/// Which of several identity matches a lookup returns.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LookupOrder {
    /// Earliest `created_at` first (removal consumes the oldest stock).
    OldestFirst,
    /// Latest `created_at` first (inventory correction targets the newest row).
    NewestFirst,
}

/// Row filter for listing queries. Results are always newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFilter<'a> {
    Placement(Placement),
    Cell(&'a str),
    Like(&'a LikeSearch),
}

impl RecordFilter<'_> {
    pub fn matches(&self, record: &InventoryRecord) -> bool {
        match self {
            RecordFilter::Placement(p) => record.placement() == Some(*p),
            RecordFilter::Cell(cell) => record.cell_barcode.as_deref() == Some(*cell),
            RecordFilter::Like(search) => search.matches(record),
        }
    }
}

/// Record store operation error.
///
/// These are **infrastructure errors**; business outcomes such as "no
/// matching record" are expressed through `Option` / `bool` results.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("database error in {operation}: {message}")]
    Database { operation: &'static str, message: String },

    #[error("failed to decode row in {operation}: {message}")]
    Decode { operation: &'static str, message: String },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Storage for inventory records.
///
/// Every mutation after a lookup is conditional: it reports `false` instead
/// of writing when the row no longer has the state the caller observed.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a record, assigning its id.
    async fn insert(&self, record: NewRecord) -> Result<InventoryRecord, StoreError>;

    async fn get(&self, id: RecordId) -> Result<Option<InventoryRecord>, StoreError>;

    /// First record matching `identity` with `quantity >= min_quantity`.
    async fn find_by_identity(
        &self,
        identity: RecordIdentity<'_>,
        min_quantity: Option<i64>,
        order: LookupOrder,
    ) -> Result<Option<InventoryRecord>, StoreError>;

    /// Delete a record, only if it still holds `expected_quantity` (when given).
    async fn delete(
        &self,
        id: RecordId,
        expected_quantity: Option<i64>,
    ) -> Result<bool, StoreError>;

    /// Compare-and-set the quantity of a record and stamp `updated_at`.
    async fn set_quantity(
        &self,
        id: RecordId,
        expected_quantity: i64,
        new_quantity: i64,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Overwrite quantity, condition and reason of an existing record.
    async fn apply_correction(
        &self,
        id: RecordId,
        correction: &InventoryCorrection,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Assign a record to a cell; returns the updated row, `None` if missing.
    async fn apply_placement(
        &self,
        id: RecordId,
        update: &PlacementUpdate,
        at: DateTime<Utc>,
    ) -> Result<Option<InventoryRecord>, StoreError>;

    /// All records matching `filter`, newest first.
    async fn list(&self, filter: RecordFilter<'_>) -> Result<Vec<InventoryRecord>, StoreError>;

    /// One window of all records, newest first.
    async fn page(&self, page: PageRequest) -> Result<Vec<InventoryRecord>, StoreError>;

    async fn count(&self) -> Result<i64, StoreError>;
}

#[async_trait::async_trait]
impl<S> RecordStore for Arc<S>
where
    S: RecordStore + ?Sized,
{
    async fn insert(&self, record: NewRecord) -> Result<InventoryRecord, StoreError> {
        (**self).insert(record).await
    }

    async fn get(&self, id: RecordId) -> Result<Option<InventoryRecord>, StoreError> {
        (**self).get(id).await
    }

    async fn find_by_identity(
        &self,
        identity: RecordIdentity<'_>,
        min_quantity: Option<i64>,
        order: LookupOrder,
    ) -> Result<Option<InventoryRecord>, StoreError> {
        (**self).find_by_identity(identity, min_quantity, order).await
    }

    async fn delete(
        &self,
        id: RecordId,
        expected_quantity: Option<i64>,
    ) -> Result<bool, StoreError> {
        (**self).delete(id, expected_quantity).await
    }

    async fn set_quantity(
        &self,
        id: RecordId,
        expected_quantity: i64,
        new_quantity: i64,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        (**self).set_quantity(id, expected_quantity, new_quantity, at).await
    }

    async fn apply_correction(
        &self,
        id: RecordId,
        correction: &InventoryCorrection,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        (**self).apply_correction(id, correction, at).await
    }

    async fn apply_placement(
        &self,
        id: RecordId,
        update: &PlacementUpdate,
        at: DateTime<Utc>,
    ) -> Result<Option<InventoryRecord>, StoreError> {
        (**self).apply_placement(id, update, at).await
    }

    async fn list(&self, filter: RecordFilter<'_>) -> Result<Vec<InventoryRecord>, StoreError> {
        (**self).list(filter).await
    }

    async fn page(&self, page: PageRequest) -> Result<Vec<InventoryRecord>, StoreError> {
        (**self).page(page).await
    }

    async fn count(&self) -> Result<i64, StoreError> {
        (**self).count().await
    }
}
