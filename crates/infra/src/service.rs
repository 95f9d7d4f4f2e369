//! Inventory operations over a record store and a cell-name resolver.
//!
//! The service receives already-validated commands, resolves cell names,
//! plans state transitions with the pure domain functions and carries them
//! out against the store.

use chrono::Utc;
use thiserror::Error;
use tracing::info;

use x3pl_core::DomainError;
use x3pl_inventory::messages;
use x3pl_inventory::{
    AddMinimalRecord, AddRecord, CellSearch, InventoryOutcome, InventoryRecord, LikeSearch,
    NewRecord, PageInfo, PageRequest, PerformInventory, Placement, PlacementUpdate,
    RemovalOutcome, RemoveItems, UpdatePlacement, plan_inventory, plan_removal,
};

use crate::resolver::{CellNameResolver, ResolverError};
use crate::store::{LookupOrder, RecordFilter, RecordStore, StoreError};

/// Attempts made for a lookup followed by a conditional write.
const MAX_ATTEMPTS: usize = 3;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Client-facing failure: validation, missing record, business rule.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Infrastructure failure; the detail is for logs only.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn is_internal(&self) -> bool {
        matches!(self, ServiceError::Internal(_))
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

impl From<ResolverError> for ServiceError {
    fn from(err: ResolverError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Clone)]
pub struct InventoryService<S, R> {
    store: S,
    resolver: R,
}

impl<S, R> InventoryService<S, R>
where
    S: RecordStore,
    R: CellNameResolver,
{
    pub fn new(store: S, resolver: R) -> Self {
        Self { store, resolver }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn cell_name(&self, cell_barcode: &str) -> ServiceResult<String> {
        self.resolver
            .resolve(cell_barcode)
            .await?
            .ok_or_else(|| DomainError::business(messages::cell_not_found(cell_barcode)).into())
    }

    /// Put a quantity of a product into a known cell as a new placed record.
    pub async fn add_record(&self, cmd: AddRecord) -> ServiceResult<InventoryRecord> {
        let cell_name = self.cell_name(&cmd.cell_barcode).await?;

        let record = self
            .store
            .insert(NewRecord {
                product_barcode: cmd.product_barcode,
                product_name: cmd.product_name,
                cell_barcode: Some(cmd.cell_barcode),
                cell_name: Some(cell_name),
                quantity: cmd.quantity,
                condition: Some(cmd.condition),
                reason: cmd.reason,
                executor: Some(cmd.executor),
                created_at: Utc::now(),
            })
            .await?;

        info!(
            id = %record.id,
            wr_shk = ?record.cell_barcode,
            kolvo = record.quantity,
            "record inserted"
        );
        Ok(record)
    }

    /// Register a product with no cell and zero quantity.
    pub async fn add_minimal_record(
        &self,
        cmd: AddMinimalRecord,
    ) -> ServiceResult<InventoryRecord> {
        let record = self
            .store
            .insert(NewRecord {
                product_barcode: cmd.product_barcode,
                product_name: cmd.product_name,
                cell_barcode: None,
                cell_name: None,
                quantity: 0,
                condition: None,
                reason: None,
                executor: None,
                created_at: Utc::now(),
            })
            .await?;

        info!(id = %record.id, "minimal record inserted");
        Ok(record)
    }

    /// Take a quantity out of the oldest record that holds enough.
    pub async fn remove_items(&self, cmd: RemoveItems) -> ServiceResult<RemovalOutcome> {
        for _ in 0..MAX_ATTEMPTS {
            let Some(record) = self
                .store
                .find_by_identity(cmd.identity(), Some(cmd.quantity), LookupOrder::OldestFirst)
                .await?
            else {
                return Err(DomainError::business(messages::INSUFFICIENT_OR_MISSING).into());
            };

            let outcome = plan_removal(&record, &cmd)?;
            let applied = match &outcome {
                RemovalOutcome::Delete => {
                    self.store.delete(record.id, Some(record.quantity)).await?
                }
                RemovalOutcome::Decrement { from, to } => {
                    self.store.set_quantity(record.id, *from, *to, Utc::now()).await?
                }
            };

            if applied {
                match &outcome {
                    RemovalOutcome::Delete => {
                        info!(id = %record.id, "record deleted, quantity exhausted")
                    }
                    RemovalOutcome::Decrement { from, to } => {
                        info!(id = %record.id, from, to, "record quantity decremented")
                    }
                }
                return Ok(outcome);
            }
        }

        Err(DomainError::conflict(messages::CONCURRENT_MODIFICATION).into())
    }

    /// Set the counted quantity on the newest matching record.
    pub async fn perform_inventory(
        &self,
        cmd: PerformInventory,
    ) -> ServiceResult<InventoryOutcome> {
        let outcome = plan_inventory(&cmd);

        for _ in 0..MAX_ATTEMPTS {
            let Some(record) = self
                .store
                .find_by_identity(cmd.identity(), None, LookupOrder::NewestFirst)
                .await?
            else {
                return Err(DomainError::business(messages::RECORD_NOT_FOUND).into());
            };

            let applied = match &outcome {
                InventoryOutcome::Delete => self.store.delete(record.id, None).await?,
                InventoryOutcome::Overwrite(correction) => {
                    self.store
                        .apply_correction(record.id, correction, Utc::now())
                        .await?
                }
            };

            if applied {
                match &outcome {
                    InventoryOutcome::Delete => {
                        info!(id = %record.id, "record deleted by inventory count")
                    }
                    InventoryOutcome::Overwrite(c) => info!(
                        id = %record.id,
                        from = record.quantity,
                        to = c.quantity,
                        "record quantity set by inventory count"
                    ),
                }
                return Ok(outcome);
            }
        }

        Err(DomainError::conflict(messages::CONCURRENT_MODIFICATION).into())
    }

    /// Assign an existing record to a cell with a quantity.
    pub async fn update_placement(&self, cmd: UpdatePlacement) -> ServiceResult<InventoryRecord> {
        if self.store.get(cmd.id).await?.is_none() {
            return Err(DomainError::not_found(messages::record_id_not_found(cmd.id)).into());
        }

        let cell_name = self.cell_name(&cmd.cell_barcode).await?;
        let update = PlacementUpdate {
            cell_barcode: cmd.cell_barcode,
            cell_name,
            quantity: cmd.quantity,
            executor: cmd.executor,
            condition: cmd.condition,
            reason: cmd.reason,
        };

        let record = self
            .store
            .apply_placement(cmd.id, &update, Utc::now())
            .await?
            .ok_or_else(|| DomainError::not_found(messages::record_id_not_found(cmd.id)))?;

        info!(
            id = %record.id,
            wr_shk = %update.cell_barcode,
            kolvo = record.quantity,
            "record placed"
        );
        Ok(record)
    }

    pub async fn placed(&self) -> ServiceResult<Vec<InventoryRecord>> {
        Ok(self.store.list(RecordFilter::Placement(Placement::Placed)).await?)
    }

    pub async fn unplaced(&self) -> ServiceResult<Vec<InventoryRecord>> {
        Ok(self.store.list(RecordFilter::Placement(Placement::Unplaced)).await?)
    }

    pub async fn search_by_cell(&self, search: CellSearch) -> ServiceResult<Vec<InventoryRecord>> {
        Ok(self.store.list(RecordFilter::Cell(&search.cell_barcode)).await?)
    }

    pub async fn search_like(&self, search: LikeSearch) -> ServiceResult<Vec<InventoryRecord>> {
        Ok(self.store.list(RecordFilter::Like(&search)).await?)
    }

    pub async fn list_all(
        &self,
        page: PageRequest,
    ) -> ServiceResult<(Vec<InventoryRecord>, PageInfo)> {
        let total = self.store.count().await?;
        let items = self.store.page(page).await?;
        Ok((items, page.info(total)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::{DateTime, Utc};
    use serde_json::json;
    use x3pl_core::RecordId;
    use x3pl_inventory::{InventoryCorrection, RecordIdentity};

    use super::*;
    use crate::resolver::InMemoryCellNameResolver;
    use crate::store::InMemoryRecordStore;

    type TestService = InventoryService<Arc<InMemoryRecordStore>, InMemoryCellNameResolver>;

    fn service() -> TestService {
        InventoryService::new(
            Arc::new(InMemoryRecordStore::new()),
            InMemoryCellNameResolver::from_pairs([("C1", "Shelf 1"), ("C2", "Shelf 2")]),
        )
    }

    fn add(shk: &str, cell: &str, kolvo: i64) -> AddRecord {
        AddRecord::from_input(&json!({
            "shk": shk, "name": "Widget", "wr_shk": cell, "kolvo": kolvo,
            "condition": "Good", "ispolnitel": "Bob"
        }))
        .unwrap()
    }

    fn remove(shk: &str, cell: &str, kolvo: i64) -> RemoveItems {
        RemoveItems::from_input(&json!({
            "shk": shk, "wr_shk": cell, "condition": "Good", "kolvo": kolvo
        }))
        .unwrap()
    }

    fn count(shk: &str, cell: &str, kolvo: i64) -> PerformInventory {
        PerformInventory::from_input(&json!({
            "shk": shk, "wr_shk": cell, "condition": "Good", "kolvo": kolvo, "reason": "recount"
        }))
        .unwrap()
    }

    fn minimal(shk: &str, name: &str) -> AddMinimalRecord {
        AddMinimalRecord::from_input(&json!({ "shk": shk, "name": name })).unwrap()
    }

    #[tokio::test]
    async fn added_record_is_placed_with_resolved_name() {
        let svc = service();
        let record = svc.add_record(add("A1", "C1", 10)).await.unwrap();

        assert_eq!(record.cell_name.as_deref(), Some("Shelf 1"));
        assert!(record.updated_at.is_none());
        assert_eq!(svc.placed().await.unwrap(), vec![record]);
    }

    #[tokio::test]
    async fn unknown_cell_is_rejected_and_nothing_is_stored() {
        let svc = service();
        let err = svc.add_record(add("A1", "ZZ", 1)).await.unwrap_err();

        assert_eq!(err.to_string(), "Warehouse with SHK 'ZZ' not found");
        assert_eq!(svc.store().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn partial_then_full_removal() {
        let svc = service();
        svc.add_record(add("A1", "C1", 10)).await.unwrap();

        let outcome = svc.remove_items(remove("A1", "C1", 4)).await.unwrap();
        assert_eq!(outcome, RemovalOutcome::Decrement { from: 10, to: 6 });
        let left = svc.placed().await.unwrap();
        assert_eq!(left[0].quantity, 6);
        assert!(left[0].updated_at.is_some());

        let outcome = svc.remove_items(remove("A1", "C1", 6)).await.unwrap();
        assert_eq!(outcome, RemovalOutcome::Delete);
        assert!(svc.placed().await.unwrap().is_empty());

        let err = svc.remove_items(remove("A1", "C1", 1)).await.unwrap_err();
        assert_eq!(err.to_string(), messages::INSUFFICIENT_OR_MISSING);
    }

    #[tokio::test]
    async fn removal_never_splits_across_records() {
        let svc = service();
        svc.add_record(add("A1", "C1", 3)).await.unwrap();
        svc.add_record(add("A1", "C1", 3)).await.unwrap();

        let err = svc.remove_items(remove("A1", "C1", 5)).await.unwrap_err();
        assert_eq!(err.to_string(), messages::INSUFFICIENT_OR_MISSING);
        assert_eq!(svc.store().count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn removal_takes_from_the_oldest_sufficient_record() {
        let svc = service();
        let small = svc.add_record(add("A1", "C1", 2)).await.unwrap();
        let first_big = svc.add_record(add("A1", "C1", 8)).await.unwrap();
        let second_big = svc.add_record(add("A1", "C1", 8)).await.unwrap();

        svc.remove_items(remove("A1", "C1", 5)).await.unwrap();

        let store = svc.store();
        assert_eq!(store.get(small.id).await.unwrap().unwrap().quantity, 2);
        assert_eq!(store.get(first_big.id).await.unwrap().unwrap().quantity, 3);
        assert_eq!(store.get(second_big.id).await.unwrap().unwrap().quantity, 8);
    }

    #[tokio::test]
    async fn inventory_count_targets_newest_record() {
        let svc = service();
        let older = svc.add_record(add("A1", "C1", 5)).await.unwrap();
        let newer = svc.add_record(add("A1", "C1", 5)).await.unwrap();

        svc.perform_inventory(count("A1", "C1", 8)).await.unwrap();

        let store = svc.store();
        assert_eq!(store.get(older.id).await.unwrap().unwrap().quantity, 5);
        let corrected = store.get(newer.id).await.unwrap().unwrap();
        assert_eq!(corrected.quantity, 8);
        assert_eq!(corrected.reason.as_deref(), Some("recount"));
        assert!(corrected.updated_at.is_some());
    }

    #[tokio::test]
    async fn inventory_count_of_zero_deletes() {
        let svc = service();
        let record = svc.add_record(add("A1", "C1", 5)).await.unwrap();

        let outcome = svc.perform_inventory(count("A1", "C1", 0)).await.unwrap();
        assert_eq!(outcome, InventoryOutcome::Delete);
        assert!(svc.store().get(record.id).await.unwrap().is_none());

        let err = svc.perform_inventory(count("A1", "C1", 3)).await.unwrap_err();
        assert_eq!(err.to_string(), messages::RECORD_NOT_FOUND);
    }

    #[tokio::test]
    async fn minimal_record_can_be_placed() {
        let svc = service();
        let record = svc.add_minimal_record(minimal("A9", "Gadget")).await.unwrap();
        assert_eq!(svc.unplaced().await.unwrap(), vec![record.clone()]);

        let cmd = UpdatePlacement::from_input(&json!({
            "id": record.id.get(), "wr_shk": "C2", "kolvo": 7, "ispolnitel": "Ann"
        }))
        .unwrap();
        let placed = svc.update_placement(cmd).await.unwrap();

        assert_eq!(placed.cell_name.as_deref(), Some("Shelf 2"));
        assert_eq!(placed.executor.as_deref(), Some("Ann"));
        assert!(svc.unplaced().await.unwrap().is_empty());
        assert_eq!(svc.placed().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_into_unknown_cell_leaves_record_unplaced() {
        let svc = service();
        let record = svc.add_minimal_record(minimal("A9", "Gadget")).await.unwrap();

        let cmd = UpdatePlacement::from_input(&json!({
            "id": record.id.get(), "wr_shk": "NOPE", "kolvo": 3
        }))
        .unwrap();
        let err = svc.update_placement(cmd).await.unwrap_err();

        assert!(matches!(err, ServiceError::Domain(DomainError::BusinessRule(_))));
        assert_eq!(err.to_string(), "Warehouse with SHK 'NOPE' not found");
        assert_eq!(svc.unplaced().await.unwrap(), vec![record]);
    }

    #[tokio::test]
    async fn update_of_missing_id_is_not_found() {
        let svc = service();
        let cmd =
            UpdatePlacement::from_input(&json!({ "id": 42, "wr_shk": "C1", "kolvo": 1 })).unwrap();
        let err = svc.update_placement(cmd).await.unwrap_err();
        assert_eq!(err.to_string(), "Record with ID 42 not found");
    }

    #[tokio::test]
    async fn searches_filter_by_cell_and_substring() {
        let svc = service();
        svc.add_record(add("A1", "C1", 1)).await.unwrap();
        svc.add_record(add("B2", "C2", 1)).await.unwrap();

        let in_c1 = svc.search_by_cell(CellSearch::new(Some("C1")).unwrap()).await.unwrap();
        assert_eq!(in_c1.len(), 1);

        let like = LikeSearch::new(Some("shelf 2"), None, None, None).unwrap();
        let found = svc.search_like(like).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].product_barcode, "B2");
    }

    #[tokio::test]
    async fn listing_reports_pagination() {
        let svc = service();
        for i in 0..12 {
            svc.add_record(add(&format!("P{i}"), "C1", 1)).await.unwrap();
        }

        let (items, info) = svc.list_all(PageRequest::new(Some(5), Some(0))).await.unwrap();
        assert_eq!(items.len(), 5);
        assert_eq!(items[0].product_barcode, "P11");
        assert!(info.has_more);

        let (items, info) = svc.list_all(PageRequest::new(Some(5), Some(10))).await.unwrap();
        assert_eq!(items.len(), 2);
        assert!(!info.has_more);
        assert_eq!(info.total, 12);
    }

    /// Store whose conditional writes always lose.
    struct ContendedStore {
        inner: InMemoryRecordStore,
        lookups: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl RecordStore for ContendedStore {
        async fn insert(&self, record: NewRecord) -> Result<InventoryRecord, StoreError> {
            self.inner.insert(record).await
        }
        async fn get(&self, id: RecordId) -> Result<Option<InventoryRecord>, StoreError> {
            self.inner.get(id).await
        }
        async fn find_by_identity(
            &self,
            identity: RecordIdentity<'_>,
            min_quantity: Option<i64>,
            order: LookupOrder,
        ) -> Result<Option<InventoryRecord>, StoreError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.find_by_identity(identity, min_quantity, order).await
        }
        async fn delete(&self, _: RecordId, _: Option<i64>) -> Result<bool, StoreError> {
            Ok(false)
        }
        async fn set_quantity(
            &self,
            _: RecordId,
            _: i64,
            _: i64,
            _: DateTime<Utc>,
        ) -> Result<bool, StoreError> {
            Ok(false)
        }
        async fn apply_correction(
            &self,
            _: RecordId,
            _: &InventoryCorrection,
            _: DateTime<Utc>,
        ) -> Result<bool, StoreError> {
            Ok(false)
        }
        async fn apply_placement(
            &self,
            id: RecordId,
            update: &PlacementUpdate,
            at: DateTime<Utc>,
        ) -> Result<Option<InventoryRecord>, StoreError> {
            self.inner.apply_placement(id, update, at).await
        }
        async fn list(&self, filter: RecordFilter<'_>) -> Result<Vec<InventoryRecord>, StoreError> {
            self.inner.list(filter).await
        }
        async fn page(&self, page: PageRequest) -> Result<Vec<InventoryRecord>, StoreError> {
            self.inner.page(page).await
        }
        async fn count(&self) -> Result<i64, StoreError> {
            self.inner.count().await
        }
    }

    #[tokio::test]
    async fn repeated_lost_races_end_in_conflict() {
        let store = Arc::new(ContendedStore {
            inner: InMemoryRecordStore::new(),
            lookups: AtomicUsize::new(0),
        });
        let svc = InventoryService::new(
            store.clone(),
            InMemoryCellNameResolver::from_pairs([("C1", "Shelf 1")]),
        );
        svc.add_record(add("A1", "C1", 10)).await.unwrap();

        let err = svc.remove_items(remove("A1", "C1", 2)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Conflict(_))));
        assert_eq!(store.lookups.load(Ordering::SeqCst), MAX_ATTEMPTS);

        let err = svc.perform_inventory(count("A1", "C1", 4)).await.unwrap_err();
        assert_eq!(err.to_string(), messages::CONCURRENT_MODIFICATION);
    }

    #[tokio::test]
    async fn store_failures_are_internal() {
        let err: ServiceError = StoreError::Unavailable("down".to_string()).into();
        assert!(err.is_internal());
        let err: ServiceError = DomainError::business("nope").into();
        assert!(!err.is_internal());
    }
}
