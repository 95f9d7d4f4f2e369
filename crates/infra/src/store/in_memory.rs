use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use x3pl_core::RecordId;
use x3pl_inventory::{
    InventoryCorrection, InventoryRecord, NewRecord, PageRequest, PlacementUpdate, RecordIdentity,
};

use super::r#trait::{LookupOrder, RecordFilter, RecordStore, StoreError};

/// In-memory record store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    records: BTreeMap<RecordId, InventoryRecord>,
    last_id: i64,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("record store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable("record store lock poisoned".to_string()))
    }
}

fn oldest_first(a: &InventoryRecord, b: &InventoryRecord) -> Ordering {
    a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id))
}

fn newest_first(a: &InventoryRecord, b: &InventoryRecord) -> Ordering {
    oldest_first(b, a)
}

#[async_trait::async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert(&self, record: NewRecord) -> Result<InventoryRecord, StoreError> {
        let mut inner = self.write()?;
        inner.last_id += 1;
        let id = RecordId::new(inner.last_id);
        let record = record.into_record(id);
        inner.records.insert(id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: RecordId) -> Result<Option<InventoryRecord>, StoreError> {
        Ok(self.read()?.records.get(&id).cloned())
    }

    async fn find_by_identity(
        &self,
        identity: RecordIdentity<'_>,
        min_quantity: Option<i64>,
        order: LookupOrder,
    ) -> Result<Option<InventoryRecord>, StoreError> {
        let inner = self.read()?;
        let candidates = inner
            .records
            .values()
            .filter(|r| identity.matches(r))
            .filter(|r| min_quantity.is_none_or(|min| r.quantity >= min));

        let found = match order {
            LookupOrder::OldestFirst => candidates.min_by(|a, b| oldest_first(a, b)),
            LookupOrder::NewestFirst => candidates.min_by(|a, b| newest_first(a, b)),
        };
        Ok(found.cloned())
    }

    async fn delete(
        &self,
        id: RecordId,
        expected_quantity: Option<i64>,
    ) -> Result<bool, StoreError> {
        let mut inner = self.write()?;
        let current = match inner.records.get(&id) {
            Some(r) => r.quantity,
            None => return Ok(false),
        };
        if expected_quantity.is_some_and(|q| q != current) {
            return Ok(false);
        }
        inner.records.remove(&id);
        Ok(true)
    }

    async fn set_quantity(
        &self,
        id: RecordId,
        expected_quantity: i64,
        new_quantity: i64,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut inner = self.write()?;
        match inner.records.get_mut(&id) {
            Some(r) if r.quantity == expected_quantity => {
                r.quantity = new_quantity;
                r.updated_at = Some(at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn apply_correction(
        &self,
        id: RecordId,
        correction: &InventoryCorrection,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut inner = self.write()?;
        let Some(r) = inner.records.get_mut(&id) else {
            return Ok(false);
        };
        r.quantity = correction.quantity;
        r.condition = Some(correction.condition.clone());
        r.reason = correction.reason.clone();
        r.updated_at = Some(at);
        Ok(true)
    }

    async fn apply_placement(
        &self,
        id: RecordId,
        update: &PlacementUpdate,
        at: DateTime<Utc>,
    ) -> Result<Option<InventoryRecord>, StoreError> {
        let mut inner = self.write()?;
        Ok(inner.records.get_mut(&id).map(|r| {
            update.apply(r, at);
            r.clone()
        }))
    }

    async fn list(&self, filter: RecordFilter<'_>) -> Result<Vec<InventoryRecord>, StoreError> {
        let inner = self.read()?;
        let mut out: Vec<InventoryRecord> = inner
            .records
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        out.sort_by(newest_first);
        Ok(out)
    }

    async fn page(&self, page: PageRequest) -> Result<Vec<InventoryRecord>, StoreError> {
        let inner = self.read()?;
        let mut all: Vec<&InventoryRecord> = inner.records.values().collect();
        all.sort_by(|a, b| newest_first(a, b));
        Ok(all
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<i64, StoreError> {
        Ok(self.read()?.records.len() as i64)
    }
}
