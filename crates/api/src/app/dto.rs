//! Response DTOs and query parameter shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use x3pl_core::RecordId;
use x3pl_inventory::{InventoryRecord, PageInfo};

/// Record as returned by listings and searches.
#[derive(Debug, Clone, Serialize)]
pub struct ListItem {
    pub shk: String,
    pub name: String,
    pub wr_shk: Option<String>,
    pub wr_name: Option<String>,
    pub kolvo: i64,
    pub condition: Option<String>,
    pub reason: Option<String>,
}

impl From<InventoryRecord> for ListItem {
    fn from(r: InventoryRecord) -> Self {
        Self {
            shk: r.product_barcode,
            name: r.product_name,
            wr_shk: r.cell_barcode,
            wr_name: r.cell_name,
            kolvo: r.quantity,
            condition: r.condition,
            reason: r.reason,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Items<T> {
    pub items: Vec<T>,
}

impl<T> Items<T> {
    pub fn from_records(records: Vec<InventoryRecord>) -> Self
    where
        T: From<InventoryRecord>,
    {
        Self {
            items: records.into_iter().map(T::from).collect(),
        }
    }
}

/// `/all` payload: full records plus the pagination summary.
#[derive(Debug, Clone, Serialize)]
pub struct FullListing {
    pub items: Vec<InventoryRecord>,
    pub pagination: PageInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct MinimalRecordCreated {
    pub id: RecordId,
    pub shk: String,
    pub name: String,
    pub date: DateTime<Utc>,
}

impl From<InventoryRecord> for MinimalRecordCreated {
    fn from(r: InventoryRecord) -> Self {
        Self {
            id: r.id,
            shk: r.product_barcode,
            name: r.product_name,
            date: r.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlacementUpdated {
    pub id: RecordId,
    pub wr_shk: Option<String>,
    pub wr_name: Option<String>,
    pub kolvo: i64,
    pub ispolnitel: Option<String>,
    pub condition: Option<String>,
    pub reason: Option<String>,
    pub date_upd: Option<DateTime<Utc>>,
}

impl From<InventoryRecord> for PlacementUpdated {
    fn from(r: InventoryRecord) -> Self {
        Self {
            id: r.id,
            wr_shk: r.cell_barcode,
            wr_name: r.cell_name,
            kolvo: r.quantity,
            ispolnitel: r.executor,
            condition: r.condition,
            reason: r.reason,
            date_upd: r.updated_at,
        }
    }
}

/// Empty `value` object for mutations without a payload.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Empty {}

#[derive(Debug, Default, Deserialize)]
pub struct CellQuery {
    pub wr_shk: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LikeQuery {
    pub wr_name: Option<String>,
    pub wr_shk: Option<String>,
    pub shk: Option<String>,
    pub name: Option<String>,
}

/// Raw pagination parameters; unparsable values fall back to defaults.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}
