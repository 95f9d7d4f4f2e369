use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use x3pl_core::RecordId;

/// One quantity-bearing row: a product in a cell, in some condition.
///
/// Field names on the wire follow the warehouse terminal protocol
/// (`shk`, `wr_shk`, `kolvo`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub id: RecordId,
    #[serde(rename = "shk")]
    pub product_barcode: String,
    #[serde(rename = "name")]
    pub product_name: String,
    #[serde(rename = "wr_shk")]
    pub cell_barcode: Option<String>,
    #[serde(rename = "wr_name")]
    pub cell_name: Option<String>,
    #[serde(rename = "kolvo")]
    pub quantity: i64,
    pub condition: Option<String>,
    pub reason: Option<String>,
    #[serde(rename = "ispolnitel")]
    pub executor: Option<String>,
    #[serde(rename = "date")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "date_upd")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl InventoryRecord {
    /// Derived placement state; `None` when the record is in neither state.
    pub fn placement(&self) -> Option<Placement> {
        Placement::classify(
            self.quantity,
            self.cell_barcode.as_deref(),
            self.cell_name.as_deref(),
        )
    }

    pub fn is_placed(&self) -> bool {
        self.placement() == Some(Placement::Placed)
    }

    pub fn is_unplaced(&self) -> bool {
        self.placement() == Some(Placement::Unplaced)
    }
}

/// A record as handed to the store for insertion (no id yet).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub product_barcode: String,
    pub product_name: String,
    pub cell_barcode: Option<String>,
    pub cell_name: Option<String>,
    pub quantity: i64,
    pub condition: Option<String>,
    pub reason: Option<String>,
    pub executor: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewRecord {
    pub fn into_record(self, id: RecordId) -> InventoryRecord {
        InventoryRecord {
            id,
            product_barcode: self.product_barcode,
            product_name: self.product_name,
            cell_barcode: self.cell_barcode,
            cell_name: self.cell_name,
            quantity: self.quantity,
            condition: self.condition,
            reason: self.reason,
            executor: self.executor,
            created_at: self.created_at,
            updated_at: None,
        }
    }
}

/// Placement state derived from quantity and cell fields.
///
/// This is a view over stored data, never persisted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Placement {
    /// Positive quantity in a known cell.
    Placed,
    /// Zero quantity, no cell assigned.
    Unplaced,
}

impl Placement {
    pub fn classify(
        quantity: i64,
        cell_barcode: Option<&str>,
        cell_name: Option<&str>,
    ) -> Option<Self> {
        let has_barcode = cell_barcode.is_some_and(|s| !s.is_empty());
        let has_name = cell_name.is_some_and(|s| !s.is_empty());

        if quantity > 0 && has_barcode && has_name {
            Some(Self::Placed)
        } else if quantity == 0 && !has_barcode && !has_name {
            Some(Self::Unplaced)
        } else {
            None
        }
    }
}

/// Fields that locate a record for removal and inventory correction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RecordIdentity<'a> {
    pub product_barcode: &'a str,
    pub cell_barcode: &'a str,
    pub condition: &'a str,
}

impl RecordIdentity<'_> {
    pub fn matches(&self, record: &InventoryRecord) -> bool {
        record.product_barcode == self.product_barcode
            && record.cell_barcode.as_deref() == Some(self.cell_barcode)
            && record.condition.as_deref() == Some(self.condition)
    }
}

/// Overwrite applied by an inventory correction with a positive quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryCorrection {
    pub quantity: i64,
    pub condition: String,
    pub reason: Option<String>,
}

/// Overwrite applied when a record is assigned to a cell.
///
/// `None` optional fields leave the stored value untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementUpdate {
    pub cell_barcode: String,
    pub cell_name: String,
    pub quantity: i64,
    pub executor: Option<String>,
    pub condition: Option<String>,
    pub reason: Option<String>,
}

impl PlacementUpdate {
    pub fn apply(&self, record: &mut InventoryRecord, at: DateTime<Utc>) {
        record.cell_barcode = Some(self.cell_barcode.clone());
        record.cell_name = Some(self.cell_name.clone());
        record.quantity = self.quantity;
        if let Some(executor) = &self.executor {
            record.executor = Some(executor.clone());
        }
        if let Some(condition) = &self.condition {
            record.condition = Some(condition.clone());
        }
        if let Some(reason) = &self.reason {
            record.reason = Some(reason.clone());
        }
        record.updated_at = Some(at);
    }
}
