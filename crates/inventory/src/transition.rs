//! Record lifecycle decisions.
//!
//! These functions decide *what* happens to a located record; the store
//! carries the decision out. Zero is a terminal quantity for removal and
//! inventory correction: the record is deleted instead of stored empty.

use x3pl_core::{DomainError, DomainResult};

use crate::command::{PerformInventory, RemoveItems};
use crate::messages;
use crate::record::{InventoryCorrection, InventoryRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// The whole stored quantity was taken.
    Delete,
    /// Part of the stored quantity remains.
    Decrement { from: i64, to: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryOutcome {
    Delete,
    Overwrite(InventoryCorrection),
}

/// Decide how a removal affects the located record.
pub fn plan_removal(record: &InventoryRecord, cmd: &RemoveItems) -> DomainResult<RemovalOutcome> {
    if cmd.quantity < 1 || cmd.quantity > record.quantity {
        return Err(DomainError::business(messages::INSUFFICIENT_OR_MISSING));
    }

    if cmd.quantity == record.quantity {
        Ok(RemovalOutcome::Delete)
    } else {
        Ok(RemovalOutcome::Decrement {
            from: record.quantity,
            to: record.quantity - cmd.quantity,
        })
    }
}

/// Decide how an inventory count affects the located record.
pub fn plan_inventory(cmd: &PerformInventory) -> InventoryOutcome {
    if cmd.quantity == 0 {
        InventoryOutcome::Delete
    } else {
        InventoryOutcome::Overwrite(InventoryCorrection {
            quantity: cmd.quantity,
            condition: cmd.condition.clone(),
            reason: cmd.reason.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;
    use x3pl_core::RecordId;

    fn stored(quantity: i64) -> InventoryRecord {
        InventoryRecord {
            id: RecordId::new(7),
            product_barcode: "A1".to_string(),
            product_name: "Widget".to_string(),
            cell_barcode: Some("C1".to_string()),
            cell_name: Some("Shelf 1".to_string()),
            quantity,
            condition: Some("Good".to_string()),
            reason: None,
            executor: Some("Bob".to_string()),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn removal(quantity: i64) -> RemoveItems {
        RemoveItems {
            product_barcode: "A1".to_string(),
            cell_barcode: "C1".to_string(),
            condition: "Good".to_string(),
            quantity,
        }
    }

    fn count(quantity: i64) -> PerformInventory {
        PerformInventory {
            product_barcode: "A1".to_string(),
            cell_barcode: "C1".to_string(),
            condition: "Good".to_string(),
            quantity,
            reason: Some("recount".to_string()),
        }
    }

    #[test]
    fn removing_everything_deletes() {
        assert_eq!(plan_removal(&stored(10), &removal(10)).unwrap(), RemovalOutcome::Delete);
    }

    #[test]
    fn removing_part_decrements() {
        assert_eq!(
            plan_removal(&stored(10), &removal(4)).unwrap(),
            RemovalOutcome::Decrement { from: 10, to: 6 }
        );
    }

    #[test]
    fn removing_more_than_stored_is_rejected() {
        let err = plan_removal(&stored(3), &removal(4)).unwrap_err();
        assert_eq!(err.to_string(), messages::INSUFFICIENT_OR_MISSING);
    }

    #[test]
    fn counting_zero_deletes() {
        assert_eq!(plan_inventory(&count(0)), InventoryOutcome::Delete);
    }

    #[test]
    fn counting_positive_overwrites_quantity_condition_and_reason() {
        assert_eq!(
            plan_inventory(&count(8)),
            InventoryOutcome::Overwrite(InventoryCorrection {
                quantity: 8,
                condition: "Good".to_string(),
                reason: Some("recount".to_string()),
            })
        );
    }

    proptest! {
        /// Property: a planned removal never leaves a zero or negative row behind.
        #[test]
        fn removal_never_goes_negative(stock in 1i64..10_000, requested in 1i64..10_000) {
            match plan_removal(&stored(stock), &removal(requested)) {
                Ok(RemovalOutcome::Delete) => prop_assert_eq!(stock, requested),
                Ok(RemovalOutcome::Decrement { from, to }) => {
                    prop_assert_eq!(from, stock);
                    prop_assert!(to > 0);
                    prop_assert_eq!(to, stock - requested);
                }
                Err(_) => prop_assert!(requested > stock),
            }
        }
    }
}
