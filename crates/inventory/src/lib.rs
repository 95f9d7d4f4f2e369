//! Inventory domain module.
//!
//! This crate contains the business rules for warehouse cell inventory,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no
//! storage): the record entity, the placed/unplaced classifier, input
//! validation, and the state transitions for removal and inventory
//! correction.

pub mod command;
pub mod messages;
pub mod record;
pub mod transition;
pub mod validation;

pub use command::{
    AddMinimalRecord, AddRecord, CellSearch, LikeSearch, PageInfo, PageRequest, PerformInventory,
    RemoveItems, UpdatePlacement,
};
pub use record::{
    InventoryCorrection, InventoryRecord, NewRecord, Placement, PlacementUpdate, RecordIdentity,
};
pub use transition::{InventoryOutcome, RemovalOutcome, plan_inventory, plan_removal};
pub use validation::Violations;
