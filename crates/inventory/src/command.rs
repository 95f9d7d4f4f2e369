//! Validated inputs for every inventory operation.
//!
//! Each command is built from a raw request through `from_input`, which runs
//! coercion and validation and fails with the complete list of violations.

use serde::Serialize;
use serde_json::Value;

use x3pl_core::{DomainError, DomainResult, RecordId};

use crate::messages;
use crate::record::{InventoryRecord, RecordIdentity};
use crate::validation::{Input, Violations};

const POSITIVE_QUANTITY: &str = "kolvo is required and must be a positive number";
const NON_NEGATIVE_QUANTITY: &str = "kolvo is required and must be a non-negative number";
const POSITIVE_ID: &str = "id is required and must be a positive number";

/// Command: put a quantity of a product into a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddRecord {
    pub product_barcode: String,
    pub product_name: String,
    pub cell_barcode: String,
    pub quantity: i64,
    pub condition: String,
    pub reason: Option<String>,
    pub executor: String,
}

impl AddRecord {
    pub fn from_input(body: &Value) -> DomainResult<Self> {
        let input = Input::new(body);
        let mut v = Violations::new();

        let product_barcode = input.required_string("shk", &mut v);
        let product_name = input.required_string("name", &mut v);
        let cell_barcode = input.required_string("wr_shk", &mut v);
        let quantity = input.required_integer("kolvo", 1, POSITIVE_QUANTITY, &mut v);
        let condition = input.required_string("condition", &mut v);
        let executor = input.required_string("ispolnitel", &mut v);
        let reason = input.optional_note("reason");

        v.finish(|| {
            Some(Self {
                product_barcode: product_barcode?,
                product_name: product_name?,
                cell_barcode: cell_barcode?,
                quantity: quantity?,
                condition: condition?,
                reason,
                executor: executor?,
            })
        })
    }
}

/// Command: register a product that has not been shelved yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddMinimalRecord {
    pub product_barcode: String,
    pub product_name: String,
}

impl AddMinimalRecord {
    pub fn from_input(body: &Value) -> DomainResult<Self> {
        let input = Input::new(body);
        let mut v = Violations::new();

        let product_barcode = input.required_string("shk", &mut v);
        let product_name = input.required_string("name", &mut v);

        v.finish(|| {
            Some(Self {
                product_barcode: product_barcode?,
                product_name: product_name?,
            })
        })
    }
}

/// Command: take a quantity out of a cell (snyatie).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveItems {
    pub product_barcode: String,
    pub cell_barcode: String,
    pub condition: String,
    pub quantity: i64,
}

impl RemoveItems {
    pub fn from_input(body: &Value) -> DomainResult<Self> {
        let input = Input::new(body);
        let mut v = Violations::new();

        let product_barcode = input.required_string("shk", &mut v);
        let cell_barcode = input.required_string("wr_shk", &mut v);
        let condition = input.required_string("condition", &mut v);
        let quantity = input.required_integer("kolvo", 1, POSITIVE_QUANTITY, &mut v);

        v.finish(|| {
            Some(Self {
                product_barcode: product_barcode?,
                cell_barcode: cell_barcode?,
                condition: condition?,
                quantity: quantity?,
            })
        })
    }

    pub fn identity(&self) -> RecordIdentity<'_> {
        RecordIdentity {
            product_barcode: &self.product_barcode,
            cell_barcode: &self.cell_barcode,
            condition: &self.condition,
        }
    }
}

/// Command: set the counted quantity of a record (inventory correction).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerformInventory {
    pub product_barcode: String,
    pub cell_barcode: String,
    pub condition: String,
    /// Absolute quantity; `0` deletes the record.
    pub quantity: i64,
    pub reason: Option<String>,
}

impl PerformInventory {
    pub fn from_input(body: &Value) -> DomainResult<Self> {
        let input = Input::new(body);
        let mut v = Violations::new();

        let product_barcode = input.required_string("shk", &mut v);
        let cell_barcode = input.required_string("wr_shk", &mut v);
        let condition = input.required_string("condition", &mut v);
        let quantity = input.required_integer("kolvo", 0, NON_NEGATIVE_QUANTITY, &mut v);
        let reason = input.optional_note("reason");

        v.finish(|| {
            Some(Self {
                product_barcode: product_barcode?,
                cell_barcode: cell_barcode?,
                condition: condition?,
                quantity: quantity?,
                reason,
            })
        })
    }

    pub fn identity(&self) -> RecordIdentity<'_> {
        RecordIdentity {
            product_barcode: &self.product_barcode,
            cell_barcode: &self.cell_barcode,
            condition: &self.condition,
        }
    }
}

/// Command: assign a record to a cell with a quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePlacement {
    pub id: RecordId,
    pub cell_barcode: String,
    pub quantity: i64,
    pub executor: Option<String>,
    pub condition: Option<String>,
    pub reason: Option<String>,
}

impl UpdatePlacement {
    pub fn from_input(body: &Value) -> DomainResult<Self> {
        let input = Input::new(body);
        let mut v = Violations::new();

        let id = input.required_integer("id", 1, POSITIVE_ID, &mut v);
        let cell_barcode = input.required_string("wr_shk", &mut v);
        let quantity = input.required_integer("kolvo", 0, NON_NEGATIVE_QUANTITY, &mut v);
        let executor = input.optional_string("ispolnitel", &mut v);
        let condition = input.optional_string("condition", &mut v);
        let reason = input.optional_string("reason", &mut v);

        v.finish(|| {
            Some(Self {
                id: RecordId::new(id?),
                cell_barcode: cell_barcode?,
                quantity: quantity?,
                executor,
                condition,
                reason,
            })
        })
    }
}

/// Query: records in exactly this cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellSearch {
    pub cell_barcode: String,
}

impl CellSearch {
    pub fn new(cell_barcode: Option<&str>) -> DomainResult<Self> {
        match cell_barcode.map(str::trim).filter(|s| !s.is_empty()) {
            Some(cell) => Ok(Self {
                cell_barcode: cell.to_string(),
            }),
            None => Err(DomainError::business(messages::CELL_PARAM_REQUIRED)),
        }
    }
}

/// Query: case-insensitive substring match, OR-combined across fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LikeSearch {
    pub cell_name: Option<String>,
    pub cell_barcode: Option<String>,
    pub product_barcode: Option<String>,
    pub product_name: Option<String>,
}

impl LikeSearch {
    pub fn new(
        cell_name: Option<&str>,
        cell_barcode: Option<&str>,
        product_barcode: Option<&str>,
        product_name: Option<&str>,
    ) -> DomainResult<Self> {
        fn clean(raw: Option<&str>) -> Option<String> {
            raw.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
        }

        let search = Self {
            cell_name: clean(cell_name),
            cell_barcode: clean(cell_barcode),
            product_barcode: clean(product_barcode),
            product_name: clean(product_name),
        };

        if search.is_empty() {
            return Err(DomainError::business(messages::SEARCH_PARAM_REQUIRED));
        }
        Ok(search)
    }

    pub fn is_empty(&self) -> bool {
        self.cell_name.is_none()
            && self.cell_barcode.is_none()
            && self.product_barcode.is_none()
            && self.product_name.is_none()
    }

    /// True when any supplied needle is contained in its field.
    pub fn matches(&self, record: &InventoryRecord) -> bool {
        fn contains(haystack: Option<&str>, needle: &Option<String>) -> bool {
            match (haystack, needle) {
                (Some(h), Some(n)) => h.to_lowercase().contains(&n.to_lowercase()),
                _ => false,
            }
        }

        contains(record.cell_name.as_deref(), &self.cell_name)
            || contains(record.cell_barcode.as_deref(), &self.cell_barcode)
            || contains(Some(&record.product_barcode), &self.product_barcode)
            || contains(Some(&record.product_name), &self.product_name)
    }
}

/// Window over the full listing, clamped to safe bounds.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: i64,
    pub offset: i64,
}

impl PageRequest {
    pub const DEFAULT_LIMIT: i64 = 1000;
    pub const MAX_LIMIT: i64 = 10_000;

    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        let limit = match limit {
            Some(l) if l >= 1 => l.min(Self::MAX_LIMIT),
            _ => Self::DEFAULT_LIMIT,
        };
        Self {
            limit,
            offset: offset.unwrap_or(0).max(0),
        }
    }

    pub fn info(&self, total: i64) -> PageInfo {
        PageInfo {
            total,
            limit: self.limit,
            offset: self.offset,
            has_more: self.offset.saturating_add(self.limit) < total,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Pagination summary returned with a page.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    #[serde(rename = "hasMore")]
    pub has_more: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn add_accepts_string_quantity_and_optional_reason() {
        let cmd = AddRecord::from_input(&json!({
            "shk": "A1", "name": "Widget", "wr_shk": "C1", "kolvo": "10",
            "condition": "Good", "ispolnitel": "Bob"
        }))
        .unwrap();
        assert_eq!(cmd.quantity, 10);
        assert_eq!(cmd.reason, None);
    }

    #[test]
    fn add_reports_every_missing_field_in_order() {
        let err = AddRecord::from_input(&json!({ "kolvo": 0 })).unwrap_err();
        assert_eq!(
            err.violations(),
            &[
                "shk is required and must be a non-empty string",
                "name is required and must be a non-empty string",
                "wr_shk is required and must be a non-empty string",
                "kolvo is required and must be a positive number",
                "condition is required and must be a non-empty string",
                "ispolnitel is required and must be a non-empty string",
            ]
        );
    }

    #[test]
    fn minimal_add_needs_only_barcode_and_name() {
        let cmd = AddMinimalRecord::from_input(&json!({ "shk": "A1", "name": "Widget" })).unwrap();
        assert_eq!(cmd.product_barcode, "A1");
        assert!(AddMinimalRecord::from_input(&json!({ "shk": "A1" })).is_err());
    }

    #[test]
    fn removal_requires_at_least_one_unit() {
        let err = RemoveItems::from_input(&json!({
            "shk": "A1", "wr_shk": "C1", "condition": "Good", "kolvo": 0
        }))
        .unwrap_err();
        assert_eq!(err.violations(), &["kolvo is required and must be a positive number"]);
    }

    #[test]
    fn inventory_accepts_zero_quantity() {
        let cmd = PerformInventory::from_input(&json!({
            "shk": "A1", "wr_shk": "C1", "condition": "Good", "kolvo": "0"
        }))
        .unwrap();
        assert_eq!(cmd.quantity, 0);

        let err = PerformInventory::from_input(&json!({
            "shk": "A1", "wr_shk": "C1", "condition": "Good", "kolvo": -1
        }))
        .unwrap_err();
        assert_eq!(err.violations(), &["kolvo is required and must be a non-negative number"]);
    }

    #[test]
    fn update_rejects_blank_optional_fields() {
        let err = UpdatePlacement::from_input(&json!({
            "id": 0, "wr_shk": "C1", "kolvo": 1, "ispolnitel": " "
        }))
        .unwrap_err();
        assert_eq!(
            err.violations(),
            &[
                "id is required and must be a positive number",
                "ispolnitel must be a non-empty string if provided",
            ]
        );
    }

    #[test]
    fn cell_search_requires_a_value() {
        assert!(CellSearch::new(None).is_err());
        assert!(CellSearch::new(Some("   ")).is_err());
        assert_eq!(CellSearch::new(Some(" C1 ")).unwrap().cell_barcode, "C1");
    }

    #[test]
    fn like_search_requires_one_parameter() {
        let err = LikeSearch::new(None, Some(""), None, Some("  ")).unwrap_err();
        assert_eq!(err.to_string(), messages::SEARCH_PARAM_REQUIRED);
    }

    #[test]
    fn like_search_is_case_insensitive_and_or_combined() {
        let search = LikeSearch::new(None, None, None, Some("widg")).unwrap();
        let record = InventoryRecord {
            id: RecordId::new(1),
            product_barcode: "A1".to_string(),
            product_name: "Blue WIDGET".to_string(),
            cell_barcode: None,
            cell_name: None,
            quantity: 0,
            condition: None,
            reason: None,
            executor: None,
            created_at: Utc::now(),
            updated_at: None,
        };
        assert!(search.matches(&record));

        let other = LikeSearch::new(Some("shelf"), None, Some("zz"), None).unwrap();
        assert!(!other.matches(&record));
    }

    #[test]
    fn page_limit_is_clamped() {
        assert_eq!(PageRequest::new(Some(50_000), None).limit, 10_000);
        assert_eq!(PageRequest::new(None, None).limit, 1000);
        assert_eq!(PageRequest::new(Some(0), Some(-3)), PageRequest { limit: 1000, offset: 0 });
    }

    #[test]
    fn page_info_reports_more_pages() {
        assert!(PageRequest::new(Some(5), Some(0)).info(12).has_more);
        assert!(!PageRequest::new(Some(5), Some(10)).info(12).has_more);
    }

    #[test]
    fn huge_offset_reports_no_more_pages() {
        let info = PageRequest::new(None, Some(i64::MAX)).info(12);
        assert_eq!(info.offset, i64::MAX);
        assert!(!info.has_more);
    }

    #[test]
    fn page_info_uses_wire_names() {
        let info = PageRequest::new(Some(2), Some(4)).info(9);
        assert_eq!(
            serde_json::to_value(info).unwrap(),
            json!({ "total": 9, "limit": 2, "offset": 4, "hasMore": true })
        );
    }

    proptest! {
        #[test]
        fn has_more_matches_window_end(
            limit in 1i64..20_000,
            offset in 0i64..=i64::MAX,
            total in 0i64..40_000,
        ) {
            let page = PageRequest::new(Some(limit), Some(offset));
            prop_assert!(page.limit <= PageRequest::MAX_LIMIT);
            let window_end = i128::from(page.offset) + i128::from(page.limit);
            prop_assert_eq!(page.info(total).has_more, window_end < i128::from(total));
        }
    }
}
