//! User-facing messages.
//!
//! Downstream clients match on these strings; change them only together with
//! the clients.

pub const INSUFFICIENT_OR_MISSING: &str = "Недостаточное количество или запись не найдена";
pub const RECORD_NOT_FOUND: &str = "Запись не найдена";
pub const CELL_PARAM_REQUIRED: &str = "Параметр wr_shk обязателен";
pub const SEARCH_PARAM_REQUIRED: &str =
    "Необходимо указать хотя бы один параметр поиска (wr_name, wr_shk, shk, name)";
pub const CONCURRENT_MODIFICATION: &str = "Record was modified concurrently, please retry";

pub fn cell_not_found(cell_barcode: &str) -> String {
    format!("Warehouse with SHK '{cell_barcode}' not found")
}

pub fn record_id_not_found(id: impl core::fmt::Display) -> String {
    format!("Record with ID {id} not found")
}
