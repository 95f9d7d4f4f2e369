use axum::{
    Router,
    routing::{get, post, put},
};

pub mod inventory;
pub mod system;

/// Router for the inventory endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/add", post(inventory::add_record))
        .route("/add-minimal", post(inventory::add_minimal_record))
        .route("/update", put(inventory::update_placement))
        .route("/snyatie", post(inventory::remove_items))
        .route("/inventory", post(inventory::perform_inventory))
        .route("/razmeshennye", get(inventory::placed))
        .route("/nerazmeshennye", get(inventory::unplaced))
        .route("/search", get(inventory::search_by_cell))
        .route("/search-like", get(inventory::search_like))
        .route("/all", get(inventory::list_all))
}
