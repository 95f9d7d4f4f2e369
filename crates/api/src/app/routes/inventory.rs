use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Extension, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    response::Response,
};
use serde_json::Value;

use x3pl_infra::ServiceError;
use x3pl_inventory::validation::parse_query_integer;
use x3pl_inventory::{
    AddMinimalRecord, AddRecord, CellSearch, LikeSearch, PageRequest, PerformInventory,
    RemoveItems, UpdatePlacement,
};

use crate::app::dto::{
    self, Empty, FullListing, Items, ListItem, MinimalRecordCreated, PlacementUpdated,
};
use crate::app::errors;
use crate::app::services::AppServices;

type Body = Result<Json<Value>, JsonRejection>;

fn respond<T>(result: Result<T, ServiceError>, to_value: impl FnOnce(T) -> Response) -> Response {
    match result {
        Ok(v) => to_value(v),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn add_record(
    Extension(services): Extension<Arc<AppServices>>,
    body: Body,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };
    let result = match AddRecord::from_input(&body) {
        Ok(cmd) => services.add_record(cmd).await,
        Err(e) => Err(e.into()),
    };
    respond(result, |_| errors::success(Empty {}))
}

pub async fn add_minimal_record(
    Extension(services): Extension<Arc<AppServices>>,
    body: Body,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };
    let result = match AddMinimalRecord::from_input(&body) {
        Ok(cmd) => services.add_minimal_record(cmd).await,
        Err(e) => Err(e.into()),
    };
    respond(result, |record| errors::success(MinimalRecordCreated::from(record)))
}

pub async fn update_placement(
    Extension(services): Extension<Arc<AppServices>>,
    body: Body,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };
    let result = match UpdatePlacement::from_input(&body) {
        Ok(cmd) => services.update_placement(cmd).await,
        Err(e) => Err(e.into()),
    };
    respond(result, |record| errors::success(PlacementUpdated::from(record)))
}

pub async fn remove_items(
    Extension(services): Extension<Arc<AppServices>>,
    body: Body,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };
    let result = match RemoveItems::from_input(&body) {
        Ok(cmd) => services.remove_items(cmd).await,
        Err(e) => Err(e.into()),
    };
    respond(result, |_| errors::success(Empty {}))
}

pub async fn perform_inventory(
    Extension(services): Extension<Arc<AppServices>>,
    body: Body,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };
    let result = match PerformInventory::from_input(&body) {
        Ok(cmd) => services.perform_inventory(cmd).await,
        Err(e) => Err(e.into()),
    };
    respond(result, |_| errors::success(Empty {}))
}

pub async fn placed(Extension(services): Extension<Arc<AppServices>>) -> Response {
    respond(services.placed().await, |records| {
        errors::success(Items::<ListItem>::from_records(records))
    })
}

pub async fn unplaced(Extension(services): Extension<Arc<AppServices>>) -> Response {
    respond(services.unplaced().await, |records| {
        errors::success(Items::<ListItem>::from_records(records))
    })
}

pub async fn search_by_cell(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::CellQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return errors::query_rejection_to_response(e),
    };
    let result = match CellSearch::new(query.wr_shk.as_deref()) {
        Ok(search) => services.search_by_cell(search).await,
        Err(e) => Err(e.into()),
    };
    respond(result, |records| errors::success(Items::<ListItem>::from_records(records)))
}

pub async fn search_like(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::LikeQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return errors::query_rejection_to_response(e),
    };
    let search = LikeSearch::new(
        query.wr_name.as_deref(),
        query.wr_shk.as_deref(),
        query.shk.as_deref(),
        query.name.as_deref(),
    );
    let result = match search {
        Ok(search) => services.search_like(search).await,
        Err(e) => Err(e.into()),
    };
    respond(result, |records| errors::success(Items::<ListItem>::from_records(records)))
}

pub async fn list_all(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::PageQuery>, QueryRejection>,
) -> Response {
    let query = query.map(|Query(q)| q).unwrap_or_default();
    let page = PageRequest::new(
        parse_query_integer(query.limit.as_deref()),
        parse_query_integer(query.offset.as_deref()),
    );

    respond(services.list_all(page).await, |(items, pagination)| {
        errors::success(FullListing { items, pagination })
    })
}
