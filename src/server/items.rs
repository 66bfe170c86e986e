use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    routing::{get, post},
};
use serde_json::{Value, json};

use super::AppState;
use super::error::{ApiError, ApiResult};
use crate::store::Item;

async fn create_item(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Item>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(item) = body?;
    let item = state.items.create(item).await?;
    Ok(Json(json!({ "created": true, "item": item })))
}

async fn get_item(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Item>> {
    let Path(id) = id?;
    state
        .items
        .get(id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Item not found".to_string()))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/items", post(create_item))
        .route("/items/{item_id}", get(get_item))
}
