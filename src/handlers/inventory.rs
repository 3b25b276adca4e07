use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::errors::{ErrorResponse, ServiceError};
use crate::services::inventory::InventoryFilters;
use crate::stock::InventoryRow;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/inventory", get(list_inventory))
        .route("/inventory/low-stock", get(low_stock))
}

/// Warehouse-wide reconciled inventory, one row per (entry, item) pair.
#[utoipa::path(
    get,
    path = "/api/v1/inventory",
    params(("status" = Option<String>, Query, description = "available, low or out_of_stock")),
    responses(
        (status = 200, description = "Reconciled inventory", body = [InventoryRow]),
        (status = 400, description = "Unknown status filter", body = ErrorResponse),
    ),
    tag = "store"
)]
pub async fn list_inventory(
    State(state): State<AppState>,
    Query(filters): Query<InventoryFilters>,
) -> Result<impl IntoResponse, ServiceError> {
    let rows = state.services.inventory.list(filters).await?;
    Ok(Json(rows))
}

/// Rows flagged low or out of stock, for the reorder report.
async fn low_stock(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let rows = state.services.inventory.low_stock().await?;
    Ok(Json(rows))
}
