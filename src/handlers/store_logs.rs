use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::{ErrorResponse, ServiceError};
use crate::handlers::{ListQuery, PaginatedResponse};
use crate::services::store_logs::{
    CreateStoreLogRequest, StoreLogFilters, StoreLogResponse, UpdateStoreLogRequest,
    UpdateStoreLogStatusRequest,
};
use crate::stock::InventoryRow;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/store-logs", get(list_store_logs).post(create_store_log))
        .route(
            "/store-logs/:id",
            get(get_store_log).put(update_store_log).delete(delete_store_log),
        )
        .route("/store-logs/:id/status", put(update_store_log_status))
        .route(
            "/store-logs/available-stock/:store_entry_id",
            get(available_stock),
        )
}

/// Wire shape kept for the front end: it reads `stockData` by key.
#[derive(Debug, Serialize, ToSchema)]
pub struct AvailableStockResponse {
    #[serde(rename = "stockData")]
    pub stock_data: Vec<InventoryRow>,
}

/// Record a worker taking or returning material against a store entry.
#[utoipa::path(
    post,
    path = "/api/v1/store-logs",
    request_body = CreateStoreLogRequest,
    responses(
        (status = 201, description = "Store log created", body = StoreLogResponse),
        (status = 400, description = "Unknown item or insufficient stock", body = ErrorResponse),
        (status = 404, description = "Store entry not found", body = ErrorResponse),
    ),
    tag = "store"
)]
pub async fn create_store_log(
    State(state): State<AppState>,
    Json(request): Json<CreateStoreLogRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let log = state.services.store_logs.create(request).await?;
    Ok((StatusCode::CREATED, Json(log)))
}

async fn list_store_logs(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filters): Query<StoreLogFilters>,
) -> Result<impl IntoResponse, ServiceError> {
    let (logs, total) = state
        .services
        .store_logs
        .list(query.page, query.limit, filters)
        .await?;
    Ok(Json(PaginatedResponse::new(logs, total, &query)))
}

async fn get_store_log(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let log = state.services.store_logs.get(id).await?;
    Ok(Json(log))
}

async fn update_store_log(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStoreLogRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let log = state.services.store_logs.update(id, request).await?;
    Ok(Json(log))
}

async fn update_store_log_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStoreLogStatusRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let log = state.services.store_logs.update_status(id, request).await?;
    Ok(Json(log))
}

async fn delete_store_log(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.store_logs.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Current reconciled stock for one store entry.
#[utoipa::path(
    get,
    path = "/api/v1/store-logs/available-stock/{store_entry_id}",
    params(("store_entry_id" = Uuid, Path, description = "Store entry id")),
    responses(
        (status = 200, description = "Reconciled stock per item", body = AvailableStockResponse),
        (status = 404, description = "Store entry not found", body = ErrorResponse),
    ),
    tag = "store"
)]
pub async fn available_stock(
    State(state): State<AppState>,
    Path(store_entry_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let stock_data = state
        .services
        .store_logs
        .available_stock(store_entry_id)
        .await?;
    Ok(Json(AvailableStockResponse { stock_data }))
}
