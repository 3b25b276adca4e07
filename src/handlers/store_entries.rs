use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::errors::{ErrorResponse, ServiceError};
use crate::services::store_entries::{
    CreateStoreEntryRequest, StoreEntryListRow, StoreEntryResponse, UpdateStoreEntryRequest,
};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/store-entries", get(list_store_entries).post(create_store_entry))
        .route("/store-entries/pending-purchases", get(pending_purchases))
        .route("/store-entries/:id", get(get_store_entry).put(update_store_entry))
}

/// Record what was physically received against a completed purchase.
#[utoipa::path(
    post,
    path = "/api/v1/store-entries",
    request_body = CreateStoreEntryRequest,
    responses(
        (status = 201, description = "Store entry created", body = StoreEntryResponse),
        (status = 400, description = "Purchase not completed or bad quantities", body = ErrorResponse),
        (status = 404, description = "Purchase not found", body = ErrorResponse),
        (status = 409, description = "Purchase already has a store entry", body = ErrorResponse),
    ),
    tag = "store"
)]
pub async fn create_store_entry(
    State(state): State<AppState>,
    Json(request): Json<CreateStoreEntryRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let entry = state.services.store_entries.create(request).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Persisted entries plus a synthetic pending row per completed purchase
/// that has not been received yet.
#[utoipa::path(
    get,
    path = "/api/v1/store-entries",
    responses(
        (status = 200, description = "Store entry listing", body = [StoreEntryListRow]),
    ),
    tag = "store"
)]
pub async fn list_store_entries(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let rows = state.services.store_entries.list().await?;
    Ok(Json(rows))
}

/// Completed purchases still waiting for a store entry.
async fn pending_purchases(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let purchases = state.services.store_entries.pending_purchases().await?;
    Ok(Json(purchases))
}

async fn get_store_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let entry = state.services.store_entries.get(id).await?;
    Ok(Json(entry))
}

async fn update_store_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStoreEntryRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let entry = state.services.store_entries.update(id, request).await?;
    Ok(Json(entry))
}
