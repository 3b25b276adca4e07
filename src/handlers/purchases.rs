use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::handlers::{ListQuery, PaginatedResponse, SearchQuery};
use crate::services::purchases::{CreatePurchaseRequest, PurchaseFilters, UpdatePurchaseRequest};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/purchases", get(list_purchases).post(create_purchase))
        .route(
            "/purchases/:id",
            get(get_purchase).put(update_purchase).delete(delete_purchase),
        )
        .route("/purchases/:id/partial", patch(mark_partial))
        .route("/purchases/:id/complete", patch(mark_completed))
        .route("/purchases/search/suppliers", get(search_suppliers))
}

async fn create_purchase(
    State(state): State<AppState>,
    Json(request): Json<CreatePurchaseRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let purchase = state.services.purchases.create(request).await?;
    Ok((StatusCode::CREATED, Json(purchase)))
}

async fn list_purchases(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filters): Query<PurchaseFilters>,
) -> Result<impl IntoResponse, ServiceError> {
    let (purchases, total) = state
        .services
        .purchases
        .list(query.page, query.limit, filters)
        .await?;
    Ok(Json(PaginatedResponse::new(purchases, total, &query)))
}

async fn get_purchase(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let purchase = state.services.purchases.get(id).await?;
    Ok(Json(purchase))
}

async fn update_purchase(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePurchaseRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let purchase = state.services.purchases.update(id, request).await?;
    Ok(Json(purchase))
}

/// Marks a purchase partially received.
async fn mark_partial(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let purchase = state.services.purchases.mark_partial(id).await?;
    Ok(Json(purchase))
}

/// Marks a purchase fully received; it then shows up as a pending
/// store entry until the warehouse records one.
async fn mark_completed(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let purchase = state.services.purchases.mark_completed(id).await?;
    Ok(Json(purchase))
}

async fn delete_purchase(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.purchases.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn search_suppliers(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let hits = state.services.purchases.search_suppliers(&query.q).await?;
    Ok(Json(hits))
}
