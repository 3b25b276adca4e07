use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::handlers::{ListQuery, PaginatedResponse};
use crate::services::orders::{
    CreateOrderRequest, OrderFilters, UpdateOrderRequest, UpdateOrderStatusRequest,
};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route(
            "/orders/:id",
            get(get_order).put(update_order).delete(delete_order),
        )
        .route("/orders/:id/status", put(update_order_status))
}

async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.orders.create(request).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filters): Query<OrderFilters>,
) -> Result<impl IntoResponse, ServiceError> {
    let (orders, total) = state
        .services
        .orders
        .list(query.page, query.limit, filters)
        .await?;
    Ok(Json(PaginatedResponse::new(orders, total, &query)))
}

async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.orders.get(id).await?;
    Ok(Json(order))
}

async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.orders.update(id, request).await?;
    Ok(Json(order))
}

async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateOrderStatusRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.orders.update_status(id, request).await?;
    Ok(Json(order))
}

async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.orders.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
