use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::handlers::{ListQuery, PaginatedResponse, SearchQuery};
use crate::services::buyers::{CreateBuyerRequest, UpdateBuyerRequest};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/buyers", get(list_buyers).post(create_buyer))
        .route(
            "/buyers/:id",
            get(get_buyer).put(update_buyer).delete(delete_buyer),
        )
        .route("/orders/search/buyers", get(search_buyers))
}

async fn create_buyer(
    State(state): State<AppState>,
    Json(request): Json<CreateBuyerRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let buyer = state.services.buyers.create(request).await?;
    Ok((StatusCode::CREATED, Json(buyer)))
}

async fn list_buyers(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let (buyers, total) = state.services.buyers.list(query.page, query.limit).await?;
    Ok(Json(PaginatedResponse::new(buyers, total, &query)))
}

async fn get_buyer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let buyer = state.services.buyers.get(id).await?;
    Ok(Json(buyer))
}

async fn update_buyer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateBuyerRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let buyer = state.services.buyers.update(id, request).await?;
    Ok(Json(buyer))
}

async fn delete_buyer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.buyers.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn search_buyers(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let hits = state.services.buyers.search(&query.q).await?;
    Ok(Json(hits))
}
