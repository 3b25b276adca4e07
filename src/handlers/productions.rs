use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::handlers::{ListQuery, PaginatedResponse};
use crate::services::productions::{
    CreateProductionRequest, ProductionFilters, UpdateProductionRequest,
};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/productions", get(list_productions).post(create_production))
        .route(
            "/productions/:id",
            get(get_production)
                .put(update_production)
                .delete(delete_production),
        )
}

async fn create_production(
    State(state): State<AppState>,
    Json(request): Json<CreateProductionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let production = state.services.productions.create(request).await?;
    Ok((StatusCode::CREATED, Json(production)))
}

async fn list_productions(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filters): Query<ProductionFilters>,
) -> Result<impl IntoResponse, ServiceError> {
    let (productions, total) = state
        .services
        .productions
        .list(query.page, query.limit, filters)
        .await?;
    Ok(Json(PaginatedResponse::new(productions, total, &query)))
}

async fn get_production(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let production = state.services.productions.get(id).await?;
    Ok(Json(production))
}

async fn update_production(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateProductionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let production = state.services.productions.update(id, request).await?;
    Ok(Json(production))
}

async fn delete_production(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.productions.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
