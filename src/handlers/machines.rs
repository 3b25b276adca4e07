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
use crate::services::machines::{CreateMachineRequest, UpdateMachineRequest};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/machines", get(list_machines).post(create_machine))
        .route(
            "/machines/:id",
            get(get_machine).put(update_machine).delete(delete_machine),
        )
}

async fn create_machine(
    State(state): State<AppState>,
    Json(request): Json<CreateMachineRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let machine = state.services.machines.create(request).await?;
    Ok((StatusCode::CREATED, Json(machine)))
}

async fn list_machines(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let (machines, total) = state.services.machines.list(query.page, query.limit).await?;
    Ok(Json(PaginatedResponse::new(machines, total, &query)))
}

async fn get_machine(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let machine = state.services.machines.get(id).await?;
    Ok(Json(machine))
}

async fn update_machine(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateMachineRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let machine = state.services.machines.update(id, request).await?;
    Ok(Json(machine))
}

async fn delete_machine(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.machines.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
