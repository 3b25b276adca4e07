use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, QueryOrder, Set};
use serde::Deserialize;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::machine::{self, Entity as MachineEntity, MachineStatus, Model as MachineModel},
    errors::ServiceError,
    events::{Event, EventSender},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMachineRequest {
    #[validate(length(min = 1, message = "Machine number is required"))]
    pub machine_number: String,
    #[validate(length(min = 1, message = "Machine type is required"))]
    pub machine_type: String,
    pub brand: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateMachineRequest {
    pub machine_type: Option<String>,
    pub brand: Option<String>,
    pub status: Option<String>,
}

#[derive(Clone)]
pub struct MachineService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl MachineService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, request), fields(machine_number = %request.machine_number))]
    pub async fn create(&self, request: CreateMachineRequest) -> Result<MachineModel, ServiceError> {
        request.validate()?;

        let model = machine::ActiveModel {
            id: Set(Uuid::new_v4()),
            machine_number: Set(request.machine_number),
            machine_type: Set(request.machine_type),
            brand: Set(request.brand),
            status: Set(MachineStatus::Active.to_string()),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        let created = model.insert(&*self.db_pool).await?;
        self.event_sender
            .send(Event::MachineRegistered(created.id))
            .await;
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<MachineModel>, u64), ServiceError> {
        let paginator = MachineEntity::find()
            .order_by_asc(machine::Column::MachineNumber)
            .paginate(&*self.db_pool, limit);
        let total = paginator.num_items().await?;
        let machines = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((machines, total))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<MachineModel, ServiceError> {
        MachineEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Machine {id} not found")))
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateMachineRequest,
    ) -> Result<MachineModel, ServiceError> {
        if let Some(status) = &request.status {
            MachineStatus::from_str(status).map_err(|_| {
                ServiceError::ValidationError(format!("Unknown machine status '{status}'"))
            })?;
        }

        let existing = self.get(id).await?;
        let mut model: machine::ActiveModel = existing.into();

        if let Some(machine_type) = request.machine_type {
            model.machine_type = Set(machine_type);
        }
        if let Some(brand) = request.brand {
            model.brand = Set(Some(brand));
        }
        if let Some(status) = request.status {
            model.status = Set(status);
        }
        model.updated_at = Set(Some(Utc::now()));

        Ok(model.update(&*self.db_pool).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = MachineEntity::delete_by_id(id).exec(&*self.db_pool).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Machine {id} not found")));
        }
        Ok(())
    }
}
