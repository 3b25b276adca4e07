use std::str::FromStr;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{
        machine::Entity as MachineEntity,
        order::Entity as OrderEntity,
        production::{self, Entity as ProductionEntity, Model as ProductionModel, ProductionStage},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProductionRequest {
    pub order_id: Uuid,
    pub production_date: NaiveDate,
    #[validate(length(min = 1, message = "Production stage is required"))]
    pub stage: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    pub machine_id: Option<Uuid>,
    pub operator: Option<String>,
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProductionRequest {
    pub production_date: Option<NaiveDate>,
    pub stage: Option<String>,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: Option<i32>,
    pub operator: Option<String>,
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductionFilters {
    pub order_id: Option<Uuid>,
    pub stage: Option<String>,
}

#[derive(Clone)]
pub struct ProductionService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl ProductionService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, request), fields(order_id = %request.order_id, stage = %request.stage))]
    pub async fn create(
        &self,
        request: CreateProductionRequest,
    ) -> Result<ProductionModel, ServiceError> {
        request.validate()?;

        let stage = ProductionStage::from_str(&request.stage).map_err(|_| {
            ServiceError::ValidationError(format!("Unknown production stage '{}'", request.stage))
        })?;

        OrderEntity::find_by_id(request.order_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| {
                ServiceError::ValidationError(format!("Order {} does not exist", request.order_id))
            })?;

        if let Some(machine_id) = request.machine_id {
            MachineEntity::find_by_id(machine_id)
                .one(&*self.db_pool)
                .await?
                .ok_or_else(|| {
                    ServiceError::ValidationError(format!("Machine {machine_id} does not exist"))
                })?;
        }

        let model = production::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(request.order_id),
            production_date: Set(request.production_date),
            stage: Set(stage.to_string()),
            quantity: Set(request.quantity),
            machine_id: Set(request.machine_id),
            operator: Set(request.operator),
            remarks: Set(request.remarks),
            created_at: Set(Utc::now()),
        };

        let created = model.insert(&*self.db_pool).await?;
        self.event_sender
            .send(Event::ProductionRecorded {
                production_id: created.id,
                order_id: created.order_id,
            })
            .await;
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        page: u64,
        limit: u64,
        filters: ProductionFilters,
    ) -> Result<(Vec<ProductionModel>, u64), ServiceError> {
        let mut query = ProductionEntity::find().order_by_desc(production::Column::ProductionDate);
        if let Some(order_id) = filters.order_id {
            query = query.filter(production::Column::OrderId.eq(order_id));
        }
        if let Some(stage) = &filters.stage {
            query = query.filter(production::Column::Stage.eq(stage.as_str()));
        }

        let paginator = query.paginate(&*self.db_pool, limit);
        let total = paginator.num_items().await?;
        let productions = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((productions, total))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<ProductionModel, ServiceError> {
        ProductionEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Production record {id} not found")))
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateProductionRequest,
    ) -> Result<ProductionModel, ServiceError> {
        request.validate()?;
        let stage = match &request.stage {
            Some(raw) => Some(ProductionStage::from_str(raw).map_err(|_| {
                ServiceError::ValidationError(format!("Unknown production stage '{raw}'"))
            })?),
            None => None,
        };

        let existing = self.get(id).await?;
        let mut model: production::ActiveModel = existing.into();

        if let Some(production_date) = request.production_date {
            model.production_date = Set(production_date);
        }
        if let Some(stage) = stage {
            model.stage = Set(stage.to_string());
        }
        if let Some(quantity) = request.quantity {
            model.quantity = Set(quantity);
        }
        if let Some(operator) = request.operator {
            model.operator = Set(Some(operator));
        }
        if let Some(remarks) = request.remarks {
            model.remarks = Set(Some(remarks));
        }

        Ok(model.update(&*self.db_pool).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = ProductionEntity::delete_by_id(id).exec(&*self.db_pool).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Production record {id} not found"
            )));
        }
        Ok(())
    }
}
