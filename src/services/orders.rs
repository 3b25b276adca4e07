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
        buyer::Entity as BuyerEntity,
        order::{self, Entity as OrderEntity, Model as OrderModel, OrderStatus},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "Order number is required"))]
    pub order_number: String,
    pub buyer_id: Uuid,
    #[validate(length(min = 1, message = "Style number is required"))]
    pub style_number: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    pub delivery_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateOrderRequest {
    pub style_number: Option<String>,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: Option<i32>,
    pub delivery_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderFilters {
    pub status: Option<String>,
    pub buyer_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl OrderService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, request), fields(order_number = %request.order_number))]
    pub async fn create(&self, request: CreateOrderRequest) -> Result<OrderModel, ServiceError> {
        request.validate()?;

        BuyerEntity::find_by_id(request.buyer_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| {
                ServiceError::ValidationError(format!("Buyer {} does not exist", request.buyer_id))
            })?;

        let model = order::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_number: Set(request.order_number),
            buyer_id: Set(request.buyer_id),
            style_number: Set(request.style_number),
            quantity: Set(request.quantity),
            delivery_date: Set(request.delivery_date),
            status: Set(OrderStatus::Pending.to_string()),
            notes: Set(request.notes),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        let created = model.insert(&*self.db_pool).await?;
        self.event_sender.send(Event::OrderCreated(created.id)).await;
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        page: u64,
        limit: u64,
        filters: OrderFilters,
    ) -> Result<(Vec<OrderModel>, u64), ServiceError> {
        let mut query = OrderEntity::find().order_by_desc(order::Column::CreatedAt);
        if let Some(status) = &filters.status {
            query = query.filter(order::Column::Status.eq(status.as_str()));
        }
        if let Some(buyer_id) = filters.buyer_id {
            query = query.filter(order::Column::BuyerId.eq(buyer_id));
        }

        let paginator = query.paginate(&*self.db_pool, limit);
        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((orders, total))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<OrderModel, ServiceError> {
        OrderEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {id} not found")))
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateOrderRequest,
    ) -> Result<OrderModel, ServiceError> {
        request.validate()?;

        let existing = self.get(id).await?;
        let mut model: order::ActiveModel = existing.into();

        if let Some(style_number) = request.style_number {
            model.style_number = Set(style_number);
        }
        if let Some(quantity) = request.quantity {
            model.quantity = Set(quantity);
        }
        if let Some(delivery_date) = request.delivery_date {
            model.delivery_date = Set(Some(delivery_date));
        }
        if let Some(notes) = request.notes {
            model.notes = Set(Some(notes));
        }
        model.updated_at = Set(Some(Utc::now()));

        Ok(model.update(&*self.db_pool).await?)
    }

    /// Moves an order to a new lifecycle status.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: Uuid,
        request: UpdateOrderStatusRequest,
    ) -> Result<OrderModel, ServiceError> {
        let new_status = OrderStatus::from_str(&request.status).map_err(|_| {
            ServiceError::ValidationError(format!("Unknown order status '{}'", request.status))
        })?;

        let existing = self.get(id).await?;
        let old_status = existing.status.clone();
        if old_status == new_status.to_string() {
            return Ok(existing);
        }

        let mut model: order::ActiveModel = existing.into();
        model.status = Set(new_status.to_string());
        model.updated_at = Set(Some(Utc::now()));
        let updated = model.update(&*self.db_pool).await?;

        self.event_sender
            .send(Event::OrderStatusChanged {
                order_id: id,
                old_status,
                new_status: new_status.to_string(),
            })
            .await;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = OrderEntity::delete_by_id(id).exec(&*self.db_pool).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Order {id} not found")));
        }
        Ok(())
    }
}
