use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{
        purchase::{self, Entity as PurchaseEntity, Model as PurchaseModel, PurchaseStatus},
        purchase_item::{self, Entity as PurchaseItemEntity, ItemDetails},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    stock::round_qty,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePurchaseRequest {
    #[validate(length(min = 1, message = "Purchase number is required"))]
    pub purchase_number: String,
    pub order_id: Option<Uuid>,
    pub purchase_date: NaiveDate,
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "At least one line item is required"))]
    pub items: Vec<CreatePurchaseItemRequest>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatePurchaseItemRequest {
    pub supplier_id: Option<Uuid>,
    pub supplier_name: String,
    pub item_name: String,
    pub unit: String,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub gst_rate: Decimal,
    pub details: ItemDetails,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePurchaseRequest {
    pub purchase_date: Option<NaiveDate>,
    pub notes: Option<String>,
    /// When present, replaces the full line-item list.
    pub items: Option<Vec<CreatePurchaseItemRequest>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseResponse {
    pub id: Uuid,
    pub purchase_number: String,
    pub order_id: Option<Uuid>,
    pub purchase_date: NaiveDate,
    pub status: String,
    pub notes: Option<String>,
    /// Sum of quantity x unit cost, GST included, rounded to 2 dp.
    pub total_amount: Decimal,
    pub items: Vec<purchase_item::Model>,
    pub created_at: chrono::DateTime<Utc>,
    pub updated_at: Option<chrono::DateTime<Utc>>,
}

impl PurchaseResponse {
    fn from_parts(purchase: PurchaseModel, items: Vec<purchase_item::Model>) -> Self {
        let total_amount = round_qty(
            items
                .iter()
                .map(|item| {
                    item.quantity * item.unit_cost * (Decimal::ONE + item.gst_rate / dec!(100))
                })
                .sum::<Decimal>(),
        );

        Self {
            id: purchase.id,
            purchase_number: purchase.purchase_number,
            order_id: purchase.order_id,
            purchase_date: purchase.purchase_date,
            status: purchase.status,
            notes: purchase.notes,
            total_amount,
            items,
            created_at: purchase.created_at,
            updated_at: purchase.updated_at,
        }
    }
}

/// Typeahead hit for the supplier search endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct SupplierHit {
    pub supplier_id: Option<Uuid>,
    pub supplier_name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PurchaseFilters {
    pub status: Option<String>,
    pub order_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct PurchaseService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl PurchaseService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    fn check_item_quantities(items: &[CreatePurchaseItemRequest]) -> Result<(), ServiceError> {
        for item in items {
            if item.item_name.is_empty() || item.supplier_name.is_empty() || item.unit.is_empty() {
                return Err(ServiceError::ValidationError(
                    "Item name, supplier name and unit are required for every line item".into(),
                ));
            }
            if item.quantity <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "Quantity for '{}' must be positive",
                    item.item_name
                )));
            }
            if item.unit_cost < Decimal::ZERO || item.gst_rate < Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "Cost and GST rate for '{}' cannot be negative",
                    item.item_name
                )));
            }
        }
        Ok(())
    }

    fn item_model(purchase_id: Uuid, item: CreatePurchaseItemRequest) -> purchase_item::ActiveModel {
        purchase_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            purchase_id: Set(purchase_id),
            supplier_id: Set(item.supplier_id),
            supplier_name: Set(item.supplier_name),
            item_name: Set(item.item_name),
            unit: Set(item.unit),
            quantity: Set(round_qty(item.quantity)),
            unit_cost: Set(round_qty(item.unit_cost)),
            gst_rate: Set(item.gst_rate),
            details: Set(item.details),
        }
    }

    #[instrument(skip(self, request), fields(purchase_number = %request.purchase_number))]
    pub async fn create(
        &self,
        request: CreatePurchaseRequest,
    ) -> Result<PurchaseResponse, ServiceError> {
        request.validate()?;
        Self::check_item_quantities(&request.items)?;

        let txn = self.db_pool.begin().await?;

        let purchase_id = Uuid::new_v4();
        let purchase = purchase::ActiveModel {
            id: Set(purchase_id),
            purchase_number: Set(request.purchase_number),
            order_id: Set(request.order_id),
            purchase_date: Set(request.purchase_date),
            status: Set(PurchaseStatus::Pending.to_string()),
            notes: Set(request.notes),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(&txn)
        .await?;

        let item_models: Vec<_> = request
            .items
            .into_iter()
            .map(|item| Self::item_model(purchase_id, item))
            .collect();
        PurchaseItemEntity::insert_many(item_models).exec(&txn).await?;

        let items = PurchaseItemEntity::find()
            .filter(purchase_item::Column::PurchaseId.eq(purchase_id))
            .all(&txn)
            .await?;

        txn.commit().await?;
        self.event_sender.send(Event::PurchaseCreated(purchase_id)).await;

        Ok(PurchaseResponse::from_parts(purchase, items))
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        page: u64,
        limit: u64,
        filters: PurchaseFilters,
    ) -> Result<(Vec<PurchaseModel>, u64), ServiceError> {
        let mut query = PurchaseEntity::find().order_by_desc(purchase::Column::PurchaseDate);
        if let Some(status) = &filters.status {
            query = query.filter(purchase::Column::Status.eq(status.as_str()));
        }
        if let Some(order_id) = filters.order_id {
            query = query.filter(purchase::Column::OrderId.eq(order_id));
        }

        let paginator = query.paginate(&*self.db_pool, limit);
        let total = paginator.num_items().await?;
        let purchases = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((purchases, total))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<PurchaseResponse, ServiceError> {
        let purchase = self.get_model(id).await?;
        let items = PurchaseItemEntity::find()
            .filter(purchase_item::Column::PurchaseId.eq(id))
            .all(&*self.db_pool)
            .await?;
        Ok(PurchaseResponse::from_parts(purchase, items))
    }

    pub async fn get_model(&self, id: Uuid) -> Result<PurchaseModel, ServiceError> {
        PurchaseEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Purchase {id} not found")))
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdatePurchaseRequest,
    ) -> Result<PurchaseResponse, ServiceError> {
        request.validate()?;
        if let Some(items) = &request.items {
            if items.is_empty() {
                return Err(ServiceError::ValidationError(
                    "At least one line item is required".into(),
                ));
            }
            Self::check_item_quantities(items)?;
        }

        let existing = self.get_model(id).await?;
        let txn = self.db_pool.begin().await?;

        let mut model: purchase::ActiveModel = existing.into();
        if let Some(purchase_date) = request.purchase_date {
            model.purchase_date = Set(purchase_date);
        }
        if let Some(notes) = request.notes {
            model.notes = Set(Some(notes));
        }
        model.updated_at = Set(Some(Utc::now()));
        let purchase = model.update(&txn).await?;

        if let Some(items) = request.items {
            PurchaseItemEntity::delete_many()
                .filter(purchase_item::Column::PurchaseId.eq(id))
                .exec(&txn)
                .await?;
            let item_models: Vec<_> = items
                .into_iter()
                .map(|item| Self::item_model(id, item))
                .collect();
            PurchaseItemEntity::insert_many(item_models).exec(&txn).await?;
        }

        let items = PurchaseItemEntity::find()
            .filter(purchase_item::Column::PurchaseId.eq(id))
            .all(&txn)
            .await?;
        txn.commit().await?;

        Ok(PurchaseResponse::from_parts(purchase, items))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db_pool.begin().await?;
        PurchaseItemEntity::delete_many()
            .filter(purchase_item::Column::PurchaseId.eq(id))
            .exec(&txn)
            .await?;
        let result = PurchaseEntity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Purchase {id} not found")));
        }
        txn.commit().await?;
        Ok(())
    }

    /// Marks a purchase partially received.
    pub async fn mark_partial(&self, id: Uuid) -> Result<PurchaseModel, ServiceError> {
        self.transition(id, PurchaseStatus::Partial).await
    }

    /// Marks a purchase fully received, making it eligible for a store entry.
    pub async fn mark_completed(&self, id: Uuid) -> Result<PurchaseModel, ServiceError> {
        self.transition(id, PurchaseStatus::Completed).await
    }

    /// Applies a monotone status transition: pending -> partial -> completed.
    #[instrument(skip(self))]
    async fn transition(
        &self,
        id: Uuid,
        target: PurchaseStatus,
    ) -> Result<PurchaseModel, ServiceError> {
        let existing = self.get_model(id).await?;
        let current = PurchaseStatus::from_str(&existing.status).map_err(|_| {
            ServiceError::InternalError(format!(
                "Purchase {id} has corrupt status '{}'",
                existing.status
            ))
        })?;

        if target.rank() <= current.rank() {
            return Err(ServiceError::InvalidStatus(format!(
                "Purchase is already {current}, cannot move to {target}"
            )));
        }

        let old_status = existing.status.clone();
        let mut model: purchase::ActiveModel = existing.into();
        model.status = Set(target.to_string());
        model.updated_at = Set(Some(Utc::now()));
        let updated = model.update(&*self.db_pool).await?;

        self.event_sender
            .send(Event::PurchaseStatusChanged {
                purchase_id: id,
                old_status,
                new_status: target.to_string(),
            })
            .await;
        Ok(updated)
    }

    /// Supplier typeahead over purchase line items, de-duplicated by name.
    #[instrument(skip(self))]
    pub async fn search_suppliers(&self, query: &str) -> Result<Vec<SupplierHit>, ServiceError> {
        let items = PurchaseItemEntity::find()
            .filter(purchase_item::Column::SupplierName.contains(query))
            .order_by_asc(purchase_item::Column::SupplierName)
            .all(&*self.db_pool)
            .await?;

        let mut seen = HashSet::new();
        let hits = items
            .into_iter()
            .filter(|item| seen.insert(item.supplier_name.to_lowercase()))
            .map(|item| SupplierHit {
                supplier_id: item.supplier_id,
                supplier_name: item.supplier_name,
            })
            .collect();
        Ok(hits)
    }
}
