use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{
        purchase::{self, Entity as PurchaseEntity, Model as PurchaseModel, PurchaseStatus},
        store_entry::{self, Entity as StoreEntryEntity, Model as StoreEntryModel},
        store_entry_item::{self, Entity as StoreEntryItemEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    stock::{reconcile_receipt, round_qty},
};

/// Derived store-entry state: a completed purchase without a persisted
/// entry is "pending"; a persisted entry is always "completed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StoreEntryStatus {
    Pending,
    Completed,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStoreEntryRequest {
    pub purchase_id: Uuid,
    pub entry_date: NaiveDate,
    #[validate(length(min = 1, message = "At least one received item is required"))]
    pub items: Vec<StoreEntryItemRequest>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StoreEntryItemRequest {
    pub item_name: String,
    pub supplier_id: Option<Uuid>,
    pub supplier_name: String,
    pub unit: String,
    pub purchase_qty: Decimal,
    pub invoice_qty: Decimal,
    pub store_in_qty: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStoreEntryRequest {
    pub entry_date: Option<NaiveDate>,
    /// When present, replaces the full received-item list; shortage and
    /// surplus are recomputed from the submitted quantities.
    pub items: Option<Vec<StoreEntryItemRequest>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StoreEntryResponse {
    pub id: Uuid,
    pub purchase_id: Uuid,
    pub purchase_number: String,
    pub status: StoreEntryStatus,
    pub entry_date: NaiveDate,
    pub items: Vec<store_entry_item::Model>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// One row of the store-entry listing. Synthetic pending rows (completed
/// purchase, no entry yet) have no `id` and no `entry_date`.
#[derive(Debug, Serialize, ToSchema)]
pub struct StoreEntryListRow {
    pub id: Option<Uuid>,
    pub purchase_id: Uuid,
    pub purchase_number: String,
    pub status: StoreEntryStatus,
    pub entry_date: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct StoreEntryService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl StoreEntryService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    fn check_quantities(items: &[StoreEntryItemRequest]) -> Result<(), ServiceError> {
        for item in items {
            if item.item_name.is_empty() || item.unit.is_empty() {
                return Err(ServiceError::ValidationError(
                    "Item name and unit are required for every received item".into(),
                ));
            }
            if item.purchase_qty < Decimal::ZERO
                || item.invoice_qty < Decimal::ZERO
                || item.store_in_qty < Decimal::ZERO
            {
                return Err(ServiceError::ValidationError(format!(
                    "Quantities for '{}' cannot be negative",
                    item.item_name
                )));
            }
        }
        Ok(())
    }

    fn item_model(entry_id: Uuid, item: StoreEntryItemRequest) -> store_entry_item::ActiveModel {
        let receipt = reconcile_receipt(item.invoice_qty, item.store_in_qty);
        store_entry_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            store_entry_id: Set(entry_id),
            item_name: Set(item.item_name),
            supplier_id: Set(item.supplier_id),
            supplier_name: Set(item.supplier_name),
            unit: Set(item.unit),
            purchase_qty: Set(round_qty(item.purchase_qty)),
            invoice_qty: Set(round_qty(item.invoice_qty)),
            store_in_qty: Set(round_qty(item.store_in_qty)),
            shortage: Set(receipt.shortage),
            surplus: Set(receipt.surplus),
        }
    }

    fn is_unique_violation(err: &DbErr) -> bool {
        let msg = err.to_string().to_lowercase();
        msg.contains("unique") || msg.contains("duplicate key")
    }

    /// Completed purchases not yet received into the store.
    #[instrument(skip(self))]
    pub async fn pending_purchases(&self) -> Result<Vec<PurchaseModel>, ServiceError> {
        let completed = PurchaseEntity::find()
            .filter(purchase::Column::Status.eq(PurchaseStatus::Completed.to_string()))
            .order_by_desc(purchase::Column::PurchaseDate)
            .all(&*self.db_pool)
            .await?;

        let consumed: HashSet<Uuid> = StoreEntryEntity::find()
            .all(&*self.db_pool)
            .await?
            .into_iter()
            .map(|entry| entry.purchase_id)
            .collect();

        Ok(completed
            .into_iter()
            .filter(|p| !consumed.contains(&p.id))
            .collect())
    }

    /// Creates the store entry for a completed purchase.
    ///
    /// The duplicate check runs inside the insert transaction and the
    /// `purchase_id` column carries a unique index, so two racing
    /// submissions cannot both succeed; the loser gets a conflict.
    #[instrument(skip(self, request), fields(purchase_id = %request.purchase_id))]
    pub async fn create(
        &self,
        request: CreateStoreEntryRequest,
    ) -> Result<StoreEntryResponse, ServiceError> {
        request.validate()?;
        Self::check_quantities(&request.items)?;

        let txn = self.db_pool.begin().await?;

        let purchase = PurchaseEntity::find_by_id(request.purchase_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Purchase {} not found", request.purchase_id))
            })?;

        let status = PurchaseStatus::from_str(&purchase.status).map_err(|_| {
            ServiceError::InternalError(format!(
                "Purchase {} has corrupt status '{}'",
                purchase.id, purchase.status
            ))
        })?;
        if status != PurchaseStatus::Completed {
            return Err(ServiceError::InvalidStatus(
                "Only completed purchases can be received into the store".into(),
            ));
        }

        let existing = StoreEntryEntity::find()
            .filter(store_entry::Column::PurchaseId.eq(request.purchase_id))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(
                "A store entry for this purchase already exists".into(),
            ));
        }

        let entry_id = Uuid::new_v4();
        let entry_model = store_entry::ActiveModel {
            id: Set(entry_id),
            purchase_id: Set(request.purchase_id),
            entry_date: Set(request.entry_date),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };
        let entry = match entry_model.insert(&txn).await {
            Ok(entry) => entry,
            Err(err) if Self::is_unique_violation(&err) => {
                return Err(ServiceError::Conflict(
                    "A store entry for this purchase already exists".into(),
                ));
            }
            Err(err) => return Err(err.into()),
        };

        let item_models: Vec<_> = request
            .items
            .into_iter()
            .map(|item| Self::item_model(entry_id, item))
            .collect();
        StoreEntryItemEntity::insert_many(item_models).exec(&txn).await?;

        let items = StoreEntryItemEntity::find()
            .filter(store_entry_item::Column::StoreEntryId.eq(entry_id))
            .all(&txn)
            .await?;

        txn.commit().await?;
        self.event_sender
            .send(Event::StoreEntryCreated {
                store_entry_id: entry_id,
                purchase_id: purchase.id,
            })
            .await;

        Ok(Self::response(entry, purchase.purchase_number, items))
    }

    /// Lists persisted entries plus one synthetic pending row for each
    /// completed purchase that has not been received yet.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<StoreEntryListRow>, ServiceError> {
        let entries = StoreEntryEntity::find()
            .find_also_related(PurchaseEntity)
            .order_by_desc(store_entry::Column::EntryDate)
            .all(&*self.db_pool)
            .await?;

        let mut rows: Vec<StoreEntryListRow> = self
            .pending_purchases()
            .await?
            .into_iter()
            .map(|p| StoreEntryListRow {
                id: None,
                purchase_id: p.id,
                purchase_number: p.purchase_number,
                status: StoreEntryStatus::Pending,
                entry_date: None,
            })
            .collect();

        rows.extend(entries.into_iter().map(|(entry, purchase)| {
            StoreEntryListRow {
                id: Some(entry.id),
                purchase_id: entry.purchase_id,
                purchase_number: purchase
                    .map(|p| p.purchase_number)
                    .unwrap_or_default(),
                status: StoreEntryStatus::Completed,
                entry_date: Some(entry.entry_date),
            }
        }));

        Ok(rows)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<StoreEntryResponse, ServiceError> {
        let (entry, purchase) = StoreEntryEntity::find_by_id(id)
            .find_also_related(PurchaseEntity)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Store entry {id} not found")))?;

        let items = StoreEntryItemEntity::find()
            .filter(store_entry_item::Column::StoreEntryId.eq(id))
            .all(&*self.db_pool)
            .await?;

        let purchase_number = purchase.map(|p| p.purchase_number).unwrap_or_default();
        Ok(Self::response(entry, purchase_number, items))
    }

    /// Edits an entry; submitting items recomputes shortage/surplus.
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateStoreEntryRequest,
    ) -> Result<StoreEntryResponse, ServiceError> {
        request.validate()?;
        if let Some(items) = &request.items {
            if items.is_empty() {
                return Err(ServiceError::ValidationError(
                    "At least one received item is required".into(),
                ));
            }
            Self::check_quantities(items)?;
        }

        let txn = self.db_pool.begin().await?;

        let (entry, purchase) = StoreEntryEntity::find_by_id(id)
            .find_also_related(PurchaseEntity)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Store entry {id} not found")))?;

        let mut model: store_entry::ActiveModel = entry.into();
        if let Some(entry_date) = request.entry_date {
            model.entry_date = Set(entry_date);
        }
        model.updated_at = Set(Some(Utc::now()));
        let entry = model.update(&txn).await?;

        if let Some(items) = request.items {
            StoreEntryItemEntity::delete_many()
                .filter(store_entry_item::Column::StoreEntryId.eq(id))
                .exec(&txn)
                .await?;
            let item_models: Vec<_> = items
                .into_iter()
                .map(|item| Self::item_model(id, item))
                .collect();
            StoreEntryItemEntity::insert_many(item_models).exec(&txn).await?;
        }

        let items = StoreEntryItemEntity::find()
            .filter(store_entry_item::Column::StoreEntryId.eq(id))
            .all(&txn)
            .await?;
        txn.commit().await?;

        self.event_sender.send(Event::StoreEntryUpdated(id)).await;

        let purchase_number = purchase.map(|p| p.purchase_number).unwrap_or_default();
        Ok(Self::response(entry, purchase_number, items))
    }

    fn response(
        entry: StoreEntryModel,
        purchase_number: String,
        items: Vec<store_entry_item::Model>,
    ) -> StoreEntryResponse {
        StoreEntryResponse {
            id: entry.id,
            purchase_id: entry.purchase_id,
            purchase_number,
            status: StoreEntryStatus::Completed,
            entry_date: entry.entry_date,
            items,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}
