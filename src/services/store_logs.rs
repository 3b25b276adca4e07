use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{
        store_entry::Entity as StoreEntryEntity,
        store_entry_item::{self, Entity as StoreEntryItemEntity},
        store_log::{self, Entity as StoreLogEntity, Model as StoreLogModel, StoreLogStatus},
        store_log_item::{self, Entity as StoreLogItemEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    stock::{
        compute_entry_rows, round_qty, EntryStock, InventoryRow, LogStock, MovementItem,
        ReceivedItem,
    },
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStoreLogRequest {
    pub store_entry_id: Uuid,
    #[validate(length(min = 1, message = "Worker name is required"))]
    pub worker_name: String,
    pub log_date: NaiveDate,
    /// Defaults to `in_store` when omitted.
    pub status: Option<String>,
    #[validate(length(min = 1, message = "At least one item movement is required"))]
    pub items: Vec<StoreLogItemRequest>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StoreLogItemRequest {
    pub item_name: String,
    #[serde(default)]
    pub taken_qty: Decimal,
    #[serde(default)]
    pub returned_qty: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStoreLogRequest {
    pub worker_name: Option<String>,
    pub log_date: Option<NaiveDate>,
    /// When present, replaces the full movement list.
    pub items: Option<Vec<StoreLogItemRequest>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStoreLogStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StoreLogResponse {
    pub id: Uuid,
    pub store_entry_id: Uuid,
    pub worker_name: String,
    pub log_date: NaiveDate,
    pub status: String,
    pub items: Vec<store_log_item::Model>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StoreLogFilters {
    pub store_entry_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct StoreLogService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl StoreLogService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Loads the received-quantity view of one store entry.
    async fn entry_stock<C: ConnectionTrait>(
        conn: &C,
        store_entry_id: Uuid,
    ) -> Result<EntryStock, ServiceError> {
        StoreEntryEntity::find_by_id(store_entry_id)
            .one(conn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Store entry {store_entry_id} not found"))
            })?;

        let items = StoreEntryItemEntity::find()
            .filter(store_entry_item::Column::StoreEntryId.eq(store_entry_id))
            .all(conn)
            .await?;

        Ok(EntryStock {
            store_entry_id,
            items: items
                .into_iter()
                .map(|item| ReceivedItem {
                    item_name: item.item_name,
                    unit: item.unit,
                    store_in_qty: item.store_in_qty,
                })
                .collect(),
        })
    }

    /// Loads every log against one entry, optionally excluding the log
    /// currently being edited so it does not count against itself.
    async fn entry_logs<C: ConnectionTrait>(
        conn: &C,
        store_entry_id: Uuid,
        exclude_log: Option<Uuid>,
    ) -> Result<Vec<LogStock>, ServiceError> {
        let mut query =
            StoreLogEntity::find().filter(store_log::Column::StoreEntryId.eq(store_entry_id));
        if let Some(excluded) = exclude_log {
            query = query.filter(store_log::Column::Id.ne(excluded));
        }
        let logs = query.all(conn).await?;
        let log_ids: Vec<Uuid> = logs.iter().map(|log| log.id).collect();

        let mut items_by_log: HashMap<Uuid, Vec<MovementItem>> = HashMap::new();
        if !log_ids.is_empty() {
            let items = StoreLogItemEntity::find()
                .filter(store_log_item::Column::StoreLogId.is_in(log_ids))
                .all(conn)
                .await?;
            for item in items {
                items_by_log
                    .entry(item.store_log_id)
                    .or_default()
                    .push(MovementItem {
                        item_name: item.item_name,
                        taken_qty: item.taken_qty,
                        returned_qty: item.returned_qty,
                    });
            }
        }

        Ok(logs
            .into_iter()
            .map(|log| LogStock {
                store_entry_id,
                items: items_by_log.remove(&log.id).unwrap_or_default(),
            })
            .collect())
    }

    /// Validates requested movements against the entry and the currently
    /// available stock, returning unit lookup for the accepted items.
    ///
    /// Taken quantities are summed per item before the availability
    /// comparison, so the same item split across several lines of one
    /// request cannot slip past the overdraw check.
    fn check_movements(
        entry: &EntryStock,
        current_rows: &[InventoryRow],
        items: &[StoreLogItemRequest],
    ) -> Result<HashMap<String, String>, ServiceError> {
        let units: HashMap<String, String> = entry
            .items
            .iter()
            .map(|item| (item.item_name.clone(), item.unit.clone()))
            .collect();
        let available: HashMap<&str, Decimal> = current_rows
            .iter()
            .map(|row| (row.item_name.as_str(), row.available_stock))
            .collect();

        let mut requested: HashMap<&str, Decimal> = HashMap::new();
        for item in items {
            if item.taken_qty < Decimal::ZERO || item.returned_qty < Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "Quantities for '{}' cannot be negative",
                    item.item_name
                )));
            }
            if !units.contains_key(&item.item_name) {
                return Err(ServiceError::ValidationError(format!(
                    "'{}' is not part of this store entry",
                    item.item_name
                )));
            }
            *requested
                .entry(item.item_name.as_str())
                .or_insert(Decimal::ZERO) += item.taken_qty;
        }

        for (item_name, taken) in requested {
            let in_store = available.get(item_name).copied().unwrap_or(Decimal::ZERO);
            if taken > in_store {
                return Err(ServiceError::ValidationError(format!(
                    "Insufficient stock for '{item_name}': requested {taken}, available {in_store}"
                )));
            }
        }
        Ok(units)
    }

    fn item_model(
        log_id: Uuid,
        unit: String,
        item: StoreLogItemRequest,
    ) -> store_log_item::ActiveModel {
        let taken = round_qty(item.taken_qty);
        let returned = round_qty(item.returned_qty);
        store_log_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            store_log_id: Set(log_id),
            item_name: Set(item.item_name),
            unit: Set(unit),
            taken_qty: Set(taken),
            returned_qty: Set(returned),
            in_hand_qty: Set(taken - returned),
        }
    }

    /// Records a worker taking/returning material against a store entry.
    ///
    /// The availability check runs inside the insert transaction, so two
    /// workers racing for the last of an item cannot both overdraw it.
    #[instrument(skip(self, request), fields(store_entry_id = %request.store_entry_id))]
    pub async fn create(
        &self,
        request: CreateStoreLogRequest,
    ) -> Result<StoreLogResponse, ServiceError> {
        request.validate()?;

        let status = match &request.status {
            Some(raw) => StoreLogStatus::from_str(raw).map_err(|_| {
                ServiceError::ValidationError(format!("Unknown store log status '{raw}'"))
            })?,
            None => StoreLogStatus::InStore,
        };

        let txn = self.db_pool.begin().await?;

        let entry = Self::entry_stock(&txn, request.store_entry_id).await?;
        let logs = Self::entry_logs(&txn, request.store_entry_id, None).await?;
        let current_rows = compute_entry_rows(&entry, &logs);
        let units = Self::check_movements(&entry, &current_rows, &request.items)?;

        let log_id = Uuid::new_v4();
        let log = store_log::ActiveModel {
            id: Set(log_id),
            store_entry_id: Set(request.store_entry_id),
            worker_name: Set(request.worker_name),
            log_date: Set(request.log_date),
            status: Set(status.to_string()),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(&txn)
        .await?;

        let item_models: Vec<_> = request
            .items
            .into_iter()
            .map(|item| {
                let unit = units.get(&item.item_name).cloned().unwrap_or_default();
                Self::item_model(log_id, unit, item)
            })
            .collect();
        StoreLogItemEntity::insert_many(item_models).exec(&txn).await?;

        let items = StoreLogItemEntity::find()
            .filter(store_log_item::Column::StoreLogId.eq(log_id))
            .all(&txn)
            .await?;

        txn.commit().await?;
        self.event_sender
            .send(Event::StoreLogCreated {
                store_log_id: log_id,
                store_entry_id: log.store_entry_id,
            })
            .await;

        Ok(Self::response(log, items))
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        page: u64,
        limit: u64,
        filters: StoreLogFilters,
    ) -> Result<(Vec<StoreLogModel>, u64), ServiceError> {
        let mut query = StoreLogEntity::find().order_by_desc(store_log::Column::LogDate);
        if let Some(store_entry_id) = filters.store_entry_id {
            query = query.filter(store_log::Column::StoreEntryId.eq(store_entry_id));
        }

        let paginator = query.paginate(&*self.db_pool, limit);
        let total = paginator.num_items().await?;
        let logs = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((logs, total))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<StoreLogResponse, ServiceError> {
        let log = StoreLogEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Store log {id} not found")))?;

        let items = StoreLogItemEntity::find()
            .filter(store_log_item::Column::StoreLogId.eq(id))
            .all(&*self.db_pool)
            .await?;

        Ok(Self::response(log, items))
    }

    /// Edits a log. The edited log's own previous movements are excluded
    /// from the availability baseline so they do not count against it.
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateStoreLogRequest,
    ) -> Result<StoreLogResponse, ServiceError> {
        if let Some(items) = &request.items {
            if items.is_empty() {
                return Err(ServiceError::ValidationError(
                    "At least one item movement is required".into(),
                ));
            }
        }

        let txn = self.db_pool.begin().await?;

        let log = StoreLogEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Store log {id} not found")))?;
        let store_entry_id = log.store_entry_id;

        let mut model: store_log::ActiveModel = log.into();
        if let Some(worker_name) = request.worker_name {
            if worker_name.is_empty() {
                return Err(ServiceError::ValidationError(
                    "Worker name cannot be empty".into(),
                ));
            }
            model.worker_name = Set(worker_name);
        }
        if let Some(log_date) = request.log_date {
            model.log_date = Set(log_date);
        }
        model.updated_at = Set(Some(Utc::now()));
        let log = model.update(&txn).await?;

        if let Some(items) = request.items {
            let entry = Self::entry_stock(&txn, store_entry_id).await?;
            let other_logs = Self::entry_logs(&txn, store_entry_id, Some(id)).await?;
            let current_rows = compute_entry_rows(&entry, &other_logs);
            let units = Self::check_movements(&entry, &current_rows, &items)?;

            StoreLogItemEntity::delete_many()
                .filter(store_log_item::Column::StoreLogId.eq(id))
                .exec(&txn)
                .await?;
            let item_models: Vec<_> = items
                .into_iter()
                .map(|item| {
                    let unit = units.get(&item.item_name).cloned().unwrap_or_default();
                    Self::item_model(id, unit, item)
                })
                .collect();
            StoreLogItemEntity::insert_many(item_models).exec(&txn).await?;
        }

        let items = StoreLogItemEntity::find()
            .filter(store_log_item::Column::StoreLogId.eq(id))
            .all(&txn)
            .await?;
        txn.commit().await?;

        Ok(Self::response(log, items))
    }

    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: Uuid,
        request: UpdateStoreLogStatusRequest,
    ) -> Result<StoreLogModel, ServiceError> {
        let new_status = StoreLogStatus::from_str(&request.status).map_err(|_| {
            ServiceError::ValidationError(format!("Unknown store log status '{}'", request.status))
        })?;

        let log = StoreLogEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Store log {id} not found")))?;
        let old_status = log.status.clone();

        let mut model: store_log::ActiveModel = log.into();
        model.status = Set(new_status.to_string());
        model.updated_at = Set(Some(Utc::now()));
        let updated = model.update(&*self.db_pool).await?;

        self.event_sender
            .send(Event::StoreLogStatusChanged {
                store_log_id: id,
                old_status,
                new_status: new_status.to_string(),
            })
            .await;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db_pool.begin().await?;
        StoreLogItemEntity::delete_many()
            .filter(store_log_item::Column::StoreLogId.eq(id))
            .exec(&txn)
            .await?;
        let result = StoreLogEntity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Store log {id} not found")));
        }
        txn.commit().await?;
        Ok(())
    }

    /// Current reconciled stock for one store entry.
    #[instrument(skip(self))]
    pub async fn available_stock(
        &self,
        store_entry_id: Uuid,
    ) -> Result<Vec<InventoryRow>, ServiceError> {
        let entry = Self::entry_stock(&*self.db_pool, store_entry_id).await?;
        let logs = Self::entry_logs(&*self.db_pool, store_entry_id, None).await?;
        Ok(compute_entry_rows(&entry, &logs))
    }

    fn response(log: StoreLogModel, items: Vec<store_log_item::Model>) -> StoreLogResponse {
        StoreLogResponse {
            id: log.id,
            store_entry_id: log.store_entry_id,
            worker_name: log.worker_name,
            log_date: log.log_date,
            status: log.status,
            items,
            created_at: log.created_at,
            updated_at: log.updated_at,
        }
    }
}
