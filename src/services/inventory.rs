use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use sea_orm::EntityTrait;
use serde::Deserialize;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{
        store_entry::Entity as StoreEntryEntity,
        store_entry_item::Entity as StoreEntryItemEntity,
        store_log::Entity as StoreLogEntity,
        store_log_item::Entity as StoreLogItemEntity,
    },
    errors::ServiceError,
    stock::{
        compute_inventory, EntryStock, InventoryRow, LogStock, MovementItem, ReceivedItem,
        StockStatus,
    },
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct InventoryFilters {
    /// `available`, `low` or `out_of_stock`.
    pub status: Option<String>,
}

#[derive(Clone)]
pub struct InventoryService {
    db_pool: Arc<DbPool>,
}

impl InventoryService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Reconciles the whole warehouse into one row per (entry, item) pair.
    ///
    /// Nothing here is persisted; the rows are recomputed from store
    /// entries and logs on every call.
    #[instrument(skip(self))]
    pub async fn list(&self, filters: InventoryFilters) -> Result<Vec<InventoryRow>, ServiceError> {
        let status_filter = match &filters.status {
            Some(raw) => Some(StockStatus::from_str(raw).map_err(|_| {
                ServiceError::ValidationError(format!("Unknown stock status '{raw}'"))
            })?),
            None => None,
        };

        let rows = self.reconcile_all().await?;
        Ok(match status_filter {
            Some(status) => rows.into_iter().filter(|r| r.status == status).collect(),
            None => rows,
        })
    }

    /// Every row currently below the reorder threshold or exhausted.
    #[instrument(skip(self))]
    pub async fn low_stock(&self) -> Result<Vec<InventoryRow>, ServiceError> {
        let rows = self.reconcile_all().await?;
        Ok(rows
            .into_iter()
            .filter(|r| r.status != StockStatus::Available)
            .collect())
    }

    async fn reconcile_all(&self) -> Result<Vec<InventoryRow>, ServiceError> {
        let conn = &*self.db_pool;

        let entry_models = StoreEntryEntity::find().all(conn).await?;
        let entry_items = StoreEntryItemEntity::find().all(conn).await?;
        let log_models = StoreLogEntity::find().all(conn).await?;
        let log_items = StoreLogItemEntity::find().all(conn).await?;

        let mut items_by_entry: HashMap<Uuid, Vec<ReceivedItem>> = HashMap::new();
        for item in entry_items {
            items_by_entry
                .entry(item.store_entry_id)
                .or_default()
                .push(ReceivedItem {
                    item_name: item.item_name,
                    unit: item.unit,
                    store_in_qty: item.store_in_qty,
                });
        }
        let entries: Vec<EntryStock> = entry_models
            .into_iter()
            .map(|entry| EntryStock {
                store_entry_id: entry.id,
                items: items_by_entry.remove(&entry.id).unwrap_or_default(),
            })
            .collect();

        let mut items_by_log: HashMap<Uuid, Vec<MovementItem>> = HashMap::new();
        for item in log_items {
            items_by_log
                .entry(item.store_log_id)
                .or_default()
                .push(MovementItem {
                    item_name: item.item_name,
                    taken_qty: item.taken_qty,
                    returned_qty: item.returned_qty,
                });
        }
        let logs: Vec<LogStock> = log_models
            .into_iter()
            .map(|log| LogStock {
                store_entry_id: log.store_entry_id,
                items: items_by_log.remove(&log.id).unwrap_or_default(),
            })
            .collect();

        Ok(compute_inventory(&entries, &logs))
    }
}
