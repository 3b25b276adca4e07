//! HTTP layer: one module per resource, each exporting a `router()`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{
    buyers::BuyerService, inventory::InventoryService, machines::MachineService,
    orders::OrderService, productions::ProductionService, purchases::PurchaseService,
    store_entries::StoreEntryService, store_logs::StoreLogService,
};

pub mod buyers;
pub mod inventory;
pub mod machines;
pub mod orders;
pub mod productions;
pub mod purchases;
pub mod store_entries;
pub mod store_logs;

/// Every service the handlers dispatch into, constructed once at startup.
#[derive(Clone)]
pub struct AppServices {
    pub buyers: BuyerService,
    pub orders: OrderService,
    pub purchases: PurchaseService,
    pub store_entries: StoreEntryService,
    pub store_logs: StoreLogService,
    pub inventory: InventoryService,
    pub productions: ProductionService,
    pub machines: MachineService,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            buyers: BuyerService::new(db_pool.clone(), event_sender.clone()),
            orders: OrderService::new(db_pool.clone(), event_sender.clone()),
            purchases: PurchaseService::new(db_pool.clone(), event_sender.clone()),
            store_entries: StoreEntryService::new(db_pool.clone(), event_sender.clone()),
            store_logs: StoreLogService::new(db_pool.clone(), event_sender.clone()),
            inventory: InventoryService::new(db_pool.clone()),
            productions: ProductionService::new(db_pool.clone(), event_sender.clone()),
            machines: MachineService::new(db_pool, event_sender),
        }
    }
}

/// Page/limit pair shared by every listing endpoint.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    20
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

/// Free-text query for the typeahead search endpoints.
#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: u64, query: &ListQuery) -> Self {
        Self {
            items,
            total,
            page: query.page,
            limit: query.limit,
        }
    }
}
