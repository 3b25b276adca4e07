use utoipa::OpenApi;

use crate::entities::{purchase_item, store_entry_item, store_log_item};
use crate::errors::ErrorResponse;
use crate::handlers::store_logs::AvailableStockResponse;
use crate::services::store_entries::{
    CreateStoreEntryRequest, StoreEntryItemRequest, StoreEntryListRow, StoreEntryResponse,
    StoreEntryStatus,
};
use crate::services::store_logs::{CreateStoreLogRequest, StoreLogItemRequest, StoreLogResponse};
use crate::stock::{InventoryRow, StockStatus};

/// OpenAPI document for the store and inventory surface, served at
/// `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Garment back-office API",
        description = "Order intake, purchasing, production tracking and warehouse store management"
    ),
    paths(
        crate::handlers::store_entries::create_store_entry,
        crate::handlers::store_entries::list_store_entries,
        crate::handlers::store_logs::create_store_log,
        crate::handlers::store_logs::available_stock,
        crate::handlers::inventory::list_inventory,
    ),
    components(schemas(
        CreateStoreEntryRequest,
        StoreEntryItemRequest,
        StoreEntryResponse,
        StoreEntryListRow,
        StoreEntryStatus,
        CreateStoreLogRequest,
        StoreLogItemRequest,
        StoreLogResponse,
        AvailableStockResponse,
        InventoryRow,
        StockStatus,
        ErrorResponse,
        purchase_item::Model,
        purchase_item::ItemDetails,
        store_entry_item::Model,
        store_log_item::Model,
    )),
    tags(
        (name = "store", description = "Warehouse store entries, logs and reconciled inventory")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_serializes_and_covers_store_paths() {
        let doc = ApiDoc::openapi();
        let json = serde_json::to_value(&doc).expect("openapi serializes");
        let paths = json["paths"].as_object().expect("paths object");
        assert!(paths.contains_key("/api/v1/store-entries"));
        assert!(paths.contains_key("/api/v1/inventory"));
        assert!(paths.contains_key("/api/v1/store-logs/available-stock/{store_entry_id}"));
    }
}
