pub mod buyer;
pub mod machine;
pub mod order;
pub mod production;
pub mod purchase;
pub mod purchase_item;
pub mod store_entry;
pub mod store_entry_item;
pub mod store_log;
pub mod store_log_item;
