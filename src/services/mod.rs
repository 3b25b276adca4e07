pub mod buyers;
pub mod inventory;
pub mod machines;
pub mod orders;
pub mod productions;
pub mod purchases;
pub mod store_entries;
pub mod store_logs;
