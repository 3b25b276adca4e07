use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Warehouse intake record for a completed purchase.
///
/// At most one entry per purchase; enforced by a unique index on
/// `purchase_id` plus a transactional check at creation time. A completed
/// purchase without an entry is surfaced by the listing as a synthetic
/// pending row, never persisted here.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = StoreEntry)]
#[sea_orm(table_name = "store_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub purchase_id: Uuid,
    pub entry_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::purchase::Entity",
        from = "Column::PurchaseId",
        to = "super::purchase::Column::Id"
    )]
    Purchase,
    #[sea_orm(has_many = "super::store_entry_item::Entity")]
    StoreEntryItem,
    #[sea_orm(has_many = "super::store_log::Entity")]
    StoreLog,
}

impl Related<super::purchase::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchase.def()
    }
}

impl Related<super::store_entry_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StoreEntryItem.def()
    }
}

impl Related<super::store_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StoreLog.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
