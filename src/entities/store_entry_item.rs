use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One received line of a store entry.
///
/// `shortage` and `surplus` are derived from `invoice_qty` and
/// `store_in_qty` at recompute time, rounded to two decimal places, and
/// stored; at most one of the two is nonzero.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = StoreEntryItem)]
#[sea_orm(table_name = "store_entry_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub store_entry_id: Uuid,
    pub item_name: String,
    pub supplier_id: Option<Uuid>,
    pub supplier_name: String,
    pub unit: String,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub purchase_qty: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub invoice_qty: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub store_in_qty: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub shortage: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub surplus: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::store_entry::Entity",
        from = "Column::StoreEntryId",
        to = "super::store_entry::Column::Id"
    )]
    StoreEntry,
}

impl Related<super::store_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StoreEntry.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
