use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One take/return line of a store log.
/// `in_hand_qty = taken_qty - returned_qty`, stored rounded to 2 dp.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = StoreLogItem)]
#[sea_orm(table_name = "store_log_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub store_log_id: Uuid,
    pub item_name: String,
    pub unit: String,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub taken_qty: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub returned_qty: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub in_hand_qty: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::store_log::Entity",
        from = "Column::StoreLogId",
        to = "super::store_log::Column::Id"
    )]
    StoreLog,
}

impl Related<super::store_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StoreLog.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
