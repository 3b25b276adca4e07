use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = PurchaseItem)]
#[sea_orm(table_name = "purchase_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub purchase_id: Uuid,
    pub supplier_id: Option<Uuid>,
    pub supplier_name: String,
    pub item_name: String,
    pub unit: String,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub quantity: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub unit_cost: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub gst_rate: Decimal,
    #[sea_orm(column_type = "Json")]
    pub details: ItemDetails,
}

/// Kind-specific line-item fields, stored as a tagged JSON column.
/// Each variant carries only the fields that make sense for its kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemDetails {
    Fabric {
        color: Option<String>,
        gsm: Option<i32>,
    },
    Buttons {
        size_ligne: Option<i32>,
    },
    Packets {
        pieces_per_packet: Option<i32>,
    },
    Machine {
        model_no: Option<String>,
    },
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::purchase::Entity",
        from = "Column::PurchaseId",
        to = "super::purchase::Column::Id"
    )]
    Purchase,
}

impl Related<super::purchase::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchase.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
