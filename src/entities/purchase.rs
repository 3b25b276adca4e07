use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use strum::{Display, EnumString};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = Purchase)]
#[sea_orm(table_name = "purchases")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub purchase_number: String,
    pub order_id: Option<Uuid>,
    pub purchase_date: NaiveDate,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Procurement lifecycle. Transitions are monotone:
/// pending -> partial -> completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PurchaseStatus {
    Pending,
    Partial,
    Completed,
}

impl PurchaseStatus {
    /// Ordering used to reject backwards transitions.
    pub fn rank(self) -> u8 {
        match self {
            PurchaseStatus::Pending => 0,
            PurchaseStatus::Partial => 1,
            PurchaseStatus::Completed => 2,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::purchase_item::Entity")]
    PurchaseItem,
    #[sea_orm(has_many = "super::store_entry::Entity")]
    StoreEntry,
}

impl Related<super::purchase_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseItem.def()
    }
}

impl Related<super::store_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StoreEntry.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
