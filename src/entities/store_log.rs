use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use strum::{Display, EnumString};

/// One worker material-movement event against a store entry.
/// Append-only history; many logs may reference the same entry.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = StoreLog)]
#[sea_orm(table_name = "store_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub store_entry_id: Uuid,
    pub worker_name: String,
    pub log_date: NaiveDate,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StoreLogStatus {
    InStore,
    Out,
    Completed,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::store_entry::Entity",
        from = "Column::StoreEntryId",
        to = "super::store_entry::Column::Id"
    )]
    StoreEntry,
    #[sea_orm(has_many = "super::store_log_item::Entity")]
    StoreLogItem,
}

impl Related<super::store_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StoreEntry.def()
    }
}

impl Related<super::store_log_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StoreLogItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
