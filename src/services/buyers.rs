use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::buyer::{self, Entity as BuyerEntity, Model as BuyerModel},
    errors::ServiceError,
    events::{Event, EventSender},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBuyerRequest {
    #[validate(length(min = 1, message = "Buyer name is required"))]
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBuyerRequest {
    #[validate(length(min = 1, message = "Buyer name cannot be empty"))]
    pub name: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Typeahead hit for the buyer search endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct BuyerHit {
    pub id: Uuid,
    pub name: String,
}

#[derive(Clone)]
pub struct BuyerService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl BuyerService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create(&self, request: CreateBuyerRequest) -> Result<BuyerModel, ServiceError> {
        request.validate()?;

        let model = buyer::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            contact_person: Set(request.contact_person),
            phone: Set(request.phone),
            email: Set(request.email),
            address: Set(request.address),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        let created = model.insert(&*self.db_pool).await?;
        self.event_sender.send(Event::BuyerCreated(created.id)).await;
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn list(&self, page: u64, limit: u64) -> Result<(Vec<BuyerModel>, u64), ServiceError> {
        let paginator = BuyerEntity::find()
            .order_by_asc(buyer::Column::Name)
            .paginate(&*self.db_pool, limit);
        let total = paginator.num_items().await?;
        let buyers = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((buyers, total))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<BuyerModel, ServiceError> {
        BuyerEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Buyer {id} not found")))
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateBuyerRequest,
    ) -> Result<BuyerModel, ServiceError> {
        request.validate()?;

        let existing = self.get(id).await?;
        let mut model: buyer::ActiveModel = existing.into();

        if let Some(name) = request.name {
            model.name = Set(name);
        }
        if let Some(contact_person) = request.contact_person {
            model.contact_person = Set(Some(contact_person));
        }
        if let Some(phone) = request.phone {
            model.phone = Set(Some(phone));
        }
        if let Some(email) = request.email {
            model.email = Set(Some(email));
        }
        if let Some(address) = request.address {
            model.address = Set(Some(address));
        }
        model.updated_at = Set(Some(Utc::now()));

        Ok(model.update(&*self.db_pool).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = BuyerEntity::delete_by_id(id).exec(&*self.db_pool).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Buyer {id} not found")));
        }
        Ok(())
    }

    /// Case-insensitive name search for the order-form typeahead.
    /// Results are de-duplicated by name so the client does not have to be.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<BuyerHit>, ServiceError> {
        let buyers = BuyerEntity::find()
            .filter(buyer::Column::Name.contains(query))
            .order_by_asc(buyer::Column::Name)
            .all(&*self.db_pool)
            .await?;

        let mut seen = HashSet::new();
        let hits = buyers
            .into_iter()
            .filter(|b| seen.insert(b.name.to_lowercase()))
            .map(|b| BuyerHit {
                id: b.id,
                name: b.name,
            })
            .collect();
        Ok(hits)
    }
}
