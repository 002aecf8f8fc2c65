use std::sync::Arc;

use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::charity::{self, Entity as CharityEntity, Model as CharityModel};
use crate::errors::ServiceError;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCharityRequest {
    #[validate(length(min = 1, message = "Charity name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    #[validate(length(min = 1, message = "Contact is required"))]
    pub contact: String,
    pub website: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CharityResponse {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub contact: String,
    pub website: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CharityListResponse {
    pub charities: Vec<CharityResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Service managing the charity registry.
#[derive(Clone)]
pub struct CharityService {
    db_pool: Arc<DbPool>,
}

impl CharityService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_charity(
        &self,
        request: CreateCharityRequest,
    ) -> Result<CharityResponse, ServiceError> {
        request.validate()?;

        let charity_id = Uuid::new_v4();
        let model = charity::ActiveModel {
            id: Set(charity_id),
            name: Set(request.name),
            location: Set(request.location),
            contact: Set(request.contact),
            website: Set(request.website),
        };

        let saved = model.insert(&*self.db_pool).await?;
        info!(charity_id = %charity_id, "Charity registered");

        Ok(Self::model_to_response(saved))
    }

    #[instrument(skip(self), fields(charity_id = %charity_id))]
    pub async fn get_charity(&self, charity_id: Uuid) -> Result<CharityResponse, ServiceError> {
        let charity = CharityEntity::find_by_id(charity_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Charity with ID {} not found", charity_id))
            })?;

        Ok(Self::model_to_response(charity))
    }

    #[instrument(skip(self))]
    pub async fn list_charities(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<CharityListResponse, ServiceError> {
        let page = page.max(1);
        let per_page = per_page.clamp(1, 100);

        let paginator = CharityEntity::find()
            .order_by_asc(charity::Column::Name)
            .paginate(&*self.db_pool, per_page);

        let total = paginator.num_items().await?;
        let charities = paginator.fetch_page(page - 1).await?;

        Ok(CharityListResponse {
            charities: charities.into_iter().map(Self::model_to_response).collect(),
            total,
            page,
            per_page,
        })
    }

    fn model_to_response(model: CharityModel) -> CharityResponse {
        CharityResponse {
            id: model.id,
            name: model.name,
            location: model.location,
            contact: model.contact,
            website: model.website,
        }
    }
}
