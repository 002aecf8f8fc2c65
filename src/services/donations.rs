use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::charity::Entity as CharityEntity;
use crate::entities::charity_donation::{
    self, Entity as CharityDonationEntity, Model as CharityDonationModel,
};
use crate::entities::donation::{
    self, Entity as DonationEntity, DonationStatus, Model as DonationModel,
};
use crate::entities::product::Entity as ProductEntity;
use crate::entities::user::Entity as UserEntity;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::stock::StockController;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct DonateMoneyRequest {
    pub user_id: Uuid,
    pub charity_id: Uuid,
    #[schema(value_type = String, example = "25.00")]
    pub amount: Decimal,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct DonateProductRequest {
    pub user_id: Uuid,
    pub charity_id: Uuid,
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateDonationStatusRequest {
    /// Target status: completed or failed.
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DonationResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub charity_id: Uuid,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductDonationResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub charity_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DonationListResponse {
    pub donations: Vec<DonationResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductDonationListResponse {
    pub donations: Vec<ProductDonationResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Service handling monetary and surplus-product donations.
#[derive(Clone)]
pub struct DonationService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl DonationService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Records a monetary donation to a charity.
    #[instrument(skip(self, request), fields(user_id = %request.user_id, charity_id = %request.charity_id))]
    pub async fn donate_money(
        &self,
        request: DonateMoneyRequest,
    ) -> Result<DonationResponse, ServiceError> {
        request.validate()?;

        if request.amount <= Decimal::ZERO {
            return Err(ServiceError::InvalidInput(
                "Donation amount must be positive".to_string(),
            ));
        }

        let db = &*self.db_pool;

        UserEntity::find_by_id(request.user_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("User with ID {} not found", request.user_id))
            })?;

        let charity = CharityEntity::find_by_id(request.charity_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Charity with ID {} not found",
                    request.charity_id
                ))
            })?;

        let donation_id = Uuid::new_v4();
        let model = donation::ActiveModel {
            id: Set(donation_id),
            user_id: Set(request.user_id),
            charity_id: Set(request.charity_id),
            amount: Set(request.amount),
            status: Set(DonationStatus::Pending.to_string()),
            created_at: Set(Utc::now()),
        };

        let saved = model.insert(db).await.map_err(|e| {
            error!(error = %e, donation_id = %donation_id, "Failed to record donation");
            ServiceError::DatabaseError(e)
        })?;

        info!(donation_id = %donation_id, amount = %saved.amount, "Donation recorded");

        if let Some(sender) = &self.event_sender {
            sender
                .send(Event::DonationReceived {
                    donation_id,
                    user_id: saved.user_id,
                    charity_name: charity.name,
                    amount: saved.amount,
                })
                .await;
        }

        Ok(Self::donation_to_response(saved))
    }

    /// Donates surplus product stock to a charity.
    ///
    /// Only charity-eligible products can be donated. The stock decrement
    /// and the donation record commit in one transaction, sharing the
    /// same guarded reservation as order placement.
    #[instrument(skip(self, request), fields(user_id = %request.user_id, charity_id = %request.charity_id, product_id = %request.product_id))]
    pub async fn donate_product(
        &self,
        request: DonateProductRequest,
    ) -> Result<ProductDonationResponse, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;

        UserEntity::find_by_id(request.user_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("User with ID {} not found", request.user_id))
            })?;

        let charity = CharityEntity::find_by_id(request.charity_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Charity with ID {} not found",
                    request.charity_id
                ))
            })?;

        let product = ProductEntity::find_by_id(request.product_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Product with ID {} not found",
                    request.product_id
                ))
            })?;

        if !product.charity_eligible {
            return Err(ServiceError::InvalidInput(format!(
                "Product {} is not marked as eligible for donation",
                request.product_id
            )));
        }

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for product donation");
            ServiceError::DatabaseError(e)
        })?;

        let product =
            StockController::reserve(&txn, request.product_id, request.quantity).await?;

        let donation_id = Uuid::new_v4();
        let model = charity_donation::ActiveModel {
            id: Set(donation_id),
            user_id: Set(request.user_id),
            charity_id: Set(request.charity_id),
            product_id: Set(request.product_id),
            quantity: Set(request.quantity),
            created_at: Set(Utc::now()),
        };

        let saved = model.insert(&txn).await.map_err(|e| {
            error!(error = %e, donation_id = %donation_id, "Failed to insert product donation");
            ServiceError::DatabaseError(e)
        })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, donation_id = %donation_id, "Failed to commit product donation");
            ServiceError::DatabaseError(e)
        })?;

        info!(donation_id = %donation_id, quantity = request.quantity, "Product donation recorded");

        if let Some(sender) = &self.event_sender {
            sender
                .send(Event::ProductDonated {
                    donation_id,
                    user_id: saved.user_id,
                    charity_name: charity.name,
                    product_name: product.name,
                    quantity: saved.quantity,
                })
                .await;
        }

        Ok(Self::product_donation_to_response(saved))
    }

    /// Retrieves a single monetary donation by ID.
    #[instrument(skip(self), fields(donation_id = %donation_id))]
    pub async fn get_donation(&self, donation_id: Uuid) -> Result<DonationResponse, ServiceError> {
        let donation = DonationEntity::find_by_id(donation_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Donation with ID {} not found", donation_id))
            })?;

        Ok(Self::donation_to_response(donation))
    }

    /// Lists monetary donations, optionally narrowed to one charity.
    #[instrument(skip(self))]
    pub async fn list_donations(
        &self,
        charity_id: Option<Uuid>,
        page: u64,
        per_page: u64,
    ) -> Result<DonationListResponse, ServiceError> {
        let page = page.max(1);
        let per_page = per_page.clamp(1, 100);

        let mut query = DonationEntity::find().order_by_desc(donation::Column::CreatedAt);
        if let Some(charity_id) = charity_id {
            query = query.filter(donation::Column::CharityId.eq(charity_id));
        }

        let paginator = query.paginate(&*self.db_pool, per_page);
        let total = paginator.num_items().await?;
        let donations = paginator.fetch_page(page - 1).await?;

        Ok(DonationListResponse {
            donations: donations
                .into_iter()
                .map(Self::donation_to_response)
                .collect(),
            total,
            page,
            per_page,
        })
    }

    /// Lists product donations, optionally narrowed to one charity.
    #[instrument(skip(self))]
    pub async fn list_product_donations(
        &self,
        charity_id: Option<Uuid>,
        page: u64,
        per_page: u64,
    ) -> Result<ProductDonationListResponse, ServiceError> {
        let page = page.max(1);
        let per_page = per_page.clamp(1, 100);

        let mut query =
            CharityDonationEntity::find().order_by_desc(charity_donation::Column::CreatedAt);
        if let Some(charity_id) = charity_id {
            query = query.filter(charity_donation::Column::CharityId.eq(charity_id));
        }

        let paginator = query.paginate(&*self.db_pool, per_page);
        let total = paginator.num_items().await?;
        let donations = paginator.fetch_page(page - 1).await?;

        Ok(ProductDonationListResponse {
            donations: donations
                .into_iter()
                .map(Self::product_donation_to_response)
                .collect(),
            total,
            page,
            per_page,
        })
    }

    /// Moves a monetary donation to a new status. Only pending donations
    /// move; completed and failed are terminal.
    #[instrument(skip(self, request), fields(donation_id = %donation_id))]
    pub async fn update_donation_status(
        &self,
        donation_id: Uuid,
        request: UpdateDonationStatusRequest,
    ) -> Result<DonationResponse, ServiceError> {
        request.validate()?;

        let new_status = DonationStatus::from_str(&request.status).map_err(|_| {
            ServiceError::InvalidInput(format!("Unknown donation status '{}'", request.status))
        })?;

        let db = &*self.db_pool;

        let donation = DonationEntity::find_by_id(donation_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Donation with ID {} not found", donation_id))
            })?;

        let current = DonationStatus::from_str(&donation.status).map_err(|_| {
            ServiceError::InternalError(format!(
                "Donation {} has unrecognized status '{}'",
                donation_id, donation.status
            ))
        })?;

        if !current.can_transition_to(new_status) {
            return Err(ServiceError::Conflict(format!(
                "Cannot move donation from {} to {}",
                current, new_status
            )));
        }

        let old_status = donation.status.clone();
        let user_id = donation.user_id;

        let mut active: donation::ActiveModel = donation.into();
        active.status = Set(new_status.to_string());
        let updated = active.update(db).await?;

        info!(donation_id = %donation_id, old_status = %old_status, new_status = %new_status, "Donation status updated");

        if let Some(sender) = &self.event_sender {
            sender
                .send(Event::DonationStatusChanged {
                    donation_id,
                    user_id,
                    old_status,
                    new_status: new_status.to_string(),
                })
                .await;
        }

        Ok(Self::donation_to_response(updated))
    }

    fn donation_to_response(model: DonationModel) -> DonationResponse {
        DonationResponse {
            id: model.id,
            user_id: model.user_id,
            charity_id: model.charity_id,
            amount: model.amount,
            status: model.status,
            created_at: model.created_at,
        }
    }

    fn product_donation_to_response(model: CharityDonationModel) -> ProductDonationResponse {
        ProductDonationResponse {
            id: model.id,
            user_id: model.user_id,
            charity_id: model.charity_id,
            product_id: model.product_id,
            quantity: model.quantity,
            created_at: model.created_at,
        }
    }
}
