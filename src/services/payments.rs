use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::order::Entity as OrderEntity;
use crate::entities::payment::{
    self, Entity as PaymentEntity, Model as PaymentModel, PaymentMethod, PaymentStatus,
};
use crate::entities::user::Entity as UserEntity;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct RecordPaymentRequest {
    pub user_id: Uuid,
    pub order_id: Uuid,
    #[schema(value_type = String, example = "7.50")]
    pub amount: Decimal,
    /// Payment method: card, paypal or upi.
    #[validate(length(min = 1, message = "Payment method is required"))]
    pub payment_method: String,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdatePaymentStatusRequest {
    /// Target status: completed or failed.
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub order_id: Uuid,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub status: String,
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentListResponse {
    pub payments: Vec<PaymentResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Service recording payments against orders.
#[derive(Clone)]
pub struct PaymentService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl PaymentService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Records a payment for an order.
    ///
    /// The amount must equal the order total exactly. Decimal comparison
    /// is strict, with no tolerance window, so a payment of 7.49 against
    /// a 7.50 order is refused and nothing is persisted.
    #[instrument(skip(self, request), fields(user_id = %request.user_id, order_id = %request.order_id))]
    pub async fn record_payment(
        &self,
        request: RecordPaymentRequest,
    ) -> Result<PaymentResponse, ServiceError> {
        request.validate()?;

        let method = PaymentMethod::from_str(&request.payment_method).map_err(|_| {
            ServiceError::InvalidInput(format!(
                "Unknown payment method '{}'",
                request.payment_method
            ))
        })?;

        if request.amount <= Decimal::ZERO {
            return Err(ServiceError::InvalidInput(
                "Payment amount must be positive".to_string(),
            ));
        }

        let db = &*self.db_pool;

        UserEntity::find_by_id(request.user_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("User with ID {} not found", request.user_id))
            })?;

        let order = OrderEntity::find_by_id(request.order_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Order with ID {} not found",
                    request.order_id
                ))
            })?;

        if request.amount != order.total_price {
            return Err(ServiceError::AmountMismatch(format!(
                "payment of {} does not match order total {}",
                request.amount, order.total_price
            )));
        }

        let payment_id = Uuid::new_v4();
        let model = payment::ActiveModel {
            id: Set(payment_id),
            user_id: Set(request.user_id),
            order_id: Set(request.order_id),
            amount: Set(request.amount),
            status: Set(PaymentStatus::Pending.to_string()),
            payment_method: Set(method.to_string()),
            created_at: Set(Utc::now()),
        };

        let saved = model.insert(db).await.map_err(|e| {
            error!(error = %e, payment_id = %payment_id, "Failed to record payment");
            ServiceError::DatabaseError(e)
        })?;

        info!(payment_id = %payment_id, amount = %saved.amount, "Payment recorded");

        if let Some(sender) = &self.event_sender {
            sender
                .send(Event::PaymentRecorded {
                    payment_id,
                    user_id: saved.user_id,
                    order_id: saved.order_id,
                    amount: saved.amount,
                })
                .await;
        }

        Ok(Self::model_to_response(saved))
    }

    /// Retrieves a single payment by ID.
    #[instrument(skip(self), fields(payment_id = %payment_id))]
    pub async fn get_payment(&self, payment_id: Uuid) -> Result<PaymentResponse, ServiceError> {
        let payment = PaymentEntity::find_by_id(payment_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Payment with ID {} not found", payment_id))
            })?;

        Ok(Self::model_to_response(payment))
    }

    /// Lists payments with pagination, optionally narrowed to one order.
    #[instrument(skip(self))]
    pub async fn list_payments(
        &self,
        order_id: Option<Uuid>,
        page: u64,
        per_page: u64,
    ) -> Result<PaymentListResponse, ServiceError> {
        let page = page.max(1);
        let per_page = per_page.clamp(1, 100);

        let mut query = PaymentEntity::find().order_by_desc(payment::Column::CreatedAt);
        if let Some(order_id) = order_id {
            query = query.filter(payment::Column::OrderId.eq(order_id));
        }

        let paginator = query.paginate(&*self.db_pool, per_page);
        let total = paginator.num_items().await?;
        let payments = paginator.fetch_page(page - 1).await?;

        Ok(PaymentListResponse {
            payments: payments.into_iter().map(Self::model_to_response).collect(),
            total,
            page,
            per_page,
        })
    }

    /// Moves a payment to a new status. Only pending payments move;
    /// completed and failed are terminal.
    #[instrument(skip(self, request), fields(payment_id = %payment_id))]
    pub async fn update_payment_status(
        &self,
        payment_id: Uuid,
        request: UpdatePaymentStatusRequest,
    ) -> Result<PaymentResponse, ServiceError> {
        request.validate()?;

        let new_status = PaymentStatus::from_str(&request.status).map_err(|_| {
            ServiceError::InvalidInput(format!("Unknown payment status '{}'", request.status))
        })?;

        let db = &*self.db_pool;

        let payment = PaymentEntity::find_by_id(payment_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Payment with ID {} not found", payment_id))
            })?;

        let current = PaymentStatus::from_str(&payment.status).map_err(|_| {
            ServiceError::InternalError(format!(
                "Payment {} has unrecognized status '{}'",
                payment_id, payment.status
            ))
        })?;

        if !current.can_transition_to(new_status) {
            return Err(ServiceError::Conflict(format!(
                "Cannot move payment from {} to {}",
                current, new_status
            )));
        }

        let old_status = payment.status.clone();
        let user_id = payment.user_id;

        let mut active: payment::ActiveModel = payment.into();
        active.status = Set(new_status.to_string());
        let updated = active.update(db).await?;

        info!(payment_id = %payment_id, old_status = %old_status, new_status = %new_status, "Payment status updated");

        if let Some(sender) = &self.event_sender {
            sender
                .send(Event::PaymentStatusChanged {
                    payment_id,
                    user_id,
                    old_status,
                    new_status: new_status.to_string(),
                })
                .await;
        }

        Ok(Self::model_to_response(updated))
    }

    fn model_to_response(model: PaymentModel) -> PaymentResponse {
        PaymentResponse {
            id: model.id,
            user_id: model.user_id,
            order_id: model.order_id,
            amount: model.amount,
            status: model.status,
            payment_method: model.payment_method,
            created_at: model.created_at,
        }
    }
}
