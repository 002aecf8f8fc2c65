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
use crate::entities::order::{self, Entity as OrderEntity, Model as OrderModel, OrderStatus};
use crate::entities::user::Entity as UserEntity;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::stock::StockController;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct PlaceOrderRequest {
    pub user_id: Uuid,
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateOrderStatusRequest {
    /// Target status: completed or canceled.
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    #[schema(value_type = String, example = "7.50")]
    pub total_price: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderListResponse {
    pub orders: Vec<OrderResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Service for placing orders and driving their status lifecycle.
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl OrderService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Places an order: reserves stock and records the order atomically.
    ///
    /// The total price is computed server side from the product's listed
    /// price at reservation time. Either both the stock decrement and the
    /// order row commit, or neither does.
    #[instrument(skip(self, request), fields(user_id = %request.user_id, product_id = %request.product_id, quantity = request.quantity))]
    pub async fn place_order(
        &self,
        request: PlaceOrderRequest,
    ) -> Result<OrderResponse, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;

        UserEntity::find_by_id(request.user_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("User with ID {} not found", request.user_id))
            })?;

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for order placement");
            ServiceError::DatabaseError(e)
        })?;

        let product =
            StockController::reserve(&txn, request.product_id, request.quantity).await?;

        let total_price = product.price * Decimal::from(request.quantity);
        let order_id = Uuid::new_v4();
        let now = Utc::now();

        let model = order::ActiveModel {
            id: Set(order_id),
            user_id: Set(request.user_id),
            product_id: Set(request.product_id),
            quantity: Set(request.quantity),
            total_price: Set(total_price),
            status: Set(OrderStatus::Pending.to_string()),
            created_at: Set(now),
        };

        let order = model.insert(&txn).await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to insert order");
            ServiceError::DatabaseError(e)
        })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to commit order placement");
            ServiceError::DatabaseError(e)
        })?;

        info!(order_id = %order_id, total_price = %total_price, "Order placed successfully");

        if let Some(sender) = &self.event_sender {
            sender
                .send(Event::OrderPlaced {
                    order_id,
                    user_id: request.user_id,
                    product_name: product.name,
                    quantity: request.quantity,
                    total_price,
                })
                .await;
        }

        Ok(Self::model_to_response(order))
    }

    /// Retrieves a single order by ID.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: Uuid) -> Result<OrderResponse, ServiceError> {
        let order = OrderEntity::find_by_id(order_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Order with ID {} not found", order_id))
            })?;

        Ok(Self::model_to_response(order))
    }

    /// Lists orders with pagination, newest first. An optional user
    /// filter narrows the listing to one buyer's orders.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        user_id: Option<Uuid>,
        page: u64,
        per_page: u64,
    ) -> Result<OrderListResponse, ServiceError> {
        let page = page.max(1);
        let per_page = per_page.clamp(1, 100);

        let mut query = OrderEntity::find().order_by_desc(order::Column::CreatedAt);
        if let Some(user_id) = user_id {
            query = query.filter(order::Column::UserId.eq(user_id));
        }

        let paginator = query.paginate(&*self.db_pool, per_page);
        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(page - 1).await?;

        Ok(OrderListResponse {
            orders: orders.into_iter().map(Self::model_to_response).collect(),
            total,
            page,
            per_page,
        })
    }

    /// Moves an order to a new status, enforcing the lifecycle.
    ///
    /// Pending orders may complete or cancel; completed and canceled are
    /// terminal. Canceling does not restore reserved stock, since the
    /// goods are perishable and may no longer be sellable.
    #[instrument(skip(self, request), fields(order_id = %order_id))]
    pub async fn update_order_status(
        &self,
        order_id: Uuid,
        request: UpdateOrderStatusRequest,
    ) -> Result<OrderResponse, ServiceError> {
        request.validate()?;

        let new_status = OrderStatus::from_str(&request.status).map_err(|_| {
            ServiceError::InvalidInput(format!("Unknown order status '{}'", request.status))
        })?;

        let db = &*self.db_pool;

        let order = OrderEntity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Order with ID {} not found", order_id))
            })?;

        let current = OrderStatus::from_str(&order.status).map_err(|_| {
            ServiceError::InternalError(format!(
                "Order {} has unrecognized status '{}'",
                order_id, order.status
            ))
        })?;

        if !current.can_transition_to(new_status) {
            return Err(ServiceError::Conflict(format!(
                "Cannot move order from {} to {}",
                current, new_status
            )));
        }

        let old_status = order.status.clone();
        let user_id = order.user_id;

        let mut active: order::ActiveModel = order.into();
        active.status = Set(new_status.to_string());
        let updated = active.update(db).await?;

        info!(order_id = %order_id, old_status = %old_status, new_status = %new_status, "Order status updated");

        if let Some(sender) = &self.event_sender {
            sender
                .send(Event::OrderStatusChanged {
                    order_id,
                    user_id,
                    old_status,
                    new_status: new_status.to_string(),
                })
                .await;
        }

        Ok(Self::model_to_response(updated))
    }

    fn model_to_response(model: OrderModel) -> OrderResponse {
        OrderResponse {
            id: model.id,
            user_id: model.user_id,
            product_id: model.product_id,
            quantity: model.quantity,
            total_price: model.total_price,
            status: model.status,
            created_at: model.created_at,
        }
    }
}
