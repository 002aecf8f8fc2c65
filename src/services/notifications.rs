use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::notification::{
    self, Entity as NotificationEntity, Model as NotificationModel,
};
use crate::entities::user::Entity as UserEntity;
use crate::errors::ServiceError;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateNotificationRequest {
    pub user_id: Uuid,
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NotificationResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub read_status: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NotificationListResponse {
    pub notifications: Vec<NotificationResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Service for user notifications. Most notifications are written by the
/// event loop; this service covers direct creation and the read side.
#[derive(Clone)]
pub struct NotificationService {
    db_pool: Arc<DbPool>,
}

impl NotificationService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request), fields(user_id = %request.user_id))]
    pub async fn create_notification(
        &self,
        request: CreateNotificationRequest,
    ) -> Result<NotificationResponse, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;

        UserEntity::find_by_id(request.user_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("User with ID {} not found", request.user_id))
            })?;

        let notification_id = Uuid::new_v4();
        let model = notification::ActiveModel {
            id: Set(notification_id),
            user_id: Set(request.user_id),
            message: Set(request.message),
            read_status: Set(false),
            created_at: Set(Utc::now()),
        };

        let saved = model.insert(db).await?;
        info!(notification_id = %notification_id, "Notification created");

        Ok(Self::model_to_response(saved))
    }

    /// Lists a user's notifications, newest first.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        page: u64,
        per_page: u64,
    ) -> Result<NotificationListResponse, ServiceError> {
        let page = page.max(1);
        let per_page = per_page.clamp(1, 100);

        let paginator = NotificationEntity::find()
            .filter(notification::Column::UserId.eq(user_id))
            .order_by_desc(notification::Column::CreatedAt)
            .paginate(&*self.db_pool, per_page);

        let total = paginator.num_items().await?;
        let notifications = paginator.fetch_page(page - 1).await?;

        Ok(NotificationListResponse {
            notifications: notifications
                .into_iter()
                .map(Self::model_to_response)
                .collect(),
            total,
            page,
            per_page,
        })
    }

    #[instrument(skip(self), fields(notification_id = %notification_id))]
    pub async fn mark_read(
        &self,
        notification_id: Uuid,
    ) -> Result<NotificationResponse, ServiceError> {
        let db = &*self.db_pool;

        let notification = NotificationEntity::find_by_id(notification_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Notification with ID {} not found",
                    notification_id
                ))
            })?;

        let mut active: notification::ActiveModel = notification.into();
        active.read_status = Set(true);
        let updated = active.update(db).await?;

        Ok(Self::model_to_response(updated))
    }

    #[instrument(skip(self), fields(notification_id = %notification_id))]
    pub async fn delete_notification(&self, notification_id: Uuid) -> Result<(), ServiceError> {
        let result = NotificationEntity::delete_by_id(notification_id)
            .exec(&*self.db_pool)
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Notification with ID {} not found",
                notification_id
            )));
        }

        Ok(())
    }

    fn model_to_response(model: NotificationModel) -> NotificationResponse {
        NotificationResponse {
            id: model.id,
            user_id: model.user_id,
            message: model.message,
            read_status: model.read_status,
            created_at: model.created_at,
        }
    }
}
