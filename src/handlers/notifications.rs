use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use uuid::Uuid;

use crate::services::notifications::{
    CreateNotificationRequest, NotificationListResponse, NotificationResponse,
};
use crate::{ApiResponse, ApiResult, AppState, ListQuery};

/// Create a notification directly
#[utoipa::path(
    post,
    path = "/api/v1/notifications",
    request_body = CreateNotificationRequest,
    responses(
        (status = 201, description = "Notification created", body = ApiResponse<NotificationResponse>),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Notifications"
)]
async fn create_notification(
    State(state): State<AppState>,
    Json(request): Json<CreateNotificationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<NotificationResponse>>), crate::errors::ServiceError> {
    let notification = state
        .services
        .notifications
        .create_notification(request)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(notification)),
    ))
}

/// List a user's notifications
#[utoipa::path(
    get,
    path = "/api/v1/notifications/user/:user_id",
    params(("user_id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Notification listing", body = ApiResponse<NotificationListResponse>)
    ),
    tag = "Notifications"
)]
async fn list_user_notifications(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> ApiResult<NotificationListResponse> {
    let notifications = state
        .services
        .notifications
        .list_for_user(user_id, query.page, query.per_page)
        .await?;
    Ok(Json(ApiResponse::success(notifications)))
}

/// Mark a notification as read
#[utoipa::path(
    put,
    path = "/api/v1/notifications/:id/read",
    params(("id" = Uuid, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification marked read", body = ApiResponse<NotificationResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Notifications"
)]
async fn mark_notification_read(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<NotificationResponse> {
    let notification = state.services.notifications.mark_read(id).await?;
    Ok(Json(ApiResponse::success(notification)))
}

/// Delete a notification
#[utoipa::path(
    delete,
    path = "/api/v1/notifications/:id",
    params(("id" = Uuid, Path, description = "Notification ID")),
    responses(
        (status = 204, description = "Notification deleted"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Notifications"
)]
async fn delete_notification(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, crate::errors::ServiceError> {
    state.services.notifications.delete_notification(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_notification))
        .route("/user/:user_id", get(list_user_notifications))
        .route("/:id/read", put(mark_notification_read))
        .route("/:id", delete(delete_notification))
}
