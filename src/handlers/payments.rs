use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::services::payments::{
    PaymentListResponse, PaymentResponse, RecordPaymentRequest, UpdatePaymentStatusRequest,
};
use crate::{ApiResponse, ApiResult, AppState, ListQuery};

#[derive(Debug, Deserialize)]
pub struct PaymentFilter {
    pub order_id: Option<Uuid>,
}

/// Record a payment for an order
#[utoipa::path(
    post,
    path = "/api/v1/payments",
    request_body = RecordPaymentRequest,
    responses(
        (status = 201, description = "Payment recorded", body = ApiResponse<PaymentResponse>),
        (status = 400, description = "Invalid input or amount mismatch", body = crate::errors::ErrorResponse),
        (status = 404, description = "User or order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Payments"
)]
async fn record_payment(
    State(state): State<AppState>,
    Json(request): Json<RecordPaymentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PaymentResponse>>), crate::errors::ServiceError> {
    let payment = state.services.payments.record_payment(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(payment))))
}

/// Get a payment by ID
#[utoipa::path(
    get,
    path = "/api/v1/payments/:id",
    params(("id" = Uuid, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Payment details", body = ApiResponse<PaymentResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Payments"
)]
async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<PaymentResponse> {
    let payment = state.services.payments.get_payment(id).await?;
    Ok(Json(ApiResponse::success(payment)))
}

/// List payments
#[utoipa::path(
    get,
    path = "/api/v1/payments",
    params(("order_id" = Option<Uuid>, Query, description = "Filter by order")),
    responses(
        (status = 200, description = "Payment listing", body = ApiResponse<PaymentListResponse>)
    ),
    tag = "Payments"
)]
async fn list_payments(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filter): Query<PaymentFilter>,
) -> ApiResult<PaymentListResponse> {
    let payments = state
        .services
        .payments
        .list_payments(filter.order_id, query.page, query.per_page)
        .await?;
    Ok(Json(ApiResponse::success(payments)))
}

/// Update a payment's status
#[utoipa::path(
    put,
    path = "/api/v1/payments/:id/status",
    params(("id" = Uuid, Path, description = "Payment ID")),
    request_body = UpdatePaymentStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<PaymentResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Illegal status transition", body = crate::errors::ErrorResponse)
    ),
    tag = "Payments"
)]
async fn update_payment_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePaymentStatusRequest>,
) -> ApiResult<PaymentResponse> {
    let payment = state
        .services
        .payments
        .update_payment_status(id, request)
        .await?;
    Ok(Json(ApiResponse::success(payment)))
}

pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(record_payment))
        .route("/", get(list_payments))
        .route("/:id", get(get_payment))
        .route("/:id/status", put(update_payment_status))
}
