use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::services::orders::{
    OrderListResponse, OrderResponse, PlaceOrderRequest, UpdateOrderStatusRequest,
};
use crate::{ApiResponse, ApiResult, AppState, ListQuery};

#[derive(Debug, Deserialize)]
pub struct OrderFilter {
    pub user_id: Option<Uuid>,
}

/// Place an order for surplus product
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Invalid input or insufficient stock", body = crate::errors::ErrorResponse),
        (status = 404, description = "User or product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
async fn place_order(
    State(state): State<AppState>,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderResponse>>), crate::errors::ServiceError> {
    let order = state.services.orders.place_order(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(order))))
}

/// Get an order by ID
#[utoipa::path(
    get,
    path = "/api/v1/orders/:id",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order details", body = ApiResponse<OrderResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
async fn get_order(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<OrderResponse> {
    let order = state.services.orders.get_order(id).await?;
    Ok(Json(ApiResponse::success(order)))
}

/// List orders
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    params(("user_id" = Option<Uuid>, Query, description = "Filter by buyer")),
    responses(
        (status = 200, description = "Order listing", body = ApiResponse<OrderListResponse>)
    ),
    tag = "Orders"
)]
async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filter): Query<OrderFilter>,
) -> ApiResult<OrderListResponse> {
    let orders = state
        .services
        .orders
        .list_orders(filter.user_id, query.page, query.per_page)
        .await?;
    Ok(Json(ApiResponse::success(orders)))
}

/// Update an order's status
#[utoipa::path(
    put,
    path = "/api/v1/orders/:id/status",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<OrderResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Illegal status transition", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateOrderStatusRequest>,
) -> ApiResult<OrderResponse> {
    let order = state
        .services
        .orders
        .update_order_status(id, request)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}

pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(place_order))
        .route("/", get(list_orders))
        .route("/:id", get(get_order))
        .route("/:id/status", put(update_order_status))
}
