use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::services::donations::{
    DonateMoneyRequest, DonateProductRequest, DonationListResponse, DonationResponse,
    ProductDonationListResponse, ProductDonationResponse, UpdateDonationStatusRequest,
};
use crate::{ApiResponse, ApiResult, AppState, ListQuery};

#[derive(Debug, Deserialize)]
pub struct DonationFilter {
    pub charity_id: Option<Uuid>,
}

/// Donate money to a charity
#[utoipa::path(
    post,
    path = "/api/v1/donations/money",
    request_body = DonateMoneyRequest,
    responses(
        (status = 201, description = "Donation recorded", body = ApiResponse<DonationResponse>),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
        (status = 404, description = "User or charity not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Donations"
)]
async fn donate_money(
    State(state): State<AppState>,
    Json(request): Json<DonateMoneyRequest>,
) -> Result<(StatusCode, Json<ApiResponse<DonationResponse>>), crate::errors::ServiceError> {
    let donation = state.services.donations.donate_money(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(donation))))
}

/// Donate surplus product stock to a charity
#[utoipa::path(
    post,
    path = "/api/v1/donations/products",
    request_body = DonateProductRequest,
    responses(
        (status = 201, description = "Product donation recorded", body = ApiResponse<ProductDonationResponse>),
        (status = 400, description = "Invalid input or insufficient stock", body = crate::errors::ErrorResponse),
        (status = 404, description = "User, charity or product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Donations"
)]
async fn donate_product(
    State(state): State<AppState>,
    Json(request): Json<DonateProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProductDonationResponse>>), crate::errors::ServiceError>
{
    let donation = state.services.donations.donate_product(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(donation))))
}

/// Get a monetary donation by ID
#[utoipa::path(
    get,
    path = "/api/v1/donations/:id",
    params(("id" = Uuid, Path, description = "Donation ID")),
    responses(
        (status = 200, description = "Donation details", body = ApiResponse<DonationResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Donations"
)]
async fn get_donation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<DonationResponse> {
    let donation = state.services.donations.get_donation(id).await?;
    Ok(Json(ApiResponse::success(donation)))
}

/// List monetary donations
#[utoipa::path(
    get,
    path = "/api/v1/donations",
    params(("charity_id" = Option<Uuid>, Query, description = "Filter by charity")),
    responses(
        (status = 200, description = "Donation listing", body = ApiResponse<DonationListResponse>)
    ),
    tag = "Donations"
)]
async fn list_donations(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filter): Query<DonationFilter>,
) -> ApiResult<DonationListResponse> {
    let donations = state
        .services
        .donations
        .list_donations(filter.charity_id, query.page, query.per_page)
        .await?;
    Ok(Json(ApiResponse::success(donations)))
}

/// List product donations
#[utoipa::path(
    get,
    path = "/api/v1/donations/products",
    params(("charity_id" = Option<Uuid>, Query, description = "Filter by charity")),
    responses(
        (status = 200, description = "Product donation listing", body = ApiResponse<ProductDonationListResponse>)
    ),
    tag = "Donations"
)]
async fn list_product_donations(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filter): Query<DonationFilter>,
) -> ApiResult<ProductDonationListResponse> {
    let donations = state
        .services
        .donations
        .list_product_donations(filter.charity_id, query.page, query.per_page)
        .await?;
    Ok(Json(ApiResponse::success(donations)))
}

/// Update a monetary donation's status
#[utoipa::path(
    put,
    path = "/api/v1/donations/:id/status",
    params(("id" = Uuid, Path, description = "Donation ID")),
    request_body = UpdateDonationStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<DonationResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Illegal status transition", body = crate::errors::ErrorResponse)
    ),
    tag = "Donations"
)]
async fn update_donation_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateDonationStatusRequest>,
) -> ApiResult<DonationResponse> {
    let donation = state
        .services
        .donations
        .update_donation_status(id, request)
        .await?;
    Ok(Json(ApiResponse::success(donation)))
}

pub fn donation_routes() -> Router<AppState> {
    Router::new()
        .route("/money", post(donate_money))
        .route("/products", post(donate_product))
        .route("/products", get(list_product_donations))
        .route("/", get(list_donations))
        .route("/:id", get(get_donation))
        .route("/:id/status", put(update_donation_status))
}
