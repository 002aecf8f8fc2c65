use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use crate::services::charities::{CharityListResponse, CharityResponse, CreateCharityRequest};
use crate::{ApiResponse, ApiResult, AppState, ListQuery};

/// Register a charity
#[utoipa::path(
    post,
    path = "/api/v1/charities",
    request_body = CreateCharityRequest,
    responses(
        (status = 201, description = "Charity registered", body = ApiResponse<CharityResponse>),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse)
    ),
    tag = "Charities"
)]
async fn create_charity(
    State(state): State<AppState>,
    Json(request): Json<CreateCharityRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CharityResponse>>), crate::errors::ServiceError> {
    let charity = state.services.charities.create_charity(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(charity))))
}

/// Get a charity by ID
#[utoipa::path(
    get,
    path = "/api/v1/charities/:id",
    params(("id" = Uuid, Path, description = "Charity ID")),
    responses(
        (status = 200, description = "Charity details", body = ApiResponse<CharityResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Charities"
)]
async fn get_charity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<CharityResponse> {
    let charity = state.services.charities.get_charity(id).await?;
    Ok(Json(ApiResponse::success(charity)))
}

/// List charities
#[utoipa::path(
    get,
    path = "/api/v1/charities",
    responses(
        (status = 200, description = "Charity listing", body = ApiResponse<CharityListResponse>)
    ),
    tag = "Charities"
)]
async fn list_charities(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<CharityListResponse> {
    let charities = state
        .services
        .charities
        .list_charities(query.page, query.per_page)
        .await?;
    Ok(Json(ApiResponse::success(charities)))
}

pub fn charity_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_charity))
        .route("/", get(list_charities))
        .route("/:id", get(get_charity))
}
