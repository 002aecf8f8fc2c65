use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::services::products::{
    CreateProductRequest, ProductListResponse, ProductResponse, UpdateProductRequest,
};
use crate::{ApiResponse, ApiResult, AppState, ListQuery};

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductBody {
    /// Vendor performing the update. Must own the product.
    pub vendor_id: Uuid,
    #[serde(flatten)]
    pub changes: UpdateProductRequest,
}

#[derive(Debug, Deserialize)]
pub struct VendorParam {
    pub vendor_id: Uuid,
}

/// List a new surplus product
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ApiResponse<ProductResponse>),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
        (status = 404, description = "Vendor not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
async fn create_product(
    State(state): State<AppState>,
    Json(request): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProductResponse>>), crate::errors::ServiceError> {
    let product = state.services.products.create_product(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(product))))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/api/v1/products/:id",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product details", body = ApiResponse<ProductResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ProductResponse> {
    let product = state.services.products.get_product(id).await?;
    Ok(Json(ApiResponse::success(product)))
}

/// List products
#[utoipa::path(
    get,
    path = "/api/v1/products",
    responses(
        (status = 200, description = "Product listing", body = ApiResponse<ProductListResponse>)
    ),
    tag = "Products"
)]
async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<ProductListResponse> {
    let products = state
        .services
        .products
        .list_products(query.page, query.per_page)
        .await?;
    Ok(Json(ApiResponse::success(products)))
}

/// Update a product listing
#[utoipa::path(
    put,
    path = "/api/v1/products/:id",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProductBody,
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<ProductResponse>),
        (status = 403, description = "Not the owning vendor", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateProductBody>,
) -> ApiResult<ProductResponse> {
    let product = state
        .services
        .products
        .update_product(id, body.vendor_id, body.changes)
        .await?;
    Ok(Json(ApiResponse::success(product)))
}

/// Delete a product listing
#[utoipa::path(
    delete,
    path = "/api/v1/products/:id",
    params(
        ("id" = Uuid, Path, description = "Product ID"),
        ("vendor_id" = Uuid, Query, description = "Vendor performing the deletion")
    ),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 403, description = "Not the owning vendor", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Product is referenced", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<VendorParam>,
) -> Result<StatusCode, crate::errors::ServiceError> {
    state
        .services
        .products
        .delete_product(id, params.vendor_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_product))
        .route("/", get(list_products))
        .route("/:id", get(get_product))
        .route("/:id", put(update_product))
        .route("/:id", delete(delete_product))
}
