use std::sync::Arc;

use chrono::{NaiveDate, Utc};
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
use crate::entities::charity_donation::Entity as CharityDonationEntity;
use crate::entities::order::Entity as OrderEntity;
use crate::entities::product::{self, Entity as ProductEntity, Model as ProductModel};
use crate::entities::vendor::Entity as VendorEntity;
use crate::entities::{charity_donation, order};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Date format accepted for product expiry dates.
const EXPIRY_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, message = "Product name is required"))]
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = String, example = "2.50")]
    pub price: Decimal,
    pub quantity: i32,
    /// Expiry date in YYYY-MM-DD format.
    #[schema(example = "2025-03-01")]
    pub expiry_date: String,
    pub vendor_id: Uuid,
    #[serde(default)]
    pub charity_eligible: bool,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, message = "Product name cannot be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<String>, example = "1.75")]
    pub price: Option<Decimal>,
    pub quantity: Option<i32>,
    /// Expiry date in YYYY-MM-DD format.
    pub expiry_date: Option<String>,
    pub charity_eligible: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub quantity: i32,
    /// Expiry date in YYYY-MM-DD format.
    #[schema(value_type = String, example = "2025-03-01")]
    pub expiry_date: NaiveDate,
    pub vendor_id: Uuid,
    pub charity_eligible: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductListResponse {
    pub products: Vec<ProductResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

fn parse_expiry_date(raw: &str) -> Result<NaiveDate, ServiceError> {
    NaiveDate::parse_from_str(raw, EXPIRY_DATE_FORMAT).map_err(|_| {
        ServiceError::InvalidInput(format!(
            "Invalid expiry date '{}', expected YYYY-MM-DD",
            raw
        ))
    })
}

/// Service managing the surplus product catalog.
#[derive(Clone)]
pub struct ProductService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl ProductService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Lists a new surplus product for a vendor.
    #[instrument(skip(self, request), fields(vendor_id = %request.vendor_id, name = %request.name))]
    pub async fn create_product(
        &self,
        request: CreateProductRequest,
    ) -> Result<ProductResponse, ServiceError> {
        request.validate()?;

        if request.price < Decimal::ZERO {
            return Err(ServiceError::InvalidInput(
                "Price cannot be negative".to_string(),
            ));
        }
        if request.quantity < 0 {
            return Err(ServiceError::InvalidInput(
                "Quantity cannot be negative".to_string(),
            ));
        }
        let expiry_date = parse_expiry_date(&request.expiry_date)?;

        let db = &*self.db_pool;

        VendorEntity::find_by_id(request.vendor_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Vendor with ID {} not found",
                    request.vendor_id
                ))
            })?;

        let product_id = Uuid::new_v4();
        let model = product::ActiveModel {
            id: Set(product_id),
            name: Set(request.name.clone()),
            description: Set(request.description),
            price: Set(request.price),
            quantity: Set(request.quantity),
            expiry_date: Set(expiry_date),
            vendor_id: Set(request.vendor_id),
            charity_eligible: Set(request.charity_eligible),
            created_at: Set(Utc::now()),
        };

        let product = model.insert(db).await.map_err(|e| {
            error!(error = %e, product_id = %product_id, "Failed to create product");
            ServiceError::DatabaseError(e)
        })?;

        info!(product_id = %product_id, "Product created successfully");

        if let Some(sender) = &self.event_sender {
            sender
                .send(Event::ProductCreated {
                    product_id,
                    name: product.name.clone(),
                    vendor_id: product.vendor_id,
                })
                .await;
        }

        Ok(Self::model_to_response(product))
    }

    /// Retrieves a single product by ID.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product(&self, product_id: Uuid) -> Result<ProductResponse, ServiceError> {
        let product = ProductEntity::find_by_id(product_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product with ID {} not found", product_id))
            })?;

        Ok(Self::model_to_response(product))
    }

    /// Lists products with pagination, newest first.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<ProductListResponse, ServiceError> {
        let page = page.max(1);
        let per_page = per_page.clamp(1, 100);

        let paginator = ProductEntity::find()
            .order_by_desc(product::Column::CreatedAt)
            .paginate(&*self.db_pool, per_page);

        let total = paginator.num_items().await?;
        let products = paginator.fetch_page(page - 1).await?;

        Ok(ProductListResponse {
            products: products.into_iter().map(Self::model_to_response).collect(),
            total,
            page,
            per_page,
        })
    }

    /// Updates a product. Only the owning vendor may modify a listing.
    #[instrument(skip(self, request), fields(product_id = %product_id, vendor_id = %vendor_id))]
    pub async fn update_product(
        &self,
        product_id: Uuid,
        vendor_id: Uuid,
        request: UpdateProductRequest,
    ) -> Result<ProductResponse, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;

        let product = ProductEntity::find_by_id(product_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product with ID {} not found", product_id))
            })?;

        if product.vendor_id != vendor_id {
            return Err(ServiceError::Forbidden(
                "Only the owning vendor can modify this product".to_string(),
            ));
        }

        if let Some(price) = request.price {
            if price < Decimal::ZERO {
                return Err(ServiceError::InvalidInput(
                    "Price cannot be negative".to_string(),
                ));
            }
        }
        if let Some(quantity) = request.quantity {
            if quantity < 0 {
                return Err(ServiceError::InvalidInput(
                    "Quantity cannot be negative".to_string(),
                ));
            }
        }

        let mut active: product::ActiveModel = product.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        if let Some(price) = request.price {
            active.price = Set(price);
        }
        if let Some(quantity) = request.quantity {
            active.quantity = Set(quantity);
        }
        if let Some(raw) = request.expiry_date {
            active.expiry_date = Set(parse_expiry_date(&raw)?);
        }
        if let Some(eligible) = request.charity_eligible {
            active.charity_eligible = Set(eligible);
        }

        let updated = active.update(db).await?;
        info!(product_id = %product_id, "Product updated successfully");

        Ok(Self::model_to_response(updated))
    }

    /// Deletes a product. Refused while orders or donations reference it.
    #[instrument(skip(self), fields(product_id = %product_id, vendor_id = %vendor_id))]
    pub async fn delete_product(
        &self,
        product_id: Uuid,
        vendor_id: Uuid,
    ) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let product = ProductEntity::find_by_id(product_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product with ID {} not found", product_id))
            })?;

        if product.vendor_id != vendor_id {
            return Err(ServiceError::Forbidden(
                "Only the owning vendor can delete this product".to_string(),
            ));
        }

        let order_refs = OrderEntity::find()
            .filter(order::Column::ProductId.eq(product_id))
            .count(db)
            .await?;
        let donation_refs = CharityDonationEntity::find()
            .filter(charity_donation::Column::ProductId.eq(product_id))
            .count(db)
            .await?;

        if order_refs > 0 || donation_refs > 0 {
            return Err(ServiceError::Conflict(format!(
                "Product {} is referenced by existing orders or donations",
                product_id
            )));
        }

        ProductEntity::delete_by_id(product_id).exec(db).await?;
        info!(product_id = %product_id, "Product deleted");

        Ok(())
    }

    fn model_to_response(model: ProductModel) -> ProductResponse {
        ProductResponse {
            id: model.id,
            name: model.name,
            description: model.description,
            price: model.price,
            quantity: model.quantity,
            expiry_date: model.expiry_date,
            vendor_id: model.vendor_id,
            charity_eligible: model.charity_eligible,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_date_round_trips_without_timezone_shift() {
        let parsed = parse_expiry_date("2025-03-01").unwrap();
        assert_eq!(parsed.format(EXPIRY_DATE_FORMAT).to_string(), "2025-03-01");
    }

    #[test]
    fn malformed_expiry_date_is_invalid_input() {
        let err = parse_expiry_date("03/01/2025").unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        let err = parse_expiry_date("2025-13-40").unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }
}
