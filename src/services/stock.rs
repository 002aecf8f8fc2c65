use sea_orm::{
    sea_query::Expr, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::entities::product::{self, Entity as ProductEntity, Model as ProductModel};
use crate::errors::ServiceError;

/// How many times a reservation re-attempts the conditional decrement
/// after losing a race before giving up with a conflict.
const RESERVE_RETRIES: u32 = 1;

/// Atomic stock reservations against the product table.
///
/// The decrement is a single conditional UPDATE guarded by the current
/// quantity, so two concurrent reservations can never both succeed on
/// the last units. There is no read-then-write window to race through.
pub struct StockController;

impl StockController {
    /// Reserves `quantity` units of a product, decrementing its stock.
    ///
    /// Runs against any connection, including an open transaction, so
    /// callers can bundle the decrement with their own inserts. Returns
    /// the product as it was read after the decrement succeeded.
    #[instrument(skip(conn), fields(product_id = %product_id, quantity = quantity))]
    pub async fn reserve<C: ConnectionTrait>(
        conn: &C,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<ProductModel, ServiceError> {
        if quantity < 1 {
            return Err(ServiceError::InvalidInput(
                "Quantity must be at least 1".to_string(),
            ));
        }

        for attempt in 0..=RESERVE_RETRIES {
            let result = ProductEntity::update_many()
                .col_expr(
                    product::Column::Quantity,
                    Expr::col(product::Column::Quantity).sub(quantity),
                )
                .filter(product::Column::Id.eq(product_id))
                .filter(product::Column::Quantity.gte(quantity))
                .exec(conn)
                .await?;

            if result.rows_affected == 1 {
                let updated = ProductEntity::find_by_id(product_id)
                    .one(conn)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!(
                            "Product with ID {} not found",
                            product_id
                        ))
                    })?;

                info!(
                    remaining = updated.quantity,
                    "Stock reserved successfully"
                );
                return Ok(updated);
            }

            // The guarded update matched nothing. Re-read to find out why.
            let current = ProductEntity::find_by_id(product_id).one(conn).await?;

            match current {
                None => {
                    return Err(ServiceError::NotFound(format!(
                        "Product with ID {} not found",
                        product_id
                    )));
                }
                Some(p) if p.quantity < quantity => {
                    return Err(ServiceError::InsufficientStock(format!(
                        "requested {}, available {}",
                        quantity, p.quantity
                    )));
                }
                Some(_) => {
                    // Enough stock was visible on the re-read, so another
                    // writer got between the update and the read. Retry.
                    warn!(attempt = attempt, "Stock reservation raced, retrying");
                }
            }
        }

        Err(ServiceError::Conflict(format!(
            "Could not reserve stock for product {} due to concurrent updates",
            product_id
        )))
    }
}
