use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::notification;

/// Events emitted by the services after a state change commits.
///
/// Delivery is fire and forget: the services never block on the event
/// channel outcome, and a failed notification write is logged and
/// dropped rather than surfaced to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Order events
    OrderPlaced {
        order_id: Uuid,
        user_id: Uuid,
        product_name: String,
        quantity: i32,
        total_price: Decimal,
    },
    OrderStatusChanged {
        order_id: Uuid,
        user_id: Uuid,
        old_status: String,
        new_status: String,
    },

    // Payment events
    PaymentRecorded {
        payment_id: Uuid,
        user_id: Uuid,
        order_id: Uuid,
        amount: Decimal,
    },
    PaymentStatusChanged {
        payment_id: Uuid,
        user_id: Uuid,
        old_status: String,
        new_status: String,
    },

    // Donation events
    DonationReceived {
        donation_id: Uuid,
        user_id: Uuid,
        charity_name: String,
        amount: Decimal,
    },
    DonationStatusChanged {
        donation_id: Uuid,
        user_id: Uuid,
        old_status: String,
        new_status: String,
    },
    ProductDonated {
        donation_id: Uuid,
        user_id: Uuid,
        charity_name: String,
        product_name: String,
        quantity: i32,
    },

    // Catalog events
    ProductCreated {
        product_id: Uuid,
        name: String,
        vendor_id: Uuid,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event, logging on a closed or full channel instead of
    /// propagating the failure to the state change that emitted it.
    pub async fn send(&self, event: Event) {
        if let Err(e) = self.sender.send(event).await {
            warn!("Failed to enqueue event: {}", e);
        }
    }
}

/// Consumes events and materializes them as notification rows.
pub async fn process_events(mut rx: mpsc::Receiver<Event>, db: Arc<DbPool>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        debug!("Received event: {:?}", event);

        let (user_id, message) = match &event {
            Event::OrderPlaced {
                user_id,
                product_name,
                quantity,
                total_price,
                ..
            } => (
                *user_id,
                format!(
                    "Order placed: {} x {} for {}",
                    quantity, product_name, total_price
                ),
            ),
            Event::OrderStatusChanged {
                order_id,
                user_id,
                new_status,
                ..
            } => (
                *user_id,
                format!("Order {} is now {}", order_id, new_status),
            ),
            Event::PaymentRecorded {
                user_id,
                order_id,
                amount,
                ..
            } => (
                *user_id,
                format!("Payment of {} recorded for order {}", amount, order_id),
            ),
            Event::PaymentStatusChanged {
                payment_id,
                user_id,
                new_status,
                ..
            } => (
                *user_id,
                format!("Payment {} is now {}", payment_id, new_status),
            ),
            Event::DonationReceived {
                user_id,
                charity_name,
                amount,
                ..
            } => (
                *user_id,
                format!("Thank you for donating {} to {}", amount, charity_name),
            ),
            Event::DonationStatusChanged {
                donation_id,
                user_id,
                new_status,
                ..
            } => (
                *user_id,
                format!("Donation {} is now {}", donation_id, new_status),
            ),
            Event::ProductDonated {
                user_id,
                charity_name,
                product_name,
                quantity,
                ..
            } => (
                *user_id,
                format!(
                    "Donated {} x {} to {}",
                    quantity, product_name, charity_name
                ),
            ),
            Event::ProductCreated { name, .. } => {
                info!("Product listed: {}", name);
                continue;
            }
        };

        let row = notification::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            message: Set(message),
            read_status: Set(false),
            created_at: Set(Utc::now()),
        };

        if let Err(e) = row.insert(db.as_ref()).await {
            warn!(
                "Failed to write notification for event {:?}: {}",
                event, e
            );
        }
    }

    info!("Event processing loop stopped");
}
