use std::sync::Arc;

use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{
    charities::CharityService, donations::DonationService, notifications::NotificationService,
    orders::OrderService, payments::PaymentService, products::ProductService,
};

pub mod charities;
pub mod donations;
pub mod notifications;
pub mod orders;
pub mod payments;
pub mod products;

/// Shared service instances wired once at startup.
#[derive(Clone)]
pub struct AppServices {
    pub products: Arc<ProductService>,
    pub orders: Arc<OrderService>,
    pub payments: Arc<PaymentService>,
    pub donations: Arc<DonationService>,
    pub charities: Arc<CharityService>,
    pub notifications: Arc<NotificationService>,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            products: Arc::new(ProductService::new(db.clone(), event_sender.clone())),
            orders: Arc::new(OrderService::new(db.clone(), event_sender.clone())),
            payments: Arc::new(PaymentService::new(db.clone(), event_sender.clone())),
            donations: Arc::new(DonationService::new(db.clone(), event_sender)),
            charities: Arc::new(CharityService::new(db.clone())),
            notifications: Arc::new(NotificationService::new(db)),
        }
    }
}
