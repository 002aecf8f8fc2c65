pub mod charities;
pub mod donations;
pub mod notifications;
pub mod orders;
pub mod payments;
pub mod products;
pub mod stock;
