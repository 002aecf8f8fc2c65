pub mod charity;
pub mod charity_donation;
pub mod donation;
pub mod notification;
pub mod order;
pub mod payment;
pub mod product;
pub mod user;
pub mod vendor;
