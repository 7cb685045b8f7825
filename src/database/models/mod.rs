//! Persistence accessors, one module per entity.
//!
//! Listing accessors (`get_X_by_Y_id`) never verify that the parent exists:
//! an empty list means "nothing matched", not "parent missing".

pub mod account;
pub mod business;
pub mod order;
pub mod payment;
pub mod photo;
pub mod product;
pub mod review;

pub use account::{AccountError, ACCOUNT_SCHEMA};
pub use business::BUSINESS_SCHEMA;
pub use order::ORDER_SCHEMA;
pub use payment::PAYMENT_SCHEMA;
pub use photo::PHOTO_SCHEMA;
pub use product::PRODUCT_SCHEMA;
pub use review::REVIEW_SCHEMA;
