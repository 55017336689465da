//! sea-orm entities for the catalog schema.
//!
//! Orders, order items and reviews are read-only from this crate's point of
//! view; they exist so sales and rating aggregates can be computed.

pub mod category;
pub mod inventory;
pub mod order;
pub mod order_item;
pub mod product;
pub mod product_image;
pub mod product_status;
pub mod product_variant;
pub mod review;
