// Storefront listing views
pub mod listing;

// Catalog management
pub mod categories;
pub mod images;
pub mod products;
pub mod statuses;
pub mod variants;

pub mod slug;
