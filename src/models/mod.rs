//! Domain value types shared by the store, the services and the HTTP layer.

pub mod product_status;
pub mod sort_mode;

pub use product_status::ProductStatus;
pub use sort_mode::SortMode;
