pub mod order_service;
pub mod product_service;
pub mod wishlist_service;

pub use order_service::OrderService;
pub use product_service::ProductService;
pub use wishlist_service::WishlistService;
