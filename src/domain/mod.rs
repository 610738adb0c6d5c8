pub mod errors;
pub mod identity;
pub mod order;
pub mod permissions;
pub mod ports;
pub mod product;
pub mod rules;
pub mod wishlist;
