pub mod identity;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod wishlist;

use bigdecimal::BigDecimal;

/// Renders a money amount with two decimal places, e.g. `"30.00"`.
pub fn money(amount: &BigDecimal) -> String {
    amount.with_scale(2).to_string()
}

pub(crate) fn default_page() -> i64 {
    1
}
