//! Line-item rules shared by order creation, order mutation and the order
//! item sub-resource.

use std::collections::HashSet;

use uuid::Uuid;

use super::errors::DomainError;
use super::order::{LineItem, LineItemRequest};
use super::product::Product;

pub const SELF_PURCHASE: &str = "Adding your own product to your order is not allowed";

/// Rejects lines with a missing product or a missing/non-positive quantity.
pub fn require_line(line: &LineItemRequest) -> Result<LineItem, DomainError> {
    match (line.product_id, line.quantity) {
        (Some(product_id), Some(quantity)) if quantity > 0 => Ok(LineItem {
            product_id,
            quantity,
        }),
        (Some(_), Some(_)) => Err(DomainError::validation(
            "quantity",
            "Quantity must be a positive integer.",
        )),
        _ => Err(DomainError::validation(
            "order_items",
            "Each item must have a product ID and quantity.",
        )),
    }
}

/// `committed` is the quantity this same order already holds for the product
/// and is added to the product's stock to form the ceiling.
pub fn check_stock(product: &Product, quantity: i32, committed: i32) -> Result<(), DomainError> {
    let ceiling = i64::from(product.stock) + i64::from(committed);
    if i64::from(quantity) > ceiling {
        return Err(DomainError::validation(
            "quantity",
            format!(
                "Ordered quantity for product {} is more than the stock.",
                product.name
            ),
        ));
    }
    Ok(())
}

pub fn check_not_own_product(user_id: Uuid, product: &Product) -> Result<(), DomainError> {
    if product.seller_id == user_id {
        return Err(DomainError::permission_denied(SELF_PURCHASE));
    }
    Ok(())
}

/// Records `product` as seen for this request, failing if it already was.
pub fn check_not_duplicate(seen: &mut HashSet<Uuid>, product: &Product) -> Result<(), DomainError> {
    if !seen.insert(product.id) {
        return Err(DomainError::validation(
            "product",
            format!("Product {} already exists in this order.", product.name),
        ));
    }
    Ok(())
}
