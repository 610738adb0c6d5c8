//! Authorization as ordered lists of predicate checks.
//!
//! Each operation assembles the checks that apply to the requested action and
//! evaluates them in order; the first failing check decides the error.

use super::errors::DomainError;
use super::identity::{Actor, Role};
use super::order::Order;
use super::product::Product;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Create,
    ChangeStatus,
    ChangeItems,
    Update,
    Delete,
}

pub type Check<R> = fn(&Actor, &R, Action) -> Result<(), DomainError>;

pub fn authorize<R>(
    actor: &Actor,
    resource: &R,
    action: Action,
    checks: &[Check<R>],
) -> Result<(), DomainError> {
    checks
        .iter()
        .try_for_each(|check| check(actor, resource, action))
}

// ── Orders ───────────────────────────────────────────────────────────────────

pub fn is_buyer_or_staff(actor: &Actor, order: &Order, _action: Action) -> Result<(), DomainError> {
    if actor.is(order.buyer_id) || actor.is_staff {
        Ok(())
    } else {
        Err(DomainError::permission_denied(
            "You do not have permission to access this order.",
        ))
    }
}

pub fn is_pending(_actor: &Actor, order: &Order, _action: Action) -> Result<(), DomainError> {
    if order.status.is_pending() {
        Ok(())
    } else {
        Err(DomainError::permission_denied(
            "Updating or deleting closed order is not allowed.",
        ))
    }
}

pub fn order_checks(action: Action) -> Vec<Check<Order>> {
    let mut checks = vec![is_buyer_or_staff as Check<Order>];
    if matches!(action, Action::ChangeItems | Action::Delete) {
        checks.push(is_pending);
    }
    checks
}

// ── Products ─────────────────────────────────────────────────────────────────

pub fn is_seller_or_admin(actor: &Actor, _: &(), _action: Action) -> Result<(), DomainError> {
    if matches!(actor.role, Role::Seller | Role::Admin) {
        Ok(())
    } else {
        Err(DomainError::permission_denied(
            "Only sellers can list products.",
        ))
    }
}

pub fn is_product_seller(actor: &Actor, product: &Product, _action: Action) -> Result<(), DomainError> {
    if actor.is(product.seller_id) {
        Ok(())
    } else {
        Err(DomainError::permission_denied(
            "You do not have permission to modify this product.",
        ))
    }
}

pub fn product_checks(action: Action) -> Vec<Check<Product>> {
    match action {
        Action::View => vec![],
        _ => vec![is_product_seller as Check<Product>],
    }
}
