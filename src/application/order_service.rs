use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::identity::Actor;
use crate::domain::order::{
    LineItemRequest, ListResult, Order, OrderChanges, OrderDetails, OrderItem,
};
use crate::domain::permissions::{authorize, order_checks, Action};
use crate::domain::ports::{atomically, MarketStore, MarketTx};
use crate::domain::rules;

#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn MarketStore>,
}

impl OrderService {
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        Self { store }
    }

    /// Places a PENDING order for `actor` with one item per line.
    ///
    /// Lines are validated in input order; the first failure aborts the
    /// transaction so no order or item row is written.
    pub fn create_order(
        &self,
        actor: &Actor,
        lines: Vec<LineItemRequest>,
    ) -> Result<OrderDetails, DomainError> {
        let details = atomically(self.store.as_ref(), |tx| {
            tx.lock_products(&line_products(&lines))?;
            let mut seen = HashSet::new();
            let mut staged = Vec::with_capacity(lines.len());
            for line in &lines {
                let line = rules::require_line(line)?;
                let product = tx.lock_product(line.product_id)?.ok_or_else(|| {
                    DomainError::not_found(format!(
                        "Product with ID {} does not exist.",
                        line.product_id
                    ))
                })?;
                rules::check_stock(&product, line.quantity, 0)?;
                rules::check_not_own_product(actor.id, &product)?;
                rules::check_not_duplicate(&mut seen, &product)?;
                staged.push((product, line.quantity));
            }

            let order = tx.insert_order(actor.id)?;
            let items = staged
                .iter()
                .map(|(product, quantity)| tx.insert_order_item(order.id, product, *quantity))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(OrderDetails { order, items })
        })?;

        log::info!(
            "order {} created by {} with {} item(s)",
            details.order.id,
            actor.id,
            details.items.len()
        );
        Ok(details)
    }

    /// Applies a status change and/or add-or-update item reconciliation.
    ///
    /// Items are reconciled before the status moves. Items already on the
    /// order but absent from `changes.order_items` are kept as they are.
    pub fn update_order(
        &self,
        actor: &Actor,
        order_id: Uuid,
        changes: OrderChanges,
    ) -> Result<OrderDetails, DomainError> {
        let details = atomically(self.store.as_ref(), |tx| {
            let order = find_order(tx, order_id)?;
            let action = if changes.touches_items() {
                Action::ChangeItems
            } else {
                Action::ChangeStatus
            };
            authorize(actor, &order, action, &order_checks(action))?;

            let items = tx.order_items(order.id)?;
            let mut details = OrderDetails { order, items };
            if let Some(lines) = changes.order_items.as_deref() {
                reconcile_items(tx, actor, &mut details, lines)?;
            }

            if let Some(next) = changes.status.filter(|next| *next != details.order.status) {
                let next = details.order.status.transition_to(next)?;
                details.order = tx.set_order_status(details.order.id, next)?;
            }
            Ok(details)
        })?;

        log::info!(
            "order {} updated by {} (status {}, {} item(s))",
            details.order.id,
            actor.id,
            details.order.status,
            details.items.len()
        );
        Ok(details)
    }

    pub fn get_order(&self, actor: &Actor, order_id: Uuid) -> Result<OrderDetails, DomainError> {
        atomically(self.store.as_ref(), |tx| {
            let order = find_order(tx, order_id)?;
            authorize(actor, &order, Action::View, &order_checks(Action::View))?;
            let items = tx.order_items(order.id)?;
            Ok(OrderDetails { order, items })
        })
    }

    /// Staff see every order; everyone else sees only their own.
    pub fn list_orders(&self, actor: &Actor, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let buyer = (!actor.is_staff).then_some(actor.id);
        atomically(self.store.as_ref(), |tx| tx.orders(buyer, page, limit))
    }

    pub fn delete_order(&self, actor: &Actor, order_id: Uuid) -> Result<(), DomainError> {
        atomically(self.store.as_ref(), |tx| {
            let order = find_order(tx, order_id)?;
            authorize(actor, &order, Action::Delete, &order_checks(Action::Delete))?;
            tx.delete_order(order.id)
        })?;
        log::info!("order {} deleted by {}", order_id, actor.id);
        Ok(())
    }

    // ── Order item sub-resource ──────────────────────────────────────────────

    pub fn list_items(&self, actor: &Actor, order_id: Uuid) -> Result<Vec<OrderItem>, DomainError> {
        atomically(self.store.as_ref(), |tx| {
            let order = find_order(tx, order_id)?;
            authorize(actor, &order, Action::View, &order_checks(Action::View))?;
            tx.order_items(order.id)
        })
    }

    pub fn get_item(&self, actor: &Actor, order_id: Uuid, item_id: Uuid) -> Result<OrderItem, DomainError> {
        atomically(self.store.as_ref(), |tx| {
            let order = find_order(tx, order_id)?;
            authorize(actor, &order, Action::View, &order_checks(Action::View))?;
            find_item(tx, order.id, item_id)
        })
    }

    pub fn add_item(
        &self,
        actor: &Actor,
        order_id: Uuid,
        line: LineItemRequest,
    ) -> Result<OrderItem, DomainError> {
        let item = atomically(self.store.as_ref(), |tx| {
            let order = find_order(tx, order_id)?;
            authorize(actor, &order, Action::ChangeItems, &order_checks(Action::ChangeItems))?;

            let line = rules::require_line(&line)?;
            let product = tx.lock_product(line.product_id)?.ok_or_else(|| {
                DomainError::not_found(format!("Product with ID {} does not exist.", line.product_id))
            })?;
            rules::check_stock(&product, line.quantity, 0)?;
            if tx.order_items(order.id)?.iter().any(|i| i.product.id == product.id) {
                return Err(DomainError::validation(
                    "product",
                    "Product already exists in your order.",
                ));
            }
            rules::check_not_own_product(actor.id, &product)?;
            rules::check_not_own_product(order.buyer_id, &product)?;
            tx.insert_order_item(order.id, &product, line.quantity)
        })?;
        log::info!("item {} added to order {} by {}", item.id, order_id, actor.id);
        Ok(item)
    }

    /// Changes one item's quantity. The ceiling is the product's stock plus the
    /// quantity the item already holds.
    pub fn update_item(
        &self,
        actor: &Actor,
        order_id: Uuid,
        item_id: Uuid,
        quantity: Option<i32>,
    ) -> Result<OrderItem, DomainError> {
        atomically(self.store.as_ref(), |tx| {
            let order = find_order(tx, order_id)?;
            authorize(actor, &order, Action::ChangeItems, &order_checks(Action::ChangeItems))?;
            let item = find_item(tx, order.id, item_id)?;

            let line = rules::require_line(&LineItemRequest {
                product_id: Some(item.product.id),
                quantity,
            })?;
            let product = tx
                .lock_product(item.product.id)?
                .ok_or_else(|| DomainError::not_found("Product no longer exists."))?;
            rules::check_stock(&product, line.quantity, item.quantity)?;
            rules::check_not_own_product(actor.id, &product)?;
            rules::check_not_own_product(order.buyer_id, &product)?;
            tx.set_item_quantity(&OrderItem { product, ..item }, line.quantity)
        })
    }

    pub fn delete_item(&self, actor: &Actor, order_id: Uuid, item_id: Uuid) -> Result<(), DomainError> {
        atomically(self.store.as_ref(), |tx| {
            let order = find_order(tx, order_id)?;
            authorize(actor, &order, Action::ChangeItems, &order_checks(Action::ChangeItems))?;
            let item = find_item(tx, order.id, item_id)?;
            tx.delete_order_item(item.id)
        })?;
        log::info!("item {} removed from order {} by {}", item_id, order_id, actor.id);
        Ok(())
    }
}

fn find_order(tx: &mut dyn MarketTx, order_id: Uuid) -> Result<Order, DomainError> {
    tx.order(order_id)?
        .ok_or_else(|| DomainError::not_found("Order not found"))
}

fn find_item(tx: &mut dyn MarketTx, order_id: Uuid, item_id: Uuid) -> Result<OrderItem, DomainError> {
    tx.order_items(order_id)?
        .into_iter()
        .find(|item| item.id == item_id)
        .ok_or_else(|| DomainError::not_found("Order item not found"))
}

/// Adds or updates one item per line. Stock ceilings use the quantities
/// committed before this call, and a product may appear only once per payload.
fn reconcile_items(
    tx: &mut dyn MarketTx,
    actor: &Actor,
    details: &mut OrderDetails,
    lines: &[LineItemRequest],
) -> Result<(), DomainError> {
    tx.lock_products(&line_products(lines))?;
    let committed = details.clone();
    let buyer_id = details.order.buyer_id;
    let mut seen = HashSet::new();

    for line in lines {
        let line = rules::require_line(line)?;
        let product = tx.lock_product(line.product_id)?.ok_or_else(|| {
            DomainError::validation(
                "order_items",
                format!("Product with ID {} does not exist.", line.product_id),
            )
        })?;
        let already = committed.item_for(product.id).map_or(0, |item| item.quantity);
        rules::check_stock(&product, line.quantity, already)?;
        rules::check_not_own_product(buyer_id, &product)?;
        rules::check_not_own_product(actor.id, &product)?;
        rules::check_not_duplicate(&mut seen, &product)?;

        let items = &mut details.items;
        match items.iter().position(|item| item.product.id == product.id) {
            Some(idx) => {
                let current = OrderItem {
                    product,
                    ..items[idx].clone()
                };
                items[idx] = tx.set_item_quantity(&current, line.quantity)?;
            }
            None => items.push(tx.insert_order_item(details.order.id, &product, line.quantity)?),
        }
    }
    Ok(())
}

/// Product ids named by `lines`, for locking before validation.
fn line_products(lines: &[LineItemRequest]) -> Vec<Uuid> {
    lines.iter().filter_map(|line| line.product_id).collect()
}
