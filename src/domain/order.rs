use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;
use super::product::Product;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }

    /// Staying in place is always legal; only PENDING may move, and only to a
    /// terminal status.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        *self == next
            || matches!(
                (self, next),
                (OrderStatus::Pending, OrderStatus::Completed)
                    | (OrderStatus::Pending, OrderStatus::Cancelled)
            )
    }

    pub fn transition_to(self, next: OrderStatus) -> Result<OrderStatus, DomainError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DomainError::validation(
                "status",
                format!("Cannot change order status from {} to {}.", self, next),
            ))
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(OrderStatus::Pending),
            "COMPLETED" => Ok(OrderStatus::Completed),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            _ => Err(DomainError::validation(
                "status",
                format!("'{}' is not a valid order status.", s),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product: Product,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderItem {
    pub fn price(&self) -> &BigDecimal {
        &self.product.price
    }

    pub fn cost(&self) -> BigDecimal {
        &self.product.price * BigDecimal::from(self.quantity)
    }
}

/// An order together with its current item set.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDetails {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

impl OrderDetails {
    pub fn total_cost(&self) -> BigDecimal {
        self.items
            .iter()
            .fold(BigDecimal::from(0), |acc, item| acc + item.cost())
    }

    pub fn item_for(&self, product_id: Uuid) -> Option<&OrderItem> {
        self.items.iter().find(|i| i.product.id == product_id)
    }
}

/// A requested `(product, quantity)` pair as received at the boundary.
/// Either field may be absent; the workflow rejects incomplete lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineItemRequest {
    pub product_id: Option<Uuid>,
    pub quantity: Option<i32>,
}

impl LineItemRequest {
    pub fn new(product_id: Uuid, quantity: i32) -> Self {
        Self {
            product_id: Some(product_id),
            quantity: Some(quantity),
        }
    }
}

/// A line item whose fields are present and whose quantity is positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineItem {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Default)]
pub struct OrderChanges {
    pub status: Option<OrderStatus>,
    pub order_items: Option<Vec<LineItemRequest>>,
}

impl OrderChanges {
    pub fn touches_items(&self) -> bool {
        self.order_items.as_ref().is_some_and(|items| !items.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct ListResult {
    pub items: Vec<Order>,
    pub total: i64,
}
