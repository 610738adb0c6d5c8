use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::product::Product;

#[derive(Debug, Clone, PartialEq)]
pub struct WishlistEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product: Product,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of an add: the stored entry and whether this call created it.
#[derive(Debug, Clone)]
pub struct WishlistAddition {
    pub entry: WishlistEntry,
    pub created: bool,
}
