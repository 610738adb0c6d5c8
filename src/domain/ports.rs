use uuid::Uuid;

use super::errors::DomainError;
use super::order::{ListResult, Order, OrderItem, OrderStatus};
use super::product::{Category, Page, Product, ProductDraft, ProductQuery};
use super::wishlist::WishlistEntry;

/// Row access available inside one transaction.
pub trait MarketTx {
    // ── Catalog ──────────────────────────────────────────────────────────────
    fn product(&mut self, id: Uuid) -> Result<Option<Product>, DomainError>;
    /// Reads a product and holds its row until the transaction ends.
    fn lock_product(&mut self, id: Uuid) -> Result<Option<Product>, DomainError>;
    /// Row-locks every listed product that exists, in ascending id order.
    /// Unknown ids are skipped.
    fn lock_products(&mut self, ids: &[Uuid]) -> Result<(), DomainError>;
    fn products(&mut self, query: &ProductQuery) -> Result<Page<Product>, DomainError>;
    fn slug_taken(&mut self, slug: &str, except: Option<Uuid>) -> Result<bool, DomainError>;
    fn insert_product(&mut self, draft: ProductDraft) -> Result<Product, DomainError>;
    fn save_product(&mut self, product: &Product) -> Result<Product, DomainError>;
    fn delete_product(&mut self, id: Uuid) -> Result<(), DomainError>;
    fn categories(&mut self) -> Result<Vec<Category>, DomainError>;
    fn category(&mut self, id: Uuid) -> Result<Option<Category>, DomainError>;
    fn category_get_or_create(&mut self, name: &str, slug: &str) -> Result<Category, DomainError>;

    // ── Orders ───────────────────────────────────────────────────────────────
    fn order(&mut self, id: Uuid) -> Result<Option<Order>, DomainError>;
    /// Newest first; `buyer_id` restricts the listing to one buyer.
    fn orders(&mut self, buyer_id: Option<Uuid>, page: i64, limit: i64) -> Result<ListResult, DomainError>;
    fn insert_order(&mut self, buyer_id: Uuid) -> Result<Order, DomainError>;
    fn set_order_status(&mut self, id: Uuid, status: OrderStatus) -> Result<Order, DomainError>;
    fn delete_order(&mut self, id: Uuid) -> Result<(), DomainError>;
    fn order_items(&mut self, order_id: Uuid) -> Result<Vec<OrderItem>, DomainError>;
    fn insert_order_item(
        &mut self,
        order_id: Uuid,
        product: &Product,
        quantity: i32,
    ) -> Result<OrderItem, DomainError>;
    fn set_item_quantity(&mut self, item: &OrderItem, quantity: i32) -> Result<OrderItem, DomainError>;
    fn delete_order_item(&mut self, id: Uuid) -> Result<(), DomainError>;

    // ── Wishlist ─────────────────────────────────────────────────────────────
    fn wishlist(&mut self, user_id: Uuid) -> Result<Vec<WishlistEntry>, DomainError>;
    fn wishlist_entry(&mut self, user_id: Uuid, product_id: Uuid) -> Result<Option<WishlistEntry>, DomainError>;
    fn insert_wishlist_entry(&mut self, user_id: Uuid, product: &Product) -> Result<WishlistEntry, DomainError>;
    fn delete_wishlist_entry(&mut self, id: Uuid) -> Result<(), DomainError>;
}

pub type TxWork<'w> = dyn FnMut(&mut dyn MarketTx) -> Result<(), DomainError> + 'w;

pub trait MarketStore: Send + Sync + 'static {
    /// Runs `work` in a single transaction, committing only when it returns `Ok`.
    fn run_in_transaction(&self, work: &mut TxWork<'_>) -> Result<(), DomainError>;
}

/// Runs `work` through `store` and hands back its result.
pub fn atomically<T, F>(store: &dyn MarketStore, work: F) -> Result<T, DomainError>
where
    F: FnOnce(&mut dyn MarketTx) -> Result<T, DomainError>,
{
    let mut work = Some(work);
    let mut output = None;
    store.run_in_transaction(&mut |tx: &mut dyn MarketTx| {
        let work = work
            .take()
            .ok_or_else(|| DomainError::Internal("transaction body ran twice".to_string()))?;
        output = Some(work(tx)?);
        Ok(())
    })?;
    output.ok_or_else(|| DomainError::Internal("transaction produced no result".to_string()))
}
