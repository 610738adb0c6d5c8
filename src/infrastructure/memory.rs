//! In-memory implementation of the store ports, used by tests and by
//! `STORAGE=memory` local runs.
//!
//! A transaction works on a copy of the state that replaces the shared state
//! only when the work returns `Ok`; the lock is held for the whole
//! transaction, so transactions are serialised.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{ListResult, Order, OrderItem, OrderStatus};
use crate::domain::ports::{MarketStore, MarketTx, TxWork};
use crate::domain::product::{
    page_offset, Category, Page, Product, ProductDraft, ProductQuery, ProductSortField,
};
use crate::domain::wishlist::WishlistEntry;

#[derive(Debug, Clone)]
struct StoredItem {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct StoredWish {
    id: Uuid,
    user_id: Uuid,
    product_id: Uuid,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    categories: HashMap<Uuid, Category>,
    products: HashMap<Uuid, Product>,
    orders: HashMap<Uuid, Order>,
    // Insertion order doubles as creation order.
    items: Vec<StoredItem>,
    wishes: Vec<StoredWish>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of orders currently stored.
    pub fn order_count(&self) -> usize {
        self.state.lock().map(|s| s.orders.len()).unwrap_or(0)
    }

    /// Number of order items currently stored across all orders.
    pub fn item_count(&self) -> usize {
        self.state.lock().map(|s| s.items.len()).unwrap_or(0)
    }
}

impl MarketStore for MemoryStore {
    fn run_in_transaction(&self, work: &mut TxWork<'_>) -> Result<(), DomainError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| DomainError::Internal("memory store lock poisoned".to_string()))?;
        let mut draft = state.clone();
        work(&mut MemoryTx { state: &mut draft })?;
        *state = draft;
        Ok(())
    }
}

struct MemoryTx<'s> {
    state: &'s mut MemoryState,
}

impl MemoryTx<'_> {
    fn item(&self, stored: &StoredItem) -> Result<OrderItem, DomainError> {
        let product = self.state.products.get(&stored.product_id).cloned().ok_or_else(|| {
            DomainError::Internal(format!("item {} references a missing product", stored.id))
        })?;
        Ok(OrderItem {
            id: stored.id,
            order_id: stored.order_id,
            product,
            quantity: stored.quantity,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        })
    }

    fn wish(&self, stored: &StoredWish) -> Result<WishlistEntry, DomainError> {
        let product = self.state.products.get(&stored.product_id).cloned().ok_or_else(|| {
            DomainError::Internal(format!("wish {} references a missing product", stored.id))
        })?;
        Ok(WishlistEntry {
            id: stored.id,
            user_id: stored.user_id,
            product,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        })
    }
}

fn compare_products(a: &Product, b: &Product, query: &ProductQuery) -> Ordering {
    let ordering = match query.ordering.field {
        ProductSortField::Name => a.name.cmp(&b.name),
        ProductSortField::Price => a.price.cmp(&b.price),
        ProductSortField::CreatedAt => a.created_at.cmp(&b.created_at),
    };
    let ordering = if query.ordering.descending {
        ordering.reverse()
    } else {
        ordering
    };
    ordering.then_with(|| a.id.cmp(&b.id))
}

impl MarketTx for MemoryTx<'_> {
    fn product(&mut self, id: Uuid) -> Result<Option<Product>, DomainError> {
        Ok(self.state.products.get(&id).cloned())
    }

    fn lock_product(&mut self, id: Uuid) -> Result<Option<Product>, DomainError> {
        self.product(id)
    }

    fn lock_products(&mut self, _ids: &[Uuid]) -> Result<(), DomainError> {
        // The store lock already serialises transactions.
        Ok(())
    }

    fn products(&mut self, query: &ProductQuery) -> Result<Page<Product>, DomainError> {
        let mut matching: Vec<Product> = self
            .state
            .products
            .values()
            .filter(|p| query.matches(p))
            .cloned()
            .collect();
        matching.sort_by(|a, b| compare_products(a, b, query));
        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(usize::try_from(query.offset()).unwrap_or(usize::MAX))
            .take(query.page_size.max(0) as usize)
            .collect();
        Ok(Page { items, total })
    }

    fn slug_taken(&mut self, slug: &str, except: Option<Uuid>) -> Result<bool, DomainError> {
        Ok(self
            .state
            .products
            .values()
            .any(|p| p.slug == slug && Some(p.id) != except))
    }

    fn insert_product(&mut self, draft: ProductDraft) -> Result<Product, DomainError> {
        let category = self
            .state
            .categories
            .get(&draft.category_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("Category not found"))?;
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            seller_id: draft.seller_id,
            category,
            name: draft.name,
            slug: draft.slug,
            description: draft.description,
            ingredients: draft.ingredients,
            price: draft.price,
            stock: draft.stock,
            available: draft.available,
            expiration_date: draft.expiration_date,
            created_at: now,
            updated_at: now,
        };
        self.state.products.insert(product.id, product.clone());
        Ok(product)
    }

    fn save_product(&mut self, product: &Product) -> Result<Product, DomainError> {
        match self.state.products.get_mut(&product.id) {
            Some(stored) => {
                *stored = product.clone();
                Ok(product.clone())
            }
            None => Err(DomainError::not_found("Product not found")),
        }
    }

    fn delete_product(&mut self, id: Uuid) -> Result<(), DomainError> {
        self.state.products.remove(&id);
        self.state.items.retain(|i| i.product_id != id);
        self.state.wishes.retain(|w| w.product_id != id);
        Ok(())
    }

    fn categories(&mut self) -> Result<Vec<Category>, DomainError> {
        let mut categories: Vec<Category> = self.state.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    fn category(&mut self, id: Uuid) -> Result<Option<Category>, DomainError> {
        Ok(self.state.categories.get(&id).cloned())
    }

    fn category_get_or_create(&mut self, name: &str, slug: &str) -> Result<Category, DomainError> {
        if let Some(existing) = self.state.categories.values().find(|c| c.slug == slug) {
            return Ok(existing.clone());
        }
        let category = Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: slug.to_string(),
        };
        self.state.categories.insert(category.id, category.clone());
        Ok(category)
    }

    fn order(&mut self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(self.state.orders.get(&id).cloned())
    }

    fn orders(&mut self, buyer_id: Option<Uuid>, page: i64, limit: i64) -> Result<ListResult, DomainError> {
        let mut matching: Vec<Order> = self
            .state
            .orders
            .values()
            .filter(|o| buyer_id.map_or(true, |b| o.buyer_id == b))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        let total = matching.len() as i64;
        let offset = usize::try_from(page_offset(page, limit)).unwrap_or(usize::MAX);
        let items = matching
            .into_iter()
            .skip(offset)
            .take(limit.max(0) as usize)
            .collect();
        Ok(ListResult { items, total })
    }

    fn insert_order(&mut self, buyer_id: Uuid) -> Result<Order, DomainError> {
        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            buyer_id,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.state.orders.insert(order.id, order.clone());
        Ok(order)
    }

    fn set_order_status(&mut self, id: Uuid, status: OrderStatus) -> Result<Order, DomainError> {
        let order = self
            .state
            .orders
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Order not found"))?;
        order.status = status;
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    fn delete_order(&mut self, id: Uuid) -> Result<(), DomainError> {
        self.state.orders.remove(&id);
        self.state.items.retain(|i| i.order_id != id);
        Ok(())
    }

    fn order_items(&mut self, order_id: Uuid) -> Result<Vec<OrderItem>, DomainError> {
        self.state
            .items
            .iter()
            .filter(|i| i.order_id == order_id)
            .map(|i| self.item(i))
            .collect()
    }

    fn insert_order_item(
        &mut self,
        order_id: Uuid,
        product: &Product,
        quantity: i32,
    ) -> Result<OrderItem, DomainError> {
        if !self.state.orders.contains_key(&order_id) {
            return Err(DomainError::not_found("Order not found"));
        }
        if self
            .state
            .items
            .iter()
            .any(|i| i.order_id == order_id && i.product_id == product.id)
        {
            return Err(DomainError::Conflict(
                "duplicate key value violates unique constraint \"uq_order_items_order_product\""
                    .to_string(),
            ));
        }
        let now = Utc::now();
        let stored = StoredItem {
            id: Uuid::new_v4(),
            order_id,
            product_id: product.id,
            quantity,
            created_at: now,
            updated_at: now,
        };
        self.state.items.push(stored.clone());
        self.item(&stored)
    }

    fn set_item_quantity(&mut self, item: &OrderItem, quantity: i32) -> Result<OrderItem, DomainError> {
        let stored = self
            .state
            .items
            .iter_mut()
            .find(|i| i.id == item.id)
            .ok_or_else(|| DomainError::not_found("Order item not found"))?;
        stored.quantity = quantity;
        stored.updated_at = Utc::now();
        let stored = stored.clone();
        self.item(&stored)
    }

    fn delete_order_item(&mut self, id: Uuid) -> Result<(), DomainError> {
        self.state.items.retain(|i| i.id != id);
        Ok(())
    }

    fn wishlist(&mut self, user_id: Uuid) -> Result<Vec<WishlistEntry>, DomainError> {
        self.state
            .wishes
            .iter()
            .rev()
            .filter(|w| w.user_id == user_id)
            .map(|w| self.wish(w))
            .collect()
    }

    fn wishlist_entry(&mut self, user_id: Uuid, product_id: Uuid) -> Result<Option<WishlistEntry>, DomainError> {
        self.state
            .wishes
            .iter()
            .find(|w| w.user_id == user_id && w.product_id == product_id)
            .map(|w| self.wish(w))
            .transpose()
    }

    fn insert_wishlist_entry(&mut self, user_id: Uuid, product: &Product) -> Result<WishlistEntry, DomainError> {
        let now = Utc::now();
        let stored = StoredWish {
            id: Uuid::new_v4(),
            user_id,
            product_id: product.id,
            created_at: now,
            updated_at: now,
        };
        self.state.wishes.push(stored.clone());
        self.wish(&stored)
    }

    fn delete_wishlist_entry(&mut self, id: Uuid) -> Result<(), DomainError> {
        self.state.wishes.retain(|w| w.id != id);
        Ok(())
    }
}
