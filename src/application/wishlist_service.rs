use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::identity::Actor;
use crate::domain::ports::{atomically, MarketStore};
use crate::domain::wishlist::{WishlistAddition, WishlistEntry};

#[derive(Clone)]
pub struct WishlistService {
    store: Arc<dyn MarketStore>,
}

impl WishlistService {
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        Self { store }
    }

    pub fn list(&self, actor: &Actor) -> Result<Vec<WishlistEntry>, DomainError> {
        atomically(self.store.as_ref(), |tx| tx.wishlist(actor.id))
    }

    /// Adding a product that is already on the wishlist returns the stored entry.
    pub fn add(&self, actor: &Actor, product_id: Uuid) -> Result<WishlistAddition, DomainError> {
        let addition = atomically(self.store.as_ref(), |tx| {
            let product = tx
                .product(product_id)?
                .ok_or_else(|| DomainError::validation("product_id", "Product does not exist."))?;
            if let Some(entry) = tx.wishlist_entry(actor.id, product.id)? {
                return Ok(WishlistAddition {
                    entry,
                    created: false,
                });
            }
            let entry = tx.insert_wishlist_entry(actor.id, &product)?;
            Ok(WishlistAddition {
                entry,
                created: true,
            })
        })?;
        if addition.created {
            log::info!("product {} added to wishlist of {}", product_id, actor.id);
        }
        Ok(addition)
    }

    /// Returns the removed product's name.
    pub fn remove(&self, actor: &Actor, product_id: Uuid) -> Result<String, DomainError> {
        let name = atomically(self.store.as_ref(), |tx| {
            let entry = tx
                .wishlist_entry(actor.id, product_id)?
                .ok_or_else(|| DomainError::not_found("Product not found in your wishlist."))?;
            tx.delete_wishlist_entry(entry.id)?;
            Ok(entry.product.name)
        })?;
        log::info!("product {} removed from wishlist of {}", product_id, actor.id);
        Ok(name)
    }
}
