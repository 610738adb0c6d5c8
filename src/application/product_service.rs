use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::identity::Actor;
use crate::domain::permissions::{authorize, is_seller_or_admin, product_checks, Action, Check};
use crate::domain::ports::{atomically, MarketStore, MarketTx};
use crate::domain::product::{
    Category, CategoryInput, NewProduct, Page, Product, ProductDraft, ProductPatch, ProductQuery,
};

#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn MarketStore>,
}

impl ProductService {
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        Self { store }
    }

    pub fn list_products(&self, query: &ProductQuery) -> Result<Page<Product>, DomainError> {
        atomically(self.store.as_ref(), |tx| tx.products(query))
    }

    pub fn get_product(&self, id: Uuid) -> Result<Product, DomainError> {
        atomically(self.store.as_ref(), |tx| find_product(tx, id))
    }

    pub fn create_product(&self, actor: &Actor, input: NewProduct) -> Result<Product, DomainError> {
        authorize(actor, &(), Action::Create, &[is_seller_or_admin as Check<()>])?;
        validate_text("name", &input.name)?;
        validate_text("slug", &input.slug)?;
        validate_amounts(Some(&input.price), Some(input.stock))?;
        validate_category(&input.category)?;

        let product = atomically(self.store.as_ref(), |tx| {
            if tx.slug_taken(&input.slug, None)? {
                return Err(DomainError::Conflict(format!(
                    "A product with slug '{}' already exists.",
                    input.slug
                )));
            }
            let category = tx.category_get_or_create(&input.category.name, &input.category.slug)?;
            tx.insert_product(ProductDraft {
                seller_id: actor.id,
                category_id: category.id,
                name: input.name.clone(),
                slug: input.slug.clone(),
                description: input.description.clone(),
                ingredients: input.ingredients.clone(),
                price: input.price.clone(),
                stock: input.stock,
                available: input.available,
                expiration_date: input.expiration_date,
            })
        })?;

        log::info!("product {} ({}) listed by {}", product.id, product.slug, actor.id);
        Ok(product)
    }

    pub fn update_product(
        &self,
        actor: &Actor,
        id: Uuid,
        patch: ProductPatch,
    ) -> Result<Product, DomainError> {
        if let Some(name) = &patch.name {
            validate_text("name", name)?;
        }
        if let Some(slug) = &patch.slug {
            validate_text("slug", slug)?;
        }
        if let Some(category) = &patch.category {
            validate_category(category)?;
        }
        validate_amounts(patch.price.as_ref(), patch.stock)?;

        atomically(self.store.as_ref(), |tx| {
            let mut product = find_product(tx, id)?;
            authorize(actor, &product, Action::Update, &product_checks(Action::Update))?;

            if let Some(slug) = &patch.slug {
                if tx.slug_taken(slug, Some(product.id))? {
                    return Err(DomainError::Conflict(format!(
                        "A product with slug '{}' already exists.",
                        slug
                    )));
                }
                product.slug = slug.clone();
            }
            if let Some(category) = &patch.category {
                product.category = tx.category_get_or_create(&category.name, &category.slug)?;
            }
            if let Some(name) = &patch.name {
                product.name = name.clone();
            }
            if let Some(description) = &patch.description {
                product.description = description.clone();
            }
            if let Some(ingredients) = &patch.ingredients {
                product.ingredients = ingredients.clone();
            }
            if let Some(price) = &patch.price {
                product.price = price.clone();
            }
            if let Some(stock) = patch.stock {
                product.stock = stock;
            }
            if let Some(available) = patch.available {
                product.available = available;
            }
            if let Some(expiration_date) = patch.expiration_date {
                product.expiration_date = expiration_date;
            }
            product.updated_at = Utc::now();
            tx.save_product(&product)
        })
    }

    pub fn delete_product(&self, actor: &Actor, id: Uuid) -> Result<(), DomainError> {
        atomically(self.store.as_ref(), |tx| {
            let product = find_product(tx, id)?;
            authorize(actor, &product, Action::Delete, &product_checks(Action::Delete))?;
            tx.delete_product(product.id)
        })?;
        log::info!("product {} deleted by {}", id, actor.id);
        Ok(())
    }

    pub fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        atomically(self.store.as_ref(), |tx| tx.categories())
    }

    pub fn get_category(&self, id: Uuid) -> Result<Category, DomainError> {
        atomically(self.store.as_ref(), |tx| {
            tx.category(id)?
                .ok_or_else(|| DomainError::not_found("Category not found"))
        })
    }
}

fn find_product(tx: &mut dyn MarketTx, id: Uuid) -> Result<Product, DomainError> {
    tx.product(id)?
        .ok_or_else(|| DomainError::not_found("Product not found"))
}

fn validate_text(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(field, "This field may not be blank."));
    }
    Ok(())
}

fn validate_category(category: &CategoryInput) -> Result<(), DomainError> {
    validate_text("category.name", &category.name)?;
    validate_text("category.slug", &category.slug)
}

const MAX_PRICE_EXCLUSIVE: i64 = 100_000_000;

fn validate_amounts(price: Option<&BigDecimal>, stock: Option<i32>) -> Result<(), DomainError> {
    if price.is_some_and(|p| *p < BigDecimal::from(0)) {
        return Err(DomainError::validation("price", "Price cannot be negative."));
    }
    // products.price is NUMERIC(10, 2).
    if price.is_some_and(|p| *p >= BigDecimal::from(MAX_PRICE_EXCLUSIVE)) {
        return Err(DomainError::validation(
            "price",
            "Ensure that there are no more than 8 digits before the decimal point.",
        ));
    }
    if stock.is_some_and(|s| s < 0) {
        return Err(DomainError::validation("stock", "Stock cannot be negative."));
    }
    Ok(())
}
