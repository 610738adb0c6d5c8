use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub category: Category,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub ingredients: String,
    pub price: BigDecimal,
    pub stock: i32,
    pub available: bool,
    pub expiration_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CategoryInput {
    pub name: String,
    pub slug: String,
}

/// Listing data for a new product. The seller is always the acting identity.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub category: CategoryInput,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub ingredients: String,
    pub price: BigDecimal,
    pub stock: i32,
    pub available: bool,
    pub expiration_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub category: Option<CategoryInput>,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<String>,
    pub price: Option<BigDecimal>,
    pub stock: Option<i32>,
    pub available: Option<bool>,
    pub expiration_date: Option<Option<NaiveDate>>,
}

/// Row values handed to the store when a product is inserted.
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub seller_id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub ingredients: String,
    pub price: BigDecimal,
    pub stock: i32,
    pub available: bool,
    pub expiration_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSortField {
    Name,
    Price,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductOrdering {
    pub field: ProductSortField,
    pub descending: bool,
}

impl Default for ProductOrdering {
    fn default() -> Self {
        Self {
            field: ProductSortField::CreatedAt,
            descending: true,
        }
    }
}

impl ProductOrdering {
    /// Parses `name`, `price` or `created_at`, with a leading `-` for descending order.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let raw = raw.trim();
        let (descending, name) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let field = match name {
            "name" => ProductSortField::Name,
            "price" => ProductSortField::Price,
            "created_at" => ProductSortField::CreatedAt,
            other => {
                return Err(DomainError::validation(
                    "ordering",
                    format!("Cannot order products by '{}'.", other),
                ))
            }
        };
        Ok(Self { field, descending })
    }
}

#[derive(Debug, Clone)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub ordering: ProductOrdering,
    pub page: i64,
    pub page_size: i64,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            search: None,
            ordering: ProductOrdering::default(),
            page: 1,
            page_size: 10,
        }
    }
}

impl ProductQuery {
    pub fn offset(&self) -> i64 {
        page_offset(self.page, self.page_size)
    }

    /// Case-insensitive match against name, description and ingredients.
    pub fn matches(&self, product: &Product) -> bool {
        let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
            return true;
        };
        let term = term.to_lowercase();
        [&product.name, &product.description, &product.ingredients]
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }
}

/// Rows to skip for a 1-based `page`; saturates instead of overflowing.
pub fn page_offset(page: i64, size: i64) -> i64 {
    (page - 1).max(0).saturating_mul(size.max(0))
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}
