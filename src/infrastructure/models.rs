use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderItem, OrderStatus};
use crate::domain::product::{Category, Product};
use crate::domain::wishlist::WishlistEntry;
use crate::schema::{order_items, orders, product_categories, products, wishlist_items};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = product_categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CategoryRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = product_categories)]
pub struct NewCategoryRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub slug: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = products)]
#[diesel(belongs_to(CategoryRow, foreign_key = category_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: Uuid,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow {
    pub id: Uuid,
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

#[derive(Debug, AsChangeset)]
#[diesel(table_name = products)]
#[diesel(treat_none_as_null = true)]
pub struct ProductChangeset<'a> {
    pub category_id: Uuid,
    pub name: &'a str,
    pub slug: &'a str,
    pub description: &'a str,
    pub ingredients: &'a str,
    pub price: &'a BigDecimal,
    pub stock: i32,
    pub available: bool,
    pub expiration_date: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Product> for ProductChangeset<'a> {
    fn from(p: &'a Product) -> Self {
        Self {
            category_id: p.category.id,
            name: &p.name,
            slug: &p.slug,
            description: &p.description,
            ingredients: &p.ingredients,
            price: &p.price,
            stock: p.stock,
            available: p.available,
            expiration_date: p.expiration_date,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub status: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = order_items)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = wishlist_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WishlistRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = wishlist_items)]
pub struct NewWishlistRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
}

// ── Row → domain ─────────────────────────────────────────────────────────────

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            slug: row.slug,
        }
    }
}

pub fn product_from_rows(row: ProductRow, category: CategoryRow) -> Product {
    Product {
        id: row.id,
        seller_id: row.seller_id,
        category: category.into(),
        name: row.name,
        slug: row.slug,
        description: row.description,
        ingredients: row.ingredients,
        price: row.price,
        stock: row.stock,
        available: row.available,
        expiration_date: row.expiration_date,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

impl TryFrom<OrderRow> for Order {
    type Error = DomainError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = OrderStatus::from_str(&row.status).map_err(|_| {
            DomainError::Internal(format!("order {} has unknown status '{}'", row.id, row.status))
        })?;
        Ok(Order {
            id: row.id,
            buyer_id: row.buyer_id,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub fn order_item_from_rows(row: OrderItemRow, product: Product) -> OrderItem {
    OrderItem {
        id: row.id,
        order_id: row.order_id,
        product,
        quantity: row.quantity,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

pub fn wishlist_from_rows(row: WishlistRow, product: Product) -> WishlistEntry {
    WishlistEntry {
        id: row.id,
        user_id: row.user_id,
        product,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}
