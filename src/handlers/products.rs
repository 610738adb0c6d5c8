use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::ProductService;
use crate::domain::identity::Actor;
use crate::domain::product::{
    Category, CategoryInput, NewProduct, Product, ProductOrdering, ProductPatch, ProductQuery,
};
use crate::errors::AppError;

use super::money;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CategoryPayload {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub category: CategoryPayload,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ingredients: String,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub price: String,
    pub stock: i32,
    #[serde(default = "default_available")]
    pub available: bool,
    pub expiration_date: Option<NaiveDate>,
}

fn default_available() -> bool {
    true
}

/// Absent keeps the stored value; `null` clears it.
fn nullable<'de, D>(deserializer: D) -> Result<Option<Option<NaiveDate>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<NaiveDate>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub category: Option<CategoryPayload>,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<String>,
    pub price: Option<String>,
    pub stock: Option<i32>,
    pub available: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, format = Date)]
    pub expiration_date: Option<Option<NaiveDate>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            slug: c.slug,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub seller: Uuid,
    pub category: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub ingredients: String,
    pub price: String,
    pub stock: i32,
    pub available: bool,
    pub expiration_date: Option<NaiveDate>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            seller: p.seller_id,
            category: p.category.name,
            name: p.name,
            slug: p.slug,
            description: p.description,
            ingredients: p.ingredients,
            price: money(&p.price),
            stock: p.stock,
            available: p.available,
            expiration_date: p.expiration_date,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.to_rfc3339(),
        }
    }
}

// ── Pagination, search and ordering ──────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListProductsParams {
    /// Matched case-insensitively against name, description and ingredients.
    pub search: Option<String>,
    /// `name`, `price` or `created_at`, prefixed with `-` for descending.
    pub ordering: Option<String>,
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "crate::handlers::default_page")]
    pub page: i64,
    /// Number of products per page. Defaults to 10, maximum 100.
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page_size() -> i64 {
    10
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListProductsResponse {
    pub count: i64,
    pub page: i64,
    pub page_size: i64,
    pub results: Vec<ProductResponse>,
}

fn parse_price(raw: &str) -> Result<BigDecimal, AppError> {
    let price = BigDecimal::from_str(raw.trim())
        .map_err(|_| AppError::validation("price", format!("'{}' is not a valid price.", raw)))?;
    if price.with_scale(2) != price {
        return Err(AppError::validation(
            "price",
            "Ensure that there are no more than 2 decimal places.",
        ));
    }
    Ok(price.with_scale(2))
}

fn category_input(payload: CategoryPayload) -> CategoryInput {
    CategoryInput {
        name: payload.name,
        slug: payload.slug,
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /products
///
/// Public, paginated product listing with search and ordering.
#[utoipa::path(
    get,
    path = "/products",
    params(
        ("search" = Option<String>, Query, description = "Search term for name, description and ingredients"),
        ("ordering" = Option<String>, Query, description = "name, price or created_at; prefix with - for descending"),
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("page_size" = Option<i64>, Query, description = "Items per page (default 10, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated list of products", body = ListProductsResponse),
        (status = 400, description = "Unknown ordering field"),
    ),
    tag = "products"
)]
pub async fn list_products(
    service: web::Data<ProductService>,
    query: web::Query<ListProductsParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let ordering = match params.ordering.as_deref() {
        Some(raw) if !raw.trim().is_empty() => ProductOrdering::parse(raw)?,
        _ => ProductOrdering::default(),
    };
    let product_query = ProductQuery {
        search: params.search,
        ordering,
        page: params.page.max(1),
        page_size: params.page_size.clamp(1, 100),
    };
    let (page, page_size) = (product_query.page, product_query.page_size);

    let service = service.into_inner();
    let result = web::block(move || service.list_products(&product_query)).await??;

    Ok(HttpResponse::Ok().json(ListProductsResponse {
        count: result.total,
        page,
        page_size,
        results: result.items.into_iter().map(ProductResponse::from).collect(),
    }))
}

/// GET /products/{id}
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn get_product(
    service: web::Data<ProductService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let service = service.into_inner();
    let product = web::block(move || service.get_product(id)).await??;
    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// POST /products
///
/// Lists a new product for the calling seller. The category is looked up by
/// slug and created when it does not exist yet.
#[utoipa::path(
    post,
    path = "/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid product data"),
        (status = 401, description = "Missing identity"),
        (status = 403, description = "Caller is not a seller"),
        (status = 409, description = "Slug already in use"),
    ),
    tag = "products"
)]
pub async fn create_product(
    service: web::Data<ProductService>,
    actor: Actor,
    body: web::Json<CreateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let input = NewProduct {
        price: parse_price(&body.price)?,
        category: category_input(body.category),
        name: body.name,
        slug: body.slug,
        description: body.description,
        ingredients: body.ingredients,
        stock: body.stock,
        available: body.available,
        expiration_date: body.expiration_date,
    };

    let service = service.into_inner();
    let product = web::block(move || service.create_product(&actor, input)).await??;
    Ok(HttpResponse::Created().json(ProductResponse::from(product)))
}

/// PUT/PATCH /products/{id}
///
/// Only the product's seller may change it. Omitted fields keep their value.
#[utoipa::path(
    patch,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Invalid product data"),
        (status = 403, description = "Caller is not the seller"),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn update_product(
    service: web::Data<ProductService>,
    actor: Actor,
    path: web::Path<Uuid>,
    body: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let body = body.into_inner();
    let patch = ProductPatch {
        price: body.price.as_deref().map(parse_price).transpose()?,
        category: body.category.map(category_input),
        name: body.name,
        slug: body.slug,
        description: body.description,
        ingredients: body.ingredients,
        stock: body.stock,
        available: body.available,
        expiration_date: body.expiration_date,
    };

    let service = service.into_inner();
    let product = web::block(move || service.update_product(&actor, id, patch)).await??;
    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// DELETE /products/{id}
#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 403, description = "Caller is not the seller"),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn delete_product(
    service: web::Data<ProductService>,
    actor: Actor,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let service = service.into_inner();
    web::block(move || service.delete_product(&actor, id)).await??;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /categories
#[utoipa::path(
    get,
    path = "/categories",
    responses((status = 200, description = "All product categories", body = Vec<CategoryResponse>)),
    tag = "products"
)]
pub async fn list_categories(service: web::Data<ProductService>) -> Result<HttpResponse, AppError> {
    let service = service.into_inner();
    let categories = web::block(move || service.list_categories()).await??;
    let body: Vec<CategoryResponse> = categories.into_iter().map(CategoryResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /categories/{id}
#[utoipa::path(
    get,
    path = "/categories/{id}",
    params(("id" = Uuid, Path, description = "Category UUID")),
    responses(
        (status = 200, description = "Category found", body = CategoryResponse),
        (status = 404, description = "Category not found"),
    ),
    tag = "products"
)]
pub async fn get_category(
    service: web::Data<ProductService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let service = service.into_inner();
    let category = web::block(move || service.get_category(id)).await??;
    Ok(HttpResponse::Ok().json(CategoryResponse::from(category)))
}
