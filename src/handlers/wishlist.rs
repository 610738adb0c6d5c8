use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::WishlistService;
use crate::domain::identity::Actor;
use crate::domain::wishlist::WishlistEntry;
use crate::errors::AppError;

use super::products::ProductResponse;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToWishlistRequest {
    pub product_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WishlistEntryResponse {
    pub id: Uuid,
    pub product: ProductResponse,
    pub created_at: String,
}

impl From<WishlistEntry> for WishlistEntryResponse {
    fn from(entry: WishlistEntry) -> Self {
        Self {
            id: entry.id,
            created_at: entry.created_at.to_rfc3339(),
            product: ProductResponse::from(entry.product),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WishlistResponse {
    pub count: usize,
    pub results: Vec<WishlistEntryResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WishlistAddResponse {
    pub message: String,
    pub data: WishlistEntryResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// GET /wishlist
///
/// The caller's wishlist, most recently added first.
#[utoipa::path(
    get,
    path = "/wishlist",
    responses(
        (status = 200, description = "Wishlist entries", body = WishlistResponse),
        (status = 401, description = "Missing identity"),
    ),
    tag = "wishlist"
)]
pub async fn list_wishlist(
    service: web::Data<WishlistService>,
    actor: Actor,
) -> Result<HttpResponse, AppError> {
    let service = service.into_inner();
    let entries = web::block(move || service.list(&actor)).await??;
    Ok(HttpResponse::Ok().json(WishlistResponse {
        count: entries.len(),
        results: entries.into_iter().map(WishlistEntryResponse::from).collect(),
    }))
}

/// POST /wishlist/add
///
/// Responds 201 when the product was added and 200 when it was already there.
#[utoipa::path(
    post,
    path = "/wishlist/add",
    request_body = AddToWishlistRequest,
    responses(
        (status = 201, description = "Product added", body = WishlistAddResponse),
        (status = 200, description = "Product was already on the wishlist", body = WishlistAddResponse),
        (status = 400, description = "Product does not exist"),
    ),
    tag = "wishlist"
)]
pub async fn add_to_wishlist(
    service: web::Data<WishlistService>,
    actor: Actor,
    body: web::Json<AddToWishlistRequest>,
) -> Result<HttpResponse, AppError> {
    let product_id = body.into_inner().product_id;
    let service = service.into_inner();
    let addition = web::block(move || service.add(&actor, product_id)).await??;

    let (mut response, message) = if addition.created {
        (HttpResponse::Created(), "Product added to wishlist successfully.")
    } else {
        (HttpResponse::Ok(), "Product is already in your wishlist.")
    };
    Ok(response.json(WishlistAddResponse {
        message: message.to_string(),
        data: WishlistEntryResponse::from(addition.entry),
    }))
}

#[utoipa::path(
    delete,
    path = "/wishlist/remove/{product_id}",
    params(("product_id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product removed", body = MessageResponse),
        (status = 404, description = "Product not on the wishlist"),
    ),
    tag = "wishlist"
)]
pub async fn remove_from_wishlist(
    service: web::Data<WishlistService>,
    actor: Actor,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let service = service.into_inner();
    let name = web::block(move || service.remove(&actor, product_id)).await??;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: format!("Product \"{}\" removed from wishlist successfully.", name),
    }))
}
