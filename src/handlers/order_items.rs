//! Item-level access to a single order: `/orders/{id}/items[/{item_id}]`.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::OrderService;
use crate::domain::identity::Actor;
use crate::domain::order::LineItemRequest;
use crate::errors::AppError;

use super::orders::{LineItemPayload, OrderItemResponse};

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderItemRequest {
    pub quantity: Option<i32>,
}

#[utoipa::path(
    get,
    path = "/orders/{id}/items",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Items of the order", body = Vec<OrderItemResponse>),
        (status = 403, description = "Caller is neither the buyer nor staff"),
        (status = 404, description = "Order not found"),
    ),
    tag = "order items"
)]
pub async fn list_items(
    service: web::Data<OrderService>,
    actor: Actor,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let service = service.into_inner();
    let items = web::block(move || service.list_items(&actor, order_id)).await??;
    let body: Vec<OrderItemResponse> = items.into_iter().map(OrderItemResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /orders/{id}/items
///
/// Adds one product to a PENDING order. A product can appear on an order only once.
#[utoipa::path(
    post,
    path = "/orders/{id}/items",
    params(("id" = Uuid, Path, description = "Order UUID")),
    request_body = LineItemPayload,
    responses(
        (status = 201, description = "Item added", body = OrderItemResponse),
        (status = 400, description = "Invalid line, product already on the order or not enough stock"),
        (status = 403, description = "Not permitted, order is closed, or own product"),
        (status = 404, description = "Order or product not found"),
    ),
    tag = "order items"
)]
pub async fn add_item(
    service: web::Data<OrderService>,
    actor: Actor,
    path: web::Path<Uuid>,
    body: web::Json<LineItemPayload>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let line = LineItemRequest::from(body.into_inner());
    let service = service.into_inner();
    let item = web::block(move || service.add_item(&actor, order_id, line)).await??;
    Ok(HttpResponse::Created().json(OrderItemResponse::from(item)))
}

#[utoipa::path(
    get,
    path = "/orders/{id}/items/{item_id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
        ("item_id" = Uuid, Path, description = "Order item UUID"),
    ),
    responses(
        (status = 200, description = "Item found", body = OrderItemResponse),
        (status = 403, description = "Caller is neither the buyer nor staff"),
        (status = 404, description = "Order or item not found"),
    ),
    tag = "order items"
)]
pub async fn get_item(
    service: web::Data<OrderService>,
    actor: Actor,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, AppError> {
    let (order_id, item_id) = path.into_inner();
    let service = service.into_inner();
    let item = web::block(move || service.get_item(&actor, order_id, item_id)).await??;
    Ok(HttpResponse::Ok().json(OrderItemResponse::from(item)))
}

/// PUT/PATCH /orders/{id}/items/{item_id}
///
/// The new quantity may use the stock plus what the item already holds.
#[utoipa::path(
    patch,
    path = "/orders/{id}/items/{item_id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
        ("item_id" = Uuid, Path, description = "Order item UUID"),
    ),
    request_body = UpdateOrderItemRequest,
    responses(
        (status = 200, description = "Item updated", body = OrderItemResponse),
        (status = 400, description = "Invalid quantity or not enough stock"),
        (status = 403, description = "Not permitted, or order is closed"),
        (status = 404, description = "Order or item not found"),
    ),
    tag = "order items"
)]
pub async fn update_item(
    service: web::Data<OrderService>,
    actor: Actor,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<UpdateOrderItemRequest>,
) -> Result<HttpResponse, AppError> {
    let (order_id, item_id) = path.into_inner();
    let quantity = body.into_inner().quantity;
    let service = service.into_inner();
    let item =
        web::block(move || service.update_item(&actor, order_id, item_id, quantity)).await??;
    Ok(HttpResponse::Ok().json(OrderItemResponse::from(item)))
}

#[utoipa::path(
    delete,
    path = "/orders/{id}/items/{item_id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
        ("item_id" = Uuid, Path, description = "Order item UUID"),
    ),
    responses(
        (status = 204, description = "Item removed"),
        (status = 403, description = "Not permitted, or order is closed"),
        (status = 404, description = "Order or item not found"),
    ),
    tag = "order items"
)]
pub async fn delete_item(
    service: web::Data<OrderService>,
    actor: Actor,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, AppError> {
    let (order_id, item_id) = path.into_inner();
    let service = service.into_inner();
    web::block(move || service.delete_item(&actor, order_id, item_id)).await??;
    Ok(HttpResponse::NoContent().finish())
}
