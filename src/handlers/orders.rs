use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::OrderService;
use crate::domain::identity::Actor;
use crate::domain::order::{LineItemRequest, Order, OrderChanges, OrderDetails, OrderItem, OrderStatus};
use crate::errors::AppError;

use super::money;
use super::products::ProductResponse;

// ── Request / response DTOs ──────────────────────────────────────────────────

/// One requested line. Both fields are optional on the wire so that an
/// incomplete line is reported as a validation error rather than a parse error.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct LineItemPayload {
    pub product: Option<Uuid>,
    pub quantity: Option<i32>,
}

impl From<LineItemPayload> for LineItemRequest {
    fn from(p: LineItemPayload) -> Self {
        LineItemRequest {
            product_id: p.product,
            quantity: p.quantity,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub order_items: Vec<LineItemPayload>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    /// `PENDING`, `COMPLETED` or `CANCELLED`.
    pub status: Option<String>,
    pub order_items: Option<Vec<LineItemPayload>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub order: Uuid,
    pub product: ProductResponse,
    pub quantity: i32,
    pub price: String,
    pub cost: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        let price = money(item.price());
        let cost = money(&item.cost());
        Self {
            id: item.id,
            order: item.order_id,
            quantity: item.quantity,
            price,
            cost,
            created_at: item.created_at.to_rfc3339(),
            updated_at: item.updated_at.to_rfc3339(),
            product: ProductResponse::from(item.product),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub buyer: Uuid,
    pub status: String,
    pub order_items: Vec<OrderItemResponse>,
    pub total_cost: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<OrderDetails> for OrderResponse {
    fn from(details: OrderDetails) -> Self {
        let total_cost = money(&details.total_cost());
        let OrderDetails { order, items } = details;
        Self {
            id: order.id,
            buyer: order.buyer_id,
            status: order.status.as_str().to_string(),
            order_items: items.into_iter().map(OrderItemResponse::from).collect(),
            total_cost,
            created_at: order.created_at.to_rfc3339(),
            updated_at: order.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderSummaryResponse {
    pub id: Uuid,
    pub buyer: Uuid,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Order> for OrderSummaryResponse {
    fn from(o: Order) -> Self {
        Self {
            id: o.id,
            buyer: o.buyer_id,
            status: o.status.as_str().to_string(),
            created_at: o.created_at.to_rfc3339(),
            updated_at: o.updated_at.to_rfc3339(),
        }
    }
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListOrdersParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "crate::handlers::default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderSummaryResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Places a PENDING order for the caller. Every line is validated before
/// anything is written; the order and its items are stored in one
/// transaction, so a rejected line leaves no order behind.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created successfully", body = OrderResponse),
        (status = 400, description = "Invalid line, duplicate product or not enough stock"),
        (status = 401, description = "Missing identity"),
        (status = 403, description = "Caller is the seller of a product"),
        (status = 404, description = "Referenced product does not exist"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    service: web::Data<OrderService>,
    actor: Actor,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let lines: Vec<LineItemRequest> = body
        .into_inner()
        .order_items
        .into_iter()
        .map(LineItemRequest::from)
        .collect();

    let service = service.into_inner();
    let details = web::block(move || service.create_order(&actor, lines)).await??;

    Ok(HttpResponse::Created().json(OrderResponse::from(details)))
}

/// GET /orders/{id}
///
/// Returns the order together with its items.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 403, description = "Caller is neither the buyer nor staff"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: web::Data<OrderService>,
    actor: Actor,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let service = service.into_inner();
    let details = web::block(move || service.get_order(&actor, order_id)).await??;
    Ok(HttpResponse::Ok().json(OrderResponse::from(details)))
}

/// GET /orders
///
/// Returns a paginated list of orders (without their items), newest first.
/// Staff see every order, other callers only their own.
#[utoipa::path(
    get,
    path = "/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
        (status = 401, description = "Missing identity"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    service: web::Data<OrderService>,
    actor: Actor,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = params.page.max(1);
    let limit = params.limit.clamp(1, 100);

    let service = service.into_inner();
    let result = web::block(move || service.list_orders(&actor, page, limit)).await??;

    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        items: result.items.into_iter().map(OrderSummaryResponse::from).collect(),
        total: result.total,
        page,
        limit,
    }))
}

/// PUT/PATCH /orders/{id}
///
/// Changes the status and/or adds and updates items. Items on the order
/// that the payload does not mention are left untouched.
#[utoipa::path(
    patch,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = OrderResponse),
        (status = 400, description = "Illegal status change, invalid line or not enough stock"),
        (status = 403, description = "Not permitted, or order is closed"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn update_order(
    service: web::Data<OrderService>,
    actor: Actor,
    path: web::Path<Uuid>,
    body: web::Json<UpdateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let body = body.into_inner();
    let changes = OrderChanges {
        status: body
            .status
            .as_deref()
            .map(str::parse::<OrderStatus>)
            .transpose()?,
        order_items: body
            .order_items
            .map(|lines| lines.into_iter().map(LineItemRequest::from).collect()),
    };

    let service = service.into_inner();
    let details = web::block(move || service.update_order(&actor, order_id, changes)).await??;
    Ok(HttpResponse::Ok().json(OrderResponse::from(details)))
}

/// DELETE /orders/{id}
///
/// Only PENDING orders can be deleted; their items go with them.
#[utoipa::path(
    delete,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 403, description = "Not permitted, or order is closed"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn delete_order(
    service: web::Data<OrderService>,
    actor: Actor,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let service = service.into_inner();
    web::block(move || service.delete_order(&actor, order_id)).await??;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_lines_still_deserialize() {
        let body: CreateOrderRequest =
            serde_json::from_str(r#"{"order_items": [{"quantity": 2}]}"#).expect("valid json");
        let line = LineItemRequest::from(body.order_items[0]);
        assert_eq!(line.product_id, None);
        assert_eq!(line.quantity, Some(2));
    }

    #[test]
    fn update_request_fields_are_optional() {
        let body: UpdateOrderRequest = serde_json::from_str("{}").expect("valid json");
        assert!(body.status.is_none());
        assert!(body.order_items.is_none());
    }
}
