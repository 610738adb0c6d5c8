//! HTTP-level tests: the full route table served from an in-memory store.

use std::sync::Arc;

use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::{test, App};
use marketplace_service::configure_app;
use marketplace_service::domain::ports::MarketStore;
use marketplace_service::handlers::identity::{USER_ID_HEADER, USER_ROLE_HEADER, USER_STAFF_HEADER};
use marketplace_service::infrastructure::MemoryStore;
use serde_json::{json, Value};
use uuid::Uuid;

fn store() -> Arc<dyn MarketStore> {
    Arc::new(MemoryStore::new())
}

async fn read(resp: ServiceResponse) -> (StatusCode, Value) {
    let status = resp.status();
    let body = test::read_body(resp).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("response is JSON")
    };
    (status, value)
}

/// Sends `req` to `app` and returns the status with the JSON body (`Null` when empty).
macro_rules! call {
    ($app:expr, $req:expr $(,)?) => {
        read(test::call_service($app, $req.to_request()).await).await
    };
}

fn as_user(req: test::TestRequest, id: Uuid, role: &str) -> test::TestRequest {
    req.insert_header((USER_ID_HEADER, id.to_string()))
        .insert_header((USER_ROLE_HEADER, role.to_string()))
}

fn product_body(slug: &str, price: &str, stock: i32) -> Value {
    json!({
        "category": { "name": "Dairy", "slug": "dairy" },
        "name": format!("Cheese {}", slug),
        "slug": slug,
        "description": "Aged twelve months",
        "ingredients": "milk, salt",
        "price": price,
        "stock": stock
    })
}

#[actix_web::test]
async fn order_lifecycle_over_http() {
    let app = test::init_service(App::new().configure(configure_app(store()))).await;
    let seller = Uuid::new_v4();
    let buyer = Uuid::new_v4();

    let (status, product) = call!(
        &app,
        as_user(test::TestRequest::post().uri("/products"), seller, "seller")
            .set_json(product_body("p1", "10.00", 5)),
    );
    assert_eq!(status, StatusCode::CREATED);
    let product_id = product["id"].as_str().expect("product id").to_string();
    assert_eq!(product["price"], "10.00");

    let (status, order) = call!(
        &app,
        as_user(test::TestRequest::post().uri("/orders"), buyer, "buyer")
            .set_json(json!({ "order_items": [{ "product": product_id, "quantity": 3 }] })),
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["status"], "PENDING");
    assert_eq!(order["order_items"][0]["cost"], "30.00");
    assert_eq!(order["total_cost"], "30.00");
    let order_uri = format!("/orders/{}", order["id"].as_str().expect("order id"));

    let (status, order) = call!(
        &app,
        as_user(test::TestRequest::patch().uri(&order_uri), buyer, "buyer")
            .set_json(json!({ "order_items": [{ "product": product_id, "quantity": 7 }] })),
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["order_items"][0]["quantity"], 7);

    let (status, error) = call!(
        &app,
        as_user(test::TestRequest::put().uri(&order_uri), buyer, "buyer")
            .set_json(json!({ "order_items": [{ "product": product_id, "quantity": 9 }] })),
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["field"], "quantity");

    let (status, order) = call!(&app, as_user(test::TestRequest::get().uri(&order_uri), buyer, "buyer"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["order_items"][0]["quantity"], 7);
}

#[actix_web::test]
async fn missing_identity_is_unauthorized() {
    let app = test::init_service(App::new().configure(configure_app(store()))).await;

    let (status, body) = call!(
        &app,
        test::TestRequest::post()
            .uri("/orders")
            .set_json(json!({ "order_items": [] })),
    );

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authentication credentials were not provided.");
}

#[actix_web::test]
async fn self_purchase_is_forbidden() {
    let app = test::init_service(App::new().configure(configure_app(store()))).await;
    let seller = Uuid::new_v4();

    let (_, product) = call!(
        &app,
        as_user(test::TestRequest::post().uri("/products"), seller, "seller")
            .set_json(product_body("own", "4.00", 10)),
    );

    let (status, _) = call!(
        &app,
        as_user(test::TestRequest::post().uri("/orders"), seller, "seller")
            .set_json(json!({ "order_items": [{ "product": product["id"], "quantity": 1 }] })),
    );
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn unknown_status_is_rejected() {
    let app = test::init_service(App::new().configure(configure_app(store()))).await;
    let buyer = Uuid::new_v4();

    let (status, order) = call!(
        &app,
        as_user(test::TestRequest::post().uri("/orders"), buyer, "buyer")
            .set_json(json!({ "order_items": [] })),
    );
    assert_eq!(status, StatusCode::CREATED);

    let (status, error) = call!(
        &app,
        as_user(
            test::TestRequest::patch().uri(&format!("/orders/{}", order["id"].as_str().unwrap())),
            buyer,
            "buyer",
        )
        .set_json(json!({ "status": "SHIPPED" })),
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["field"], "status");
}

#[actix_web::test]
async fn staff_list_every_order() {
    let app = test::init_service(App::new().configure(configure_app(store()))).await;
    for _ in 0..3 {
        call!(
            &app,
            as_user(test::TestRequest::post().uri("/orders"), Uuid::new_v4(), "buyer")
                .set_json(json!({ "order_items": [] })),
        );
    }

    let (_, own) = call!(
        &app,
        as_user(test::TestRequest::get().uri("/orders"), Uuid::new_v4(), "buyer"),
    );
    assert_eq!(own["total"], 0);

    let (status, all) = call!(
        &app,
        as_user(test::TestRequest::get().uri("/orders?limit=2"), Uuid::new_v4(), "admin")
            .insert_header((USER_STAFF_HEADER, "true")),
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all["total"], 3);
    assert_eq!(all["items"].as_array().map(Vec::len), Some(2));
    assert_eq!(all["limit"], 2);
}

#[actix_web::test]
async fn order_items_sub_resource() {
    let app = test::init_service(App::new().configure(configure_app(store()))).await;
    let seller = Uuid::new_v4();
    let buyer = Uuid::new_v4();
    let (_, product) = call!(
        &app,
        as_user(test::TestRequest::post().uri("/products"), seller, "seller")
            .set_json(product_body("brie", "2.50", 4)),
    );
    let (_, order) = call!(
        &app,
        as_user(test::TestRequest::post().uri("/orders"), buyer, "buyer")
            .set_json(json!({ "order_items": [] })),
    );
    let items_uri = format!("/orders/{}/items", order["id"].as_str().unwrap());

    let (status, item) = call!(
        &app,
        as_user(test::TestRequest::post().uri(&items_uri), buyer, "buyer")
            .set_json(json!({ "product": product["id"], "quantity": 2 })),
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(item["cost"], "5.00");
    let item_uri = format!("{}/{}", items_uri, item["id"].as_str().unwrap());

    let (status, item) = call!(
        &app,
        as_user(test::TestRequest::patch().uri(&item_uri), buyer, "buyer")
            .set_json(json!({ "quantity": 6 })),
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["quantity"], 6);

    let (status, _) = call!(&app, as_user(test::TestRequest::delete().uri(&item_uri), buyer, "buyer"));
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, items) = call!(&app, as_user(test::TestRequest::get().uri(&items_uri), buyer, "buyer"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(items.as_array().map(Vec::len), Some(0));
}

#[actix_web::test]
async fn catalog_search_and_ordering() {
    let app = test::init_service(App::new().configure(configure_app(store()))).await;
    let seller = Uuid::new_v4();
    for (slug, price) in [("gouda", "7.00"), ("cheddar", "3.00"), ("feta", "5.00")] {
        let (status, _) = call!(
            &app,
            as_user(test::TestRequest::post().uri("/products"), seller, "seller")
                .set_json(product_body(slug, price, 1)),
        );
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, page) = call!(&app, test::TestRequest::get().uri("/products?ordering=price&page_size=2"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 3);
    assert_eq!(page["results"][0]["slug"], "cheddar");
    assert_eq!(page["results"][1]["slug"], "feta");

    let (_, found) = call!(&app, test::TestRequest::get().uri("/products?search=GOUDA"));
    assert_eq!(found["count"], 1);

    let (status, _) = call!(&app, test::TestRequest::get().uri("/products?ordering=stock"));
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call!(
        &app,
        as_user(test::TestRequest::post().uri("/products"), seller, "seller")
            .set_json(product_body("gouda", "1.00", 1)),
    );
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, categories) = call!(&app, test::TestRequest::get().uri("/categories"));
    assert_eq!(categories.as_array().map(Vec::len), Some(1));
}

#[actix_web::test]
async fn wishlist_add_list_remove() {
    let app = test::init_service(App::new().configure(configure_app(store()))).await;
    let seller = Uuid::new_v4();
    let buyer = Uuid::new_v4();
    let (_, product) = call!(
        &app,
        as_user(test::TestRequest::post().uri("/products"), seller, "seller")
            .set_json(product_body("camembert", "6.00", 3)),
    );
    let add = || {
        as_user(test::TestRequest::post().uri("/wishlist/add"), buyer, "buyer")
            .set_json(json!({ "product_id": product["id"] }))
    };

    let (status, body) = call!(&app, add());
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Product added to wishlist successfully.");
    let (status, body) = call!(&app, add());
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product is already in your wishlist.");

    let (_, list) = call!(&app, as_user(test::TestRequest::get().uri("/wishlist"), buyer, "buyer"));
    assert_eq!(list["count"], 1);

    let remove_uri = format!("/wishlist/remove/{}", product["id"].as_str().unwrap());
    let (status, body) = call!(&app, as_user(test::TestRequest::delete().uri(&remove_uri), buyer, "buyer"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product \"Cheese camembert\" removed from wishlist successfully.");

    let (status, _) = call!(&app, as_user(test::TestRequest::delete().uri(&remove_uri), buyer, "buyer"));
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn pages_past_the_end_are_empty() {
    let app = test::init_service(App::new().configure(configure_app(store()))).await;
    let seller = Uuid::new_v4();
    let buyer = Uuid::new_v4();
    let (_, product) = call!(
        &app,
        as_user(test::TestRequest::post().uri("/products"), seller, "seller")
            .set_json(product_body("edam", "3.00", 5)),
    );
    call!(
        &app,
        as_user(test::TestRequest::post().uri("/orders"), buyer, "buyer")
            .set_json(json!({ "order_items": [{ "product": product["id"], "quantity": 1 }] })),
    );

    let (status, orders) = call!(
        &app,
        as_user(
            test::TestRequest::get().uri("/orders?page=9223372036854775807&limit=100"),
            buyer,
            "buyer",
        ),
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders["total"], 1);
    assert_eq!(orders["items"].as_array().map(Vec::len), Some(0));

    let (status, products) = call!(
        &app,
        test::TestRequest::get().uri("/products?page=9223372036854775807&page_size=100"),
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(products["count"], 1);
    assert_eq!(products["results"].as_array().map(Vec::len), Some(0));
}

#[actix_web::test]
async fn blank_search_lists_everything() {
    let app = test::init_service(App::new().configure(configure_app(store()))).await;
    let seller = Uuid::new_v4();
    for slug in ["stilton", "gruyere"] {
        call!(
            &app,
            as_user(test::TestRequest::post().uri("/products"), seller, "seller")
                .set_json(product_body(slug, "8.00", 2)),
        );
    }

    let (status, page) = call!(&app, test::TestRequest::get().uri("/products?search=%20%20"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 2);
}

#[actix_web::test]
async fn prices_beyond_the_column_range_are_rejected() {
    let app = test::init_service(App::new().configure(configure_app(store()))).await;

    let (status, error) = call!(
        &app,
        as_user(test::TestRequest::post().uri("/products"), Uuid::new_v4(), "seller")
            .set_json(product_body("gold-cheese", "1000000000.00", 1)),
    );

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["field"], "price");
}
