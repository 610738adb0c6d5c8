//! Property tests for order placement and mutation on the in-memory store.

use std::str::FromStr;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use marketplace_service::application::{OrderService, ProductService};
use marketplace_service::domain::errors::DomainError;
use marketplace_service::domain::identity::Actor;
use marketplace_service::domain::order::{LineItemRequest, OrderChanges};
use marketplace_service::domain::ports::MarketStore;
use marketplace_service::domain::product::{CategoryInput, NewProduct, Product};
use marketplace_service::infrastructure::MemoryStore;
use proptest::prelude::*;
use uuid::Uuid;

struct Fixture {
    store: MemoryStore,
    shared: Arc<dyn MarketStore>,
    orders: OrderService,
    seller: Actor,
    products: Vec<Product>,
}

/// Lists one product per `(price_cents, stock)` pair under a single seller.
fn fixture(catalog: &[(u32, i32)]) -> Fixture {
    let store = MemoryStore::new();
    let shared: Arc<dyn MarketStore> = Arc::new(store.clone());
    let product_service = ProductService::new(shared.clone());
    let seller = Actor::seller(Uuid::new_v4());
    let products = catalog
        .iter()
        .enumerate()
        .map(|(i, (cents, stock))| {
            product_service
                .create_product(
                    &seller,
                    NewProduct {
                        category: CategoryInput {
                            name: "Pantry".to_string(),
                            slug: "pantry".to_string(),
                        },
                        name: format!("Item {}", i),
                        slug: format!("item-{}", i),
                        description: String::new(),
                        ingredients: String::new(),
                        price: BigDecimal::from(*cents) / BigDecimal::from(100),
                        stock: *stock,
                        available: true,
                        expiration_date: None,
                    },
                )
                .expect("create product failed")
        })
        .collect();
    Fixture {
        store,
        orders: OrderService::new(shared.clone()),
        shared,
        seller,
        products,
    }
}

fn list_product(f: &Fixture, seller: &Actor, slug: &str, stock: i32) -> Product {
    ProductService::new(f.shared.clone())
        .create_product(
            seller,
            NewProduct {
                category: CategoryInput {
                    name: "Pantry".to_string(),
                    slug: "pantry".to_string(),
                },
                name: slug.to_string(),
                slug: slug.to_string(),
                description: String::new(),
                ingredients: String::new(),
                price: BigDecimal::from(1),
                stock,
                available: true,
                expiration_date: None,
            },
        )
        .expect("create product failed")
}

fn catalog() -> impl Strategy<Value = Vec<(u32, i32)>> {
    prop::collection::vec((0u32..100_000, 1i32..50), 1..6)
}

proptest! {
    #[test]
    fn valid_orders_get_one_item_per_line(catalog in catalog(), pick in any::<prop::sample::Index>()) {
        let f = fixture(&catalog);
        let upto = pick.index(f.products.len()) + 1;
        let lines: Vec<LineItemRequest> = f.products[..upto]
            .iter()
            .map(|p| LineItemRequest::new(p.id, p.stock))
            .collect();
        let buyer = Actor::buyer(Uuid::new_v4());

        let details = f.orders.create_order(&buyer, lines).expect("valid order");

        prop_assert_eq!(details.items.len(), upto);
        for item in &details.items {
            prop_assert_eq!(item.cost(), &item.product.price * BigDecimal::from(item.quantity));
        }
        prop_assert_eq!(f.store.item_count(), upto);
    }

    #[test]
    fn over_stock_never_persists(stock in 0i32..20, extra in 1i32..20) {
        let f = fixture(&[(1000, stock)]);
        let buyer = Actor::buyer(Uuid::new_v4());

        let result = f
            .orders
            .create_order(&buyer, vec![LineItemRequest::new(f.products[0].id, stock + extra)]);

        let is_stock_error = matches!(result, Err(DomainError::Validation { ref field, .. }) if field == "quantity");
        prop_assert!(is_stock_error);
        prop_assert_eq!(f.store.order_count(), 0);
        prop_assert_eq!(f.store.item_count(), 0);
    }

    #[test]
    fn repeated_products_are_rejected(quantity in 1i32..5) {
        let f = fixture(&[(250, 100)]);
        let buyer = Actor::buyer(Uuid::new_v4());
        let line = LineItemRequest::new(f.products[0].id, quantity);

        let result = f.orders.create_order(&buyer, vec![line, line]);

        let is_validation = matches!(result, Err(DomainError::Validation { .. }));
        prop_assert!(is_validation);
        prop_assert_eq!(f.store.order_count(), 0);
    }

    #[test]
    fn self_purchase_is_always_denied(stock in 1i32..20, quantity in 1i32..20) {
        prop_assume!(quantity <= stock);
        let f = fixture(&[(500, stock)]);
        let own = f.products[0].id;

        let created = f.orders.create_order(&f.seller, vec![LineItemRequest::new(own, quantity)]);
        prop_assert!(matches!(created, Err(DomainError::PermissionDenied(_))));

        // The seller's own order, holding someone else's product, cannot take their product either.
        let other_seller = Actor::seller(Uuid::new_v4());
        let foreign = list_product(&f, &other_seller, "foreign", 10);
        let order = f
            .orders
            .create_order(&f.seller, vec![LineItemRequest::new(foreign.id, 1)])
            .expect("seller can buy from others")
            .order;
        let changes = OrderChanges {
            status: None,
            order_items: Some(vec![LineItemRequest::new(own, quantity)]),
        };
        let mutated = f.orders.update_order(&f.seller, order.id, changes);
        prop_assert!(matches!(mutated, Err(DomainError::PermissionDenied(_))));
        prop_assert_eq!(f.store.item_count(), 1);
    }

    #[test]
    fn repeated_mutation_is_idempotent(stock in 1i32..30, first in 1i32..30, second in 1i32..30) {
        prop_assume!(first <= stock);
        let f = fixture(&[(1999, stock)]);
        let buyer = Actor::buyer(Uuid::new_v4());
        let product = f.products[0].id;
        let order = f
            .orders
            .create_order(&buyer, vec![LineItemRequest::new(product, first)])
            .expect("create failed")
            .order;
        let changes = || OrderChanges {
            status: None,
            order_items: Some(vec![LineItemRequest::new(product, second)]),
        };

        let once = f.orders.update_order(&buyer, order.id, changes());
        let once_quantity = f.orders.get_order(&buyer, order.id).expect("get").items[0].quantity;
        let twice = f.orders.update_order(&buyer, order.id, changes());
        let twice_quantity = f.orders.get_order(&buyer, order.id).expect("get").items[0].quantity;

        prop_assert_eq!(once.is_ok(), second <= stock + first);
        prop_assert_eq!(once_quantity, twice_quantity);
        if once.is_ok() {
            prop_assert!(twice.is_ok());
        }
    }
}

#[test]
fn scenario_from_stock_five() {
    let f = fixture(&[(1000, 5)]);
    let buyer = Actor::buyer(Uuid::new_v4());
    let p1 = f.products[0].id;

    let details = f
        .orders
        .create_order(&buyer, vec![LineItemRequest::new(p1, 3)])
        .expect("create failed");
    assert_eq!(details.items[0].cost(), BigDecimal::from_str("30.00").unwrap());
}
