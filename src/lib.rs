pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::{OrderService, ProductService, WishlistService};
use domain::ports::MarketStore;
use handlers::{order_items, orders, products, wishlist};

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub type MigrationError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), MigrationError> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    log::info!("applied {} pending migration(s)", applied.len());
    Ok(())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        orders::list_orders,
        orders::create_order,
        orders::get_order,
        orders::update_order,
        orders::delete_order,
        order_items::list_items,
        order_items::add_item,
        order_items::get_item,
        order_items::update_item,
        order_items::delete_item,
        products::list_products,
        products::create_product,
        products::get_product,
        products::update_product,
        products::delete_product,
        products::list_categories,
        products::get_category,
        wishlist::list_wishlist,
        wishlist::add_to_wishlist,
        wishlist::remove_from_wishlist,
    ),
    tags(
        (name = "orders", description = "Order placement and mutation"),
        (name = "order items", description = "Items of a single order"),
        (name = "products", description = "Product catalog and categories"),
        (name = "wishlist", description = "The caller's wishlist"),
    )
)]
pub struct ApiDoc;

/// Registers the services, every route and the Swagger UI on an `App`.
///
/// All services share `store`; tests pass a `MemoryStore`, the binary a
/// `DieselStore`.
pub fn configure_app(store: Arc<dyn MarketStore>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::Data::new(OrderService::new(store.clone())))
            .app_data(web::Data::new(ProductService::new(store.clone())))
            .app_data(web::Data::new(WishlistService::new(store)))
            .service(
                web::scope("/orders")
                    .service(
                        web::resource("")
                            .route(web::get().to(orders::list_orders))
                            .route(web::post().to(orders::create_order)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(orders::get_order))
                            .route(web::put().to(orders::update_order))
                            .route(web::patch().to(orders::update_order))
                            .route(web::delete().to(orders::delete_order)),
                    )
                    .service(
                        web::resource("/{id}/items")
                            .route(web::get().to(order_items::list_items))
                            .route(web::post().to(order_items::add_item)),
                    )
                    .service(
                        web::resource("/{id}/items/{item_id}")
                            .route(web::get().to(order_items::get_item))
                            .route(web::put().to(order_items::update_item))
                            .route(web::patch().to(order_items::update_item))
                            .route(web::delete().to(order_items::delete_item)),
                    ),
            )
            .service(
                web::scope("/products")
                    .service(
                        web::resource("")
                            .route(web::get().to(products::list_products))
                            .route(web::post().to(products::create_product)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(products::get_product))
                            .route(web::put().to(products::update_product))
                            .route(web::patch().to(products::update_product))
                            .route(web::delete().to(products::delete_product)),
                    ),
            )
            .service(
                web::scope("/categories")
                    .route("", web::get().to(products::list_categories))
                    .route("/{id}", web::get().to(products::get_category)),
            )
            .service(
                web::scope("/wishlist")
                    .route("", web::get().to(wishlist::list_wishlist))
                    .route("/add", web::post().to(wishlist::add_to_wishlist))
                    .route(
                        "/remove/{product_id}",
                        web::delete().to(wishlist::remove_from_wishlist),
                    ),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            );
    }
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    store: Arc<dyn MarketStore>,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(configure_app(store.clone()))
    })
    .bind((host.to_string(), port))?
    .run())
}
