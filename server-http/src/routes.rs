use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use shared::config::Config;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::normalize_path::NormalizePathLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::authenticate;
use crate::state::AppState;

/// Build and configure the application router
pub fn build_router(state: AppState, config: &Config) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Sessions
        .route("/auth/login", post(handlers::login))
        // Catalog
        .route(
            "/category/list",
            get(handlers::list_categories).post(handlers::category_action),
        )
        .route("/category/create", post(handlers::create_category))
        .route("/category/{id}", get(handlers::get_category))
        .route("/product/list", get(handlers::list_products))
        .route("/product/create", post(handlers::create_product))
        // Cart
        .route("/cart/get", get(handlers::get_cart))
        .route("/cart/add", post(handlers::add_to_cart))
        .route("/cart/update", post(handlers::update_cart))
        .route(
            "/cart/remove-deleted-product",
            post(handlers::remove_deleted_product),
        )
        // Orders
        .route("/order/create", post(handlers::create_order))
        .route("/order/get-orders", get(handlers::get_orders))
        .route("/seller/orders", get(handlers::seller_orders))
        // Middleware
        .layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .layer(NormalizePathLayer::trim_trailing_slash())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.allowed_origins.iter().any(|origin| origin == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(AllowOrigin::list(origins))
    }
}
