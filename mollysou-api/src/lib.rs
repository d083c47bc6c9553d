pub mod cart;
pub mod catalog;
pub mod error;
pub mod extract;
pub mod index;
pub mod users;

use axum::Router;
use axum::routing::{delete, get, post, put};
use mollysou_core::Data;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult};

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RouteMeta {
    pub method: &'static str,
    pub path: &'static str,
    pub desc: &'static str,
    pub category: &'static str,
}

pub const ROUTES: &[RouteMeta] = &[
    index::META,
    users::register::META,
    users::login::META,
    users::profile::META,
    users::progress::ADD_POINTS_META,
    users::progress::ADD_XP_META,
    users::progress::UPDATE_POINTS_XP_META,
    users::cooldowns::TOUCH_META,
    users::cooldowns::LIST_META,
    users::rank::META,
    catalog::categories::LIST_META,
    catalog::categories::GET_META,
    catalog::categories::PRODUCTS_META,
    catalog::products::LIST_META,
    catalog::products::GET_META,
    catalog::events::LIST_META,
    catalog::events::POPULAR_META,
    catalog::events::GET_META,
    cart::LIST_META,
    cart::ADD_META,
    cart::UPDATE_META,
    cart::REMOVE_META,
    cart::CLEAR_META,
    cart::COUNT_META,
];

/// Every endpoint, wired to shared state, with tracing and permissive CORS.
pub fn router(data: Data) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api", get(index::routes))
        .route("/api/users/register", post(users::register::register))
        .route("/api/users/login", post(users::login::login))
        .route("/api/users/{user_id}", get(users::profile::profile))
        .route(
            "/api/users/{user_id}/add-points",
            post(users::progress::add_points),
        )
        .route("/api/users/{user_id}/add-xp", post(users::progress::add_xp))
        .route(
            "/api/users/{user_id}/update-points-xp",
            post(users::progress::update_points_xp),
        )
        .route(
            "/api/users/{user_id}/cooldown/{action}",
            post(users::cooldowns::touch),
        )
        .route(
            "/api/users/{user_id}/cooldowns",
            get(users::cooldowns::list),
        )
        .route("/api/users/{user_id}/rank-info", get(users::rank::rank_info))
        .route("/api/categories", get(catalog::categories::list))
        .route("/api/categories/{category_id}", get(catalog::categories::get))
        .route(
            "/api/categories/{category_id}/products",
            get(catalog::categories::products),
        )
        .route("/api/products", get(catalog::products::list))
        .route("/api/products/{product_id}", get(catalog::products::get))
        .route("/api/events", get(catalog::events::list))
        .route("/api/events/popular", get(catalog::events::popular))
        .route("/api/events/{event_id}", get(catalog::events::get))
        .route("/api/cart/{user_id}", get(cart::list))
        .route("/api/cart/{user_id}/add", post(cart::add))
        .route("/api/cart/{user_id}/update/{product_id}", put(cart::update))
        .route("/api/cart/{user_id}/remove/{product_id}", delete(cart::remove))
        .route("/api/cart/{user_id}/clear", delete(cart::clear))
        .route("/api/cart/{user_id}/count", get(cart::count))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(data)
}
