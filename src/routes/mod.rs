use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod payment;
pub mod seller;
pub mod user;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .merge(catalog::router())
        .nest("/auth", auth::router())
        .nest("/user", user::router())
        .nest("/cart", cart::router())
        .nest("/payment", payment::router())
        .nest("/orders", orders::router())
        .nest("/admin", admin::router())
        .nest("/seller", seller::router())
}
