//! HTTP surface: `/health` plus the JSON API under `/api/v1`.

pub mod dto;
mod routes;
pub mod state;

use axum::{
    Router,
    routing::{get, post, put},
};

pub use state::AppState;

pub fn create_router(state: AppState) -> Router {
    let v1 = Router::new()
        // Identity & roles
        .route("/users", post(routes::onboarding::register_citizen))
        .route("/users/me", get(routes::onboarding::me))
        .route("/roles", post(routes::onboarding::setup_role))
        .route("/roles/me", get(routes::onboarding::my_role))
        // Complaints
        .route("/complaints", post(routes::complaint::submit))
        .route("/complaints/mine", get(routes::complaint::mine))
        .route("/complaints/{id}/assign", post(routes::complaint::assign))
        .route("/complaints/{id}/reject", post(routes::complaint::reject))
        // Dashboards
        .route("/admin/dashboard", get(routes::dashboard::admin))
        .route("/admin/store/items", get(routes::store::catalog))
        .route("/citizen/dashboard", get(routes::dashboard::citizen))
        .route("/worker/dashboard", get(routes::dashboard::worker))
        // Tasks & workers
        .route("/tasks/{id}/start", post(routes::task::start))
        .route("/tasks/{id}/complete", post(routes::task::complete))
        .route(
            "/workers/me/availability",
            put(routes::task::set_availability),
        )
        // Eco-store & points
        .route(
            "/store/items",
            get(routes::store::list_items).post(routes::store::create_item),
        )
        .route(
            "/store/items/{id}",
            put(routes::store::update_item).delete(routes::store::delete_item),
        )
        .route("/store/items/{id}/redeem", post(routes::store::redeem))
        .route("/store/redemptions", get(routes::store::redemptions))
        .route("/points/transactions", get(routes::store::transactions));

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api/v1", v1)
        .with_state(state)
}
