// src/admin/routes.rs

use axum::{routing::put, Router};

use super::handlers;

/// Create the admin router with operator-only routes
pub fn admin_routes() -> Router {
    Router::new().route("/api/admin/settings", put(handlers::update_setting))
}
