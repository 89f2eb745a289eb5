// src/jobs/routes.rs

use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers;

/// Create the jobs router with all job-related routes
pub fn jobs_routes() -> Router {
    Router::new()
        // NOTE: Specific routes must come BEFORE parameterized routes (:id)
        .route("/api/jobs/my-jobs", get(handlers::list_my_jobs))
        .route("/api/jobs", post(handlers::create_job))
        .route("/api/jobs/:id", get(handlers::get_job))
        .route(
            "/api/jobs/:id/contact-visibility",
            put(handlers::update_contact_visibility),
        )
}
