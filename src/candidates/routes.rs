// src/candidates/routes.rs

use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers::{feedback, files, queries, uploads};

/// Create the candidates router with all candidate-related routes
pub fn candidates_routes() -> Router {
    Router::new()
        // NOTE: Specific routes must come BEFORE parameterized routes (:id)
        .route("/api/candidates/my-candidates", get(queries::get_my_candidates))
        .route("/api/candidates/bulk", post(uploads::bulk_upload_candidates))
        .route("/api/candidates/job/:job_id", get(queries::get_candidates_by_job))
        .route("/api/candidates", post(uploads::upload_candidate))
        .route(
            "/api/candidates/:id",
            get(queries::get_candidate).delete(files::delete_candidate),
        )
        .route("/api/candidates/:id/status", get(queries::get_parsing_status))
        .route("/api/candidates/:id/feedback", put(feedback::update_feedback))
        .route("/api/candidates/:id/reparse", post(uploads::reparse_candidate))
        // Admin listing
        .route("/api/admin/candidates", get(queries::admin_list_candidates))
        // Stored resume files
        .route("/uploads/resumes/:filename", get(files::serve_resume))
}
