// src/candidates/handlers/files.rs

use axum::{
    extract::{Extension, Path},
    http::header,
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::auth::AuthedUser;
use crate::candidates::models::MessageResponse;
use crate::common::{ApiError, AppState};

/// GET /uploads/resumes/:filename - Serve a stored resume file
pub async fn serve_resume(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _authed: AuthedUser,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    // Only flat file names are ever stored; anything else is traversal
    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        return Err(ApiError::BadRequest("invalid file name".to_string()));
    }

    let state = state_lock.read().await.clone();
    let file_path = state.resumes_dir.join(&filename);

    let data = tokio::fs::read(&file_path)
        .await
        .map_err(|_| ApiError::NotFound("resume not found".to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", filename),
            ),
        ],
        data,
    ))
}

/// DELETE /api/candidates/:id - Remove a candidate and its stored resume
pub async fn delete_candidate(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !authed.is_admin() {
        return Err(ApiError::Forbidden("admin privileges required".to_string()));
    }

    let state = state_lock.read().await.clone();

    let (candidate, _job) = super::load_candidate_with_job(&state.db, &id).await?;

    // Best-effort file removal; the row is the source of truth
    if let Some(filename) = candidate.resume_url.rsplit('/').next() {
        let file_path = state.resumes_dir.join(filename);
        if let Err(e) = tokio::fs::remove_file(&file_path).await {
            warn!(error = %e, candidate_id = %id, "Failed to remove resume file");
        }
    }

    sqlx::query("DELETE FROM candidates WHERE id = ?")
        .bind(&id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(candidate_id = %id, user_id = %authed.id, "Candidate deleted");

    Ok(Json(MessageResponse {
        success: true,
        message: "Candidate deleted".to_string(),
    }))
}
