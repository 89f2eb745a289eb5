// src/candidates/handlers/feedback.rs

use axum::{
    extract::{Extension, Path},
    response::Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::auth::AuthedUser;
use crate::candidates::models::*;
use crate::candidates::status::HrFeedback;
use crate::common::{ApiError, AppState};

/// PUT /api/candidates/:id/feedback - Set the HR review label
///
/// Accepts legacy synonyms ("shortlist", "hire", ...) and stores only the
/// canonical label.
pub async fn update_feedback(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateFeedback>,
) -> Result<Json<MessageResponse>, ApiError> {
    let feedback = HrFeedback::normalize(&body.feedback).ok_or_else(|| {
        ApiError::ValidationError(format!("unknown feedback label: {}", body.feedback))
    })?;

    let state = state_lock.read().await.clone();

    // Only the job owner or an admin may review candidates
    let (_candidate, job) = super::load_candidate_with_job(&state.db, &id).await?;
    let is_owner = job.map(|j| j.user_id == authed.id).unwrap_or(false);
    if !authed.is_admin() && !is_owner {
        return Err(ApiError::Forbidden("not allowed".to_string()));
    }

    sqlx::query("UPDATE candidates SET hr_feedback = ?, updated_at = datetime('now') WHERE id = ?")
        .bind(feedback.as_str())
        .bind(&id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(
        candidate_id = %id,
        feedback = %feedback.as_str(),
        user_id = %authed.id,
        "HR feedback updated"
    );

    Ok(Json(MessageResponse {
        success: true,
        message: format!("Feedback set to {}", feedback.as_str()),
    }))
}
