// src/candidates/handlers/mod.rs

pub mod feedback;
pub mod files;
pub mod queries;
pub mod uploads;

use sqlx::SqlitePool;

use crate::auth::AuthedUser;
use crate::candidates::models::Candidate;
use crate::common::{id_generator::is_valid_id, ApiError};
use crate::jobs::models::Job;

/// Load a candidate together with its job (the job may have been deleted)
pub(super) async fn load_candidate_with_job(
    db: &SqlitePool,
    candidate_id: &str,
) -> Result<(Candidate, Option<Job>), ApiError> {
    if !is_valid_id(candidate_id) {
        return Err(ApiError::NotFound("candidate not found".to_string()));
    }

    let candidate = sqlx::query_as::<_, Candidate>("SELECT * FROM candidates WHERE id = ?")
        .bind(candidate_id)
        .fetch_optional(db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound("candidate not found".to_string()))?;

    let job = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = ?")
        .bind(&candidate.job_id)
        .fetch_optional(db)
        .await
        .map_err(ApiError::DatabaseError)?;

    Ok((candidate, job))
}

/// Admins, the job owner, and the uploader may access a candidate record
pub(super) fn can_access_candidate(
    authed: &AuthedUser,
    candidate: &Candidate,
    job: Option<&Job>,
) -> bool {
    if authed.is_admin() || candidate.added_by == authed.id {
        return true;
    }
    job.map(|j| j.user_id == authed.id).unwrap_or(false)
}
