// src/candidates/handlers/queries.rs

use axum::{
    extract::{Extension, Path, Query},
    response::Json,
};
use sqlx::FromRow;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::auth::AuthedUser;
use crate::candidates::models::*;
use crate::candidates::privacy::apply_privacy_filters;
use crate::common::{ApiError, AppState};
use crate::jobs::models::Job;

/// Candidate row joined with its job's contact visibility flag
#[derive(FromRow, Debug)]
struct CandidateWithVisibility {
    #[sqlx(flatten)]
    candidate: Candidate,
    contact_details_visible: i64,
}

impl CandidateWithVisibility {
    fn into_body(self, authed: &AuthedUser) -> CandidateBody {
        let mut body =
            CandidateBody::from_candidate(self.candidate, self.contact_details_visible != 0);
        apply_privacy_filters(&mut body, authed.role);
        body
    }
}

/// GET /api/candidates/job/:job_id - List candidates for a job
pub async fn get_candidates_by_job(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(job_id): Path<String>,
) -> Result<Json<CandidateListResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let job = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = ?")
        .bind(&job_id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound("job not found".to_string()))?;

    if !authed.is_admin() && job.user_id != authed.id {
        return Err(ApiError::Forbidden("not allowed".to_string()));
    }

    // Non-admins only see fully parsed candidates; in-flight rows are
    // reachable through the status endpoint
    let query = if authed.is_admin() {
        "SELECT * FROM candidates WHERE job_id = ? \
         ORDER BY ats_score DESC, created_at DESC"
    } else {
        "SELECT * FROM candidates WHERE job_id = ? AND parsing_status = 'COMPLETED' \
         ORDER BY ats_score DESC, created_at DESC"
    };

    let rows = sqlx::query_as::<_, Candidate>(query)
        .bind(&job_id)
        .fetch_all(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let visible = job.contact_details_visible != 0;
    let candidates = rows
        .into_iter()
        .map(|c| {
            let mut body = CandidateBody::from_candidate(c, visible);
            apply_privacy_filters(&mut body, authed.role);
            body
        })
        .collect();

    Ok(Json(CandidateListResponse {
        success: true,
        candidates,
    }))
}

/// GET /api/candidates/my-candidates - List candidates uploaded by the caller
pub async fn get_my_candidates(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<CandidateListResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let query = if authed.is_admin() {
        r#"SELECT c.*, COALESCE(j.contact_details_visible, 0) AS contact_details_visible
           FROM candidates c
           LEFT JOIN jobs j ON j.id = c.job_id
           WHERE c.added_by = ?
           ORDER BY c.created_at DESC"#
    } else {
        r#"SELECT c.*, COALESCE(j.contact_details_visible, 0) AS contact_details_visible
           FROM candidates c
           LEFT JOIN jobs j ON j.id = c.job_id
           WHERE c.added_by = ? AND c.parsing_status = 'COMPLETED'
           ORDER BY c.created_at DESC"#
    };

    let rows = sqlx::query_as::<_, CandidateWithVisibility>(query)
        .bind(&authed.id)
        .fetch_all(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let candidates = rows.into_iter().map(|r| r.into_body(&authed)).collect();

    Ok(Json(CandidateListResponse {
        success: true,
        candidates,
    }))
}

/// GET /api/candidates/:id - Fetch a single candidate
pub async fn get_candidate(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(id): Path<String>,
) -> Result<Json<CandidateResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let (candidate, job) = super::load_candidate_with_job(&state.db, &id).await?;
    if !super::can_access_candidate(&authed, &candidate, job.as_ref()) {
        return Err(ApiError::Forbidden("not allowed".to_string()));
    }

    let visible = job.map(|j| j.contact_details_visible != 0).unwrap_or(false);
    let mut body = CandidateBody::from_candidate(candidate, visible);
    apply_privacy_filters(&mut body, authed.role);

    Ok(Json(CandidateResponse {
        success: true,
        candidate: body,
    }))
}

/// GET /api/candidates/:id/status - Poll parsing progress
pub async fn get_parsing_status(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(id): Path<String>,
) -> Result<Json<ParsingStatusResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let (candidate, job) = super::load_candidate_with_job(&state.db, &id).await?;
    if !super::can_access_candidate(&authed, &candidate, job.as_ref()) {
        return Err(ApiError::Forbidden("not allowed".to_string()));
    }

    debug!(
        candidate_id = %id,
        status = %candidate.parsing_status,
        progress = candidate.parsing_progress,
        "Parsing status polled"
    );

    Ok(Json(ParsingStatusResponse {
        success: true,
        parsing_status: candidate.parsing_status,
        parsing_progress: candidate.parsing_progress,
        parsing_status_message: candidate.parsing_status_message,
        is_parsed: candidate.is_parsed != 0,
    }))
}

/// GET /api/admin/candidates - List all candidates with optional filters
pub async fn admin_list_candidates(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Query(filters): Query<AdminCandidatesQuery>,
) -> Result<Json<CandidateListResponse>, ApiError> {
    if !authed.is_admin() {
        return Err(ApiError::Forbidden("admin privileges required".to_string()));
    }

    let state = state_lock.read().await.clone();

    let mut builder = sqlx::QueryBuilder::<sqlx::Sqlite>::new(
        r#"SELECT c.*, COALESCE(j.contact_details_visible, 0) AS contact_details_visible
           FROM candidates c
           LEFT JOIN jobs j ON j.id = c.job_id
           WHERE 1 = 1"#,
    );

    if let Some(job_id) = &filters.job_id {
        builder.push(" AND c.job_id = ").push_bind(job_id);
    }
    if let Some(status) = &filters.parsing_status {
        builder
            .push(" AND c.parsing_status = ")
            .push_bind(status.to_uppercase());
    }
    if let Some(feedback) = &filters.hr_feedback {
        builder
            .push(" AND c.hr_feedback = ")
            .push_bind(feedback.to_uppercase());
    }
    if let Some(min_score) = filters.min_score {
        builder.push(" AND c.ats_score >= ").push_bind(min_score);
    }
    builder.push(" ORDER BY c.ats_score DESC, c.created_at DESC");

    let rows = builder
        .build_query_as::<CandidateWithVisibility>()
        .fetch_all(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let candidates = rows.into_iter().map(|r| r.into_body(&authed)).collect();

    Ok(Json(CandidateListResponse {
        success: true,
        candidates,
    }))
}
