// src/jobs/handlers.rs

use axum::{
    extract::{Extension, Path},
    response::Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::auth::AuthedUser;
use crate::common::{generate_job_id, ApiError, AppState};
use crate::jobs::models::*;
use crate::jobs::validators::validate_create_job;

/// POST /api/jobs - Create a new job posting
pub async fn create_job(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(body): Json<CreateJob>,
) -> Result<Json<JobResponse>, ApiError> {
    validate_create_job(&body)?;

    let state = state_lock.read().await.clone();
    let id = generate_job_id();

    let skills_json = body
        .skills
        .as_ref()
        .map(|s| serde_json::to_string(s).unwrap_or_else(|_| "[]".to_string()));

    let now = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

    sqlx::query(
        r#"INSERT INTO jobs (id, user_id, title, description, skills, status, contact_details_visible, created_at, updated_at)
           VALUES (?, ?, ?, ?, ?, 'active', 0, ?, ?)"#,
    )
    .bind(&id)
    .bind(&authed.id)
    .bind(body.title.trim())
    .bind(body.description.as_deref())
    .bind(skills_json.as_deref())
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(|e| {
        error!(error = %e, job_id = %id, user_id = %authed.id, "Database error creating job");
        ApiError::DatabaseError(e)
    })?;

    info!(job_id = %id, user_id = %authed.id, "Job created");

    let job = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    Ok(Json(JobResponse {
        success: true,
        job: job.into(),
    }))
}

/// GET /api/jobs/:id - Fetch a single job
pub async fn get_job(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _authed: AuthedUser,
    Path(id): Path<String>,
) -> Result<Json<JobResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let job = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound("job not found".to_string()))?;

    Ok(Json(JobResponse {
        success: true,
        job: job.into(),
    }))
}

/// GET /api/jobs/my-jobs - List jobs owned by the caller
pub async fn list_my_jobs(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<JobListResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let jobs = sqlx::query_as::<_, Job>(
        "SELECT * FROM jobs WHERE user_id = ? ORDER BY created_at DESC",
    )
    .bind(&authed.id)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    Ok(Json(JobListResponse {
        success: true,
        jobs: jobs.into_iter().map(Into::into).collect(),
    }))
}

/// PUT /api/jobs/:id/contact-visibility - Toggle whether non-admin viewers
/// see candidate contact details for this job
pub async fn update_contact_visibility(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateVisibility>,
) -> Result<Json<JobResponse>, ApiError> {
    if !authed.is_admin() {
        return Err(ApiError::Forbidden("admin privileges required".to_string()));
    }

    let state = state_lock.read().await.clone();

    let result = sqlx::query(
        "UPDATE jobs SET contact_details_visible = ?, updated_at = datetime('now') WHERE id = ?",
    )
    .bind(body.contact_details_visible as i64)
    .bind(&id)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("job not found".to_string()));
    }

    info!(
        job_id = %id,
        visible = body.contact_details_visible,
        user_id = %authed.id,
        "Contact visibility updated"
    );

    let job = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    Ok(Json(JobResponse {
        success: true,
        job: job.into(),
    }))
}
