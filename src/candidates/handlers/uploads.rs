// src/candidates/handlers/uploads.rs

use axum::{
    extract::{Extension, Multipart, Path},
    http::StatusCode,
    response::Json,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::auth::AuthedUser;
use crate::candidates::models::*;
use crate::candidates::pipeline::MSG_QUEUED;
use crate::candidates::status::ParsingStatus;
use crate::candidates::validators::{validate_optional_email, validate_resume_file};
use crate::common::{generate_candidate_id, safe_email_log, ApiError, AppState};
use crate::jobs::models::Job;
use crate::services::PLACEHOLDER_EMAIL;

/// Derive a display name from an uploaded file name when no name was given
fn name_from_file_stem(file_name: &str) -> String {
    let stem = file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name);

    let name = stem
        .replace(|c| c == '_' || c == '-', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if name.is_empty() {
        "Unknown Candidate".to_string()
    } else {
        name
    }
}

struct ResumeFile {
    file_name: String,
    data: Vec<u8>,
}

/// Caller-supplied intake fields for one candidate row
struct CandidateIntake<'a> {
    name: Option<&'a str>,
    email: Option<&'a str>,
    phone_number: Option<&'a str>,
    source: &'a str,
    initial_status: ParsingStatus,
}

/// Jobs accept candidates while active or posted; drafts and closed jobs
/// reject uploads
async fn load_active_job(db: &SqlitePool, job_id: &str) -> Result<Job, ApiError> {
    let job = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = ?")
        .bind(job_id)
        .fetch_optional(db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound("job not found".to_string()))?;

    if job.status != "active" && job.status != "posted" {
        return Err(ApiError::BadRequest(
            "job is not accepting candidates".to_string(),
        ));
    }

    Ok(job)
}

/// 400 body for a bulk upload where no file survived validation
fn bulk_rejection(errors: &[BulkUploadError]) -> ApiError {
    let detail = errors
        .iter()
        .map(|e| format!("{}: {}", e.file_name, e.message))
        .collect::<Vec<_>>()
        .join("; ");
    ApiError::BadRequest(format!("no resumes were accepted ({})", detail))
}

async fn uploader_name(state: &AppState, user_id: &str) -> Option<String> {
    sqlx::query_scalar::<_, Option<String>>("SELECT name FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(&state.db)
        .await
        .ok()
        .flatten()
        .flatten()
}

async fn fetch_candidate(state: &AppState, id: &str) -> Result<Candidate, ApiError> {
    sqlx::query_as::<_, Candidate>("SELECT * FROM candidates WHERE id = ?")
        .bind(id)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)
}

/// Write the file to disk and create the candidate row. Returns the new
/// candidate id; parsing is spawned by the caller.
async fn create_candidate(
    state: &AppState,
    authed: &AuthedUser,
    job_id: &str,
    file: &ResumeFile,
    intake: CandidateIntake<'_>,
) -> Result<String, ApiError> {
    let candidate_id = generate_candidate_id();
    let safe_filename = format!("{}.pdf", candidate_id);

    let file_path = state.resumes_dir.join(&safe_filename);
    tokio::fs::write(&file_path, &file.data).await.map_err(|e| {
        error!(error = %e, candidate_id = %candidate_id, "Failed to save resume");
        ApiError::InternalServer("Failed to save resume".to_string())
    })?;

    let resume_url = format!("uploads/resumes/{}", safe_filename);
    let name = intake
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| name_from_file_stem(&file.file_name));
    let email = intake
        .email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| PLACEHOLDER_EMAIL.to_string());
    let uploader_name = uploader_name(state, &authed.id).await;

    sqlx::query(
        r#"INSERT INTO candidates (
            id, job_id, added_by, uploader_role, uploader_name,
            name, email, phone_number, resume_url, source,
            parsing_status, parsing_progress, parsing_status_message
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?)"#,
    )
    .bind(&candidate_id)
    .bind(job_id)
    .bind(&authed.id)
    .bind(authed.role.as_str().to_lowercase())
    .bind(uploader_name.as_deref())
    .bind(&name)
    .bind(&email)
    .bind(intake.phone_number)
    .bind(&resume_url)
    .bind(intake.source)
    .bind(intake.initial_status.as_str())
    .bind(MSG_QUEUED)
    .execute(&state.db)
    .await
    .map_err(|e| {
        error!(error = %e, candidate_id = %candidate_id, "Database error creating candidate");
        ApiError::DatabaseError(e)
    })?;

    info!(
        candidate_id = %candidate_id,
        job_id = %job_id,
        email = %safe_email_log(&email),
        user_id = %authed.id,
        "Candidate created"
    );

    Ok(candidate_id)
}

/// POST /api/candidates - Upload a single resume for a job
pub async fn upload_candidate(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let state = state_lock.read().await.clone();

    let mut job_id: Option<String> = None;
    let mut name: Option<String> = None;
    let mut email: Option<String> = None;
    let mut phone_number: Option<String> = None;
    let mut source: Option<String> = None;
    let mut file: Option<ResumeFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("Invalid multipart payload".to_string()))?
    {
        match field.name() {
            Some("job_id") => job_id = field.text().await.ok(),
            Some("name") => name = field.text().await.ok(),
            Some("email") => email = field.text().await.ok(),
            Some("phone_number") => phone_number = field.text().await.ok(),
            Some("source") => source = field.text().await.ok(),
            Some("resume") => {
                let file_name = field.file_name().unwrap_or("resume.pdf").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::BadRequest("Invalid file".to_string()))?;
                file = Some(ResumeFile {
                    file_name,
                    data: data.to_vec(),
                });
            }
            _ => {}
        }
    }

    let job_id = job_id
        .filter(|j| !j.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("job_id is required".to_string()))?;
    let file = file.ok_or_else(|| ApiError::BadRequest("resume file is required".to_string()))?;

    validate_resume_file(&file.file_name, file.data.len())?;
    validate_optional_email(email.as_deref())?;
    let job = load_active_job(&state.db, &job_id).await?;

    let candidate_id = create_candidate(
        &state,
        &authed,
        &job_id,
        &file,
        CandidateIntake {
            name: name.as_deref(),
            email: email.as_deref(),
            phone_number: phone_number.as_deref(),
            source: source.as_deref().unwrap_or("MANUAL_UPLOAD"),
            initial_status: ParsingStatus::Pending,
        },
    )
    .await?;

    state.processor.spawn(candidate_id.clone()).await;

    let candidate = fetch_candidate(&state, &candidate_id).await?;
    let body = CandidateBody::from_candidate(candidate, job.contact_details_visible != 0);

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            success: true,
            message: "Resume uploaded and queued for parsing".to_string(),
            candidate: body,
        }),
    ))
}

/// POST /api/candidates/bulk - Upload multiple resumes for a job
///
/// Each file becomes its own candidate row and its own parsing task; a
/// rejected or failing file never blocks the rest of the batch.
pub async fn bulk_upload_candidates(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<BulkUploadResponse>), ApiError> {
    let state = state_lock.read().await.clone();

    let mut job_id: Option<String> = None;
    let mut source: Option<String> = None;
    let mut files: Vec<ResumeFile> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("Invalid multipart payload".to_string()))?
    {
        match field.name() {
            Some("job_id") => job_id = field.text().await.ok(),
            Some("source") => source = field.text().await.ok(),
            Some("resumes") => {
                let file_name = field.file_name().unwrap_or("resume.pdf").to_string();
                match field.bytes().await {
                    Ok(data) => files.push(ResumeFile {
                        file_name,
                        data: data.to_vec(),
                    }),
                    Err(_) => {
                        warn!(file_name = %file_name, "Skipping unreadable file in bulk upload")
                    }
                }
            }
            _ => {}
        }
    }

    let job_id = job_id
        .filter(|j| !j.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("job_id is required".to_string()))?;

    if files.is_empty() {
        return Err(ApiError::BadRequest("no resume files provided".to_string()));
    }

    let job = load_active_job(&state.db, &job_id).await?;
    let visible = job.contact_details_visible != 0;

    let mut accepted: Vec<CandidateBody> = Vec::new();
    let mut errors: Vec<BulkUploadError> = Vec::new();

    for file in &files {
        if let Err(e) = validate_resume_file(&file.file_name, file.data.len()) {
            errors.push(BulkUploadError {
                file_name: file.file_name.clone(),
                message: e.to_string(),
            });
            continue;
        }

        let intake = CandidateIntake {
            name: None,
            email: None,
            phone_number: None,
            source: source.as_deref().unwrap_or("BULK_UPLOAD"),
            initial_status: ParsingStatus::Processing,
        };

        match create_candidate(&state, &authed, &job_id, file, intake).await {
            Ok(candidate_id) => {
                state.processor.spawn(candidate_id.clone()).await;
                let candidate = fetch_candidate(&state, &candidate_id).await?;
                accepted.push(CandidateBody::from_candidate(candidate, visible));
            }
            Err(e) => {
                warn!(error = %e, file_name = %file.file_name, "Bulk upload item failed");
                errors.push(BulkUploadError {
                    file_name: file.file_name.clone(),
                    message: e.to_string(),
                });
            }
        }
    }

    info!(
        job_id = %job_id,
        accepted = accepted.len(),
        rejected = errors.len(),
        user_id = %authed.id,
        "Bulk upload processed"
    );

    if accepted.is_empty() {
        return Err(bulk_rejection(&errors));
    }

    Ok((
        StatusCode::CREATED,
        Json(BulkUploadResponse {
            success: true,
            message: format!("{} resume(s) queued for parsing", accepted.len()),
            candidates: accepted,
            errors,
        }),
    ))
}

/// POST /api/candidates/:id/reparse - Re-queue a candidate for parsing
pub async fn reparse_candidate(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let (candidate, job) = super::load_candidate_with_job(&state.db, &id).await?;
    if !super::can_access_candidate(&authed, &candidate, job.as_ref()) {
        return Err(ApiError::Forbidden("not allowed".to_string()));
    }

    let current =
        ParsingStatus::parse(&candidate.parsing_status).unwrap_or(ParsingStatus::Pending);
    if !current.can_transition(ParsingStatus::Pending) {
        return Err(ApiError::BadRequest(
            "candidate cannot be re-queued".to_string(),
        ));
    }

    sqlx::query(
        r#"UPDATE candidates SET
            parsing_status = ?, parsing_progress = 0,
            parsing_status_message = 'Queued for reparse', is_parsed = 0,
            updated_at = datetime('now')
        WHERE id = ?"#,
    )
    .bind(ParsingStatus::Pending.as_str())
    .bind(&id)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    state.processor.spawn(id.clone()).await;

    info!(candidate_id = %id, user_id = %authed.id, "Candidate re-queued for parsing");

    Ok(Json(MessageResponse {
        success: true,
        message: "Candidate queued for reparse".to_string(),
    }))
}
