// src/candidates/models.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::common::parse_json_column;
use crate::services::profiler::{
    AiAssessment, BasicInfo, EducationEntry, ExecutiveSummary, Skills, WorkExperienceEntry,
};

/// Candidate database model - one row per uploaded resume
#[derive(FromRow, Debug, Clone)]
pub struct Candidate {
    pub id: String,
    pub job_id: String,
    pub added_by: String,
    pub uploader_role: String,
    pub uploader_name: Option<String>,
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub resume_url: String,
    pub source: Option<String>,
    pub is_parsed: i64,
    pub parsing_status: String,
    pub parsing_progress: i64,
    pub parsing_status_message: String,
    pub basic_info: Option<String>,
    pub executive_summary: Option<String>,
    pub education: Option<String>,
    pub work_experience: Option<String>,
    pub skills: Option<String>,
    pub ai_assessment: Option<String>,
    pub ats_score: f64,
    pub hr_feedback: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Candidate API body with the JSON profile columns hydrated into their
/// typed sections. `status` carries the HR feedback label; the parsing
/// lifecycle lives in `parsing_status`.
#[derive(Serialize, Debug, Clone)]
pub struct CandidateBody {
    pub id: String,
    pub job_id: String,
    pub added_by: String,
    pub uploader_role: String,
    pub uploader_name: Option<String>,
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub resume_url: String,
    pub source: Option<String>,
    pub is_parsed: bool,
    pub parsing_status: String,
    pub parsing_progress: i64,
    pub parsing_status_message: String,
    pub basic_info: Option<BasicInfo>,
    pub executive_summary: Option<ExecutiveSummary>,
    pub education: Option<Vec<EducationEntry>>,
    pub work_experience: Option<Vec<WorkExperienceEntry>>,
    pub skills: Option<Skills>,
    pub ai_assessment: Option<AiAssessment>,
    pub ats_score: f64,
    pub status: String,
    pub contact_details_visible: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl CandidateBody {
    pub fn from_candidate(c: Candidate, contact_details_visible: bool) -> Self {
        CandidateBody {
            basic_info: parse_json_column(&c.basic_info),
            executive_summary: parse_json_column(&c.executive_summary),
            education: parse_json_column(&c.education),
            work_experience: parse_json_column(&c.work_experience),
            skills: parse_json_column(&c.skills),
            ai_assessment: parse_json_column(&c.ai_assessment),
            id: c.id,
            job_id: c.job_id,
            added_by: c.added_by,
            uploader_role: c.uploader_role,
            uploader_name: c.uploader_name,
            name: c.name,
            email: c.email,
            phone_number: c.phone_number,
            resume_url: c.resume_url,
            source: c.source,
            is_parsed: c.is_parsed != 0,
            parsing_status: c.parsing_status,
            parsing_progress: c.parsing_progress,
            parsing_status_message: c.parsing_status_message,
            ats_score: c.ats_score,
            status: c.hr_feedback,
            contact_details_visible,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize, Debug)]
pub struct CandidateResponse {
    pub success: bool,
    pub candidate: CandidateBody,
}

#[derive(Serialize, Debug)]
pub struct CandidateListResponse {
    pub success: bool,
    pub candidates: Vec<CandidateBody>,
}

/// Lightweight polling payload for the parsing progress bar
#[derive(Serialize, Debug)]
pub struct ParsingStatusResponse {
    pub success: bool,
    pub parsing_status: String,
    pub parsing_progress: i64,
    pub parsing_status_message: String,
    pub is_parsed: bool,
}

#[derive(Serialize, Debug)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub candidate: CandidateBody,
}

#[derive(Serialize, Debug)]
pub struct BulkUploadError {
    pub file_name: String,
    pub message: String,
}

#[derive(Serialize, Debug)]
pub struct BulkUploadResponse {
    pub success: bool,
    pub message: String,
    pub candidates: Vec<CandidateBody>,
    pub errors: Vec<BulkUploadError>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateFeedback {
    pub feedback: String,
}

#[derive(Serialize, Debug)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Admin listing filters; all optional and combined with AND
#[derive(Deserialize, Debug, Default)]
pub struct AdminCandidatesQuery {
    pub job_id: Option<String>,
    pub parsing_status: Option<String>,
    pub hr_feedback: Option<String>,
    pub min_score: Option<f64>,
}
