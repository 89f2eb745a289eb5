// src/jobs/models.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::common::parse_json_column;
use crate::services::JobContext;

/// Job database model
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Job {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub skills: Option<String>,
    pub status: String,
    pub contact_details_visible: i64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Job {
    pub fn skills_list(&self) -> Vec<String> {
        parse_json_column(&self.skills).unwrap_or_default()
    }

    /// Context handed to the resume profiler for job-aware scoring
    pub fn job_context(&self) -> JobContext {
        JobContext {
            title: self.title.clone(),
            skills_required: self.skills_list(),
            description: self.description.clone().unwrap_or_default(),
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct CreateJob {
    pub title: String,
    pub description: Option<String>,
    pub skills: Option<Vec<String>>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateVisibility {
    pub contact_details_visible: bool,
}

/// Job API response
#[derive(Serialize, Debug)]
pub struct JobResponse {
    pub success: bool,
    pub job: JobBody,
}

#[derive(Serialize, Debug)]
pub struct JobBody {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub skills: Vec<String>,
    pub status: String,
    pub contact_details_visible: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<Job> for JobBody {
    fn from(job: Job) -> Self {
        let skills = job.skills_list();
        JobBody {
            id: job.id,
            user_id: job.user_id,
            title: job.title,
            description: job.description,
            skills,
            status: job.status,
            contact_details_visible: job.contact_details_visible != 0,
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct JobListResponse {
    pub success: bool,
    pub jobs: Vec<JobBody>,
}
