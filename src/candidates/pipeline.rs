// src/candidates/pipeline.rs
//! Background resume parsing.
//!
//! Each uploaded resume is processed by its own spawned task: extract text,
//! profile it with the AI provider, store the structured sections. Progress
//! is written to the candidate row at each stage so clients can poll it.
//! A failing candidate marks only itself FAILED; sibling tasks from the
//! same bulk upload are unaffected.

use anyhow::{anyhow, Context};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::candidates::models::Candidate;
use crate::candidates::status::{
    ParsingStatus, PROGRESS_ANALYZING, PROGRESS_COMPLETED, PROGRESS_EXTRACTING, PROGRESS_QUEUED,
};
use crate::jobs::models::Job;
use crate::services::{JobContext, ResumeProfiler, TextExtractor};

pub const MSG_QUEUED: &str = "Waiting in queue...";
pub const MSG_EXTRACTING: &str = "Extracting resume text...";
pub const MSG_ANALYZING: &str = "Analyzing resume with AI...";
pub const MSG_COMPLETED: &str = "Parsing completed";

/// Spawns and tracks per-candidate parsing tasks
pub struct ResumeProcessor {
    worker: PipelineWorker,
    tasks: Mutex<JoinSet<()>>,
}

impl ResumeProcessor {
    pub fn new(
        db: SqlitePool,
        storage_root: PathBuf,
        extractor: Arc<dyn TextExtractor>,
        profiler: Arc<dyn ResumeProfiler>,
    ) -> Self {
        Self {
            worker: PipelineWorker {
                db,
                storage_root,
                extractor,
                profiler,
            },
            tasks: Mutex::new(JoinSet::new()),
        }
    }

    /// Spawn a background parsing task for the candidate. Returns as soon
    /// as the task is scheduled; progress is observable via the row.
    pub async fn spawn(&self, candidate_id: String) {
        let worker = self.worker.clone();
        let mut tasks = self.tasks.lock().await;

        // Reap tasks that already finished so the set does not grow
        while tasks.try_join_next().is_some() {}

        tasks.spawn(async move {
            worker.process_candidate(&candidate_id).await;
        });
    }

    /// Run the pipeline for one candidate on the current task
    pub async fn process_candidate(&self, candidate_id: &str) {
        self.worker.process_candidate(candidate_id).await;
    }

    /// Wait for all in-flight parsing tasks to finish
    pub async fn shutdown(&self) {
        let mut tasks = self.tasks.lock().await;
        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                error!(error = %e, "Parsing task panicked");
            }
        }
    }
}

/// The per-task pipeline: every handle it holds is cheap to clone, so each
/// spawned task gets its own copy
#[derive(Clone)]
struct PipelineWorker {
    db: SqlitePool,
    storage_root: PathBuf,
    extractor: Arc<dyn TextExtractor>,
    profiler: Arc<dyn ResumeProfiler>,
}

impl PipelineWorker {
    /// Run the full pipeline for one candidate. A missing candidate is a
    /// silent no-op (the record may have been deleted while queued); any
    /// other failure marks the row FAILED without touching siblings.
    async fn process_candidate(&self, candidate_id: &str) {
        let candidate = match self.load_candidate(candidate_id).await {
            Ok(Some(c)) => c,
            Ok(None) => {
                debug!(candidate_id = %candidate_id, "Candidate no longer exists, skipping parse");
                return;
            }
            Err(e) => {
                error!(error = %e, candidate_id = %candidate_id, "Failed to load candidate");
                return;
            }
        };

        info!(candidate_id = %candidate_id, job_id = %candidate.job_id, "Resume parsing started");

        if let Err(e) = self.run_pipeline(&candidate).await {
            error!(error = %e, candidate_id = %candidate_id, "Resume parsing failed");
            self.mark_failed(candidate_id, &e.to_string()).await;
        }
    }

    async fn run_pipeline(&self, candidate: &Candidate) -> anyhow::Result<()> {
        self.update_progress(
            &candidate.id,
            ParsingStatus::Processing,
            PROGRESS_EXTRACTING,
            MSG_EXTRACTING,
        )
        .await?;

        let resume_path = self.resolve_resume_path(&candidate.resume_url);
        let document = self
            .extractor
            .extract(&resume_path)
            .await
            .with_context(|| format!("extracting {}", resume_path.display()))?;

        debug!(
            candidate_id = %candidate.id,
            chars = document.text.len(),
            links = document.links.len(),
            "Resume text extracted"
        );

        self.update_progress(
            &candidate.id,
            ParsingStatus::Processing,
            PROGRESS_ANALYZING,
            MSG_ANALYZING,
        )
        .await?;

        let job_context = self.load_job_context(&candidate.job_id).await;

        let profile = self
            .profiler
            .analyze(&document.text, &document.links, &job_context)
            .await?;

        let ats_score = profile.ai_assessment.overall_score.unwrap_or(0.0);

        let name = profile
            .basic_info
            .full_name
            .clone()
            .unwrap_or_else(|| candidate.name.clone());
        // The profiler maps its no-email sentinel to None, so Some here is
        // always a real address
        let email = profile
            .basic_info
            .email
            .as_ref()
            .map(|e| e.to_lowercase())
            .unwrap_or_else(|| candidate.email.clone());
        let phone_number = profile
            .basic_info
            .phone
            .clone()
            .or_else(|| candidate.phone_number.clone());

        let basic_info = serialize_section(&profile.basic_info)?;
        let executive_summary = serialize_section(&profile.executive_summary)?;
        let education = serialize_section(&profile.education)?;
        let work_experience = serialize_section(&profile.work_experience)?;
        let skills = serialize_section(&profile.skills)?;
        let ai_assessment = serialize_section(&profile.ai_assessment)?;

        sqlx::query(
            r#"UPDATE candidates SET
                name = ?, email = ?, phone_number = ?,
                basic_info = ?, executive_summary = ?, education = ?,
                work_experience = ?, skills = ?, ai_assessment = ?,
                ats_score = ?, is_parsed = 1,
                parsing_status = ?, parsing_progress = ?, parsing_status_message = ?,
                updated_at = datetime('now')
            WHERE id = ?"#,
        )
        .bind(&name)
        .bind(&email)
        .bind(phone_number.as_deref())
        .bind(&basic_info)
        .bind(&executive_summary)
        .bind(&education)
        .bind(&work_experience)
        .bind(&skills)
        .bind(&ai_assessment)
        .bind(ats_score)
        .bind(ParsingStatus::Completed.as_str())
        .bind(PROGRESS_COMPLETED)
        .bind(MSG_COMPLETED)
        .bind(&candidate.id)
        .execute(&self.db)
        .await
        .context("storing parsed profile")?;

        info!(
            candidate_id = %candidate.id,
            ats_score = ats_score,
            "Resume parsing completed"
        );

        Ok(())
    }

    async fn load_candidate(&self, id: &str) -> Result<Option<Candidate>, sqlx::Error> {
        sqlx::query_as::<_, Candidate>("SELECT * FROM candidates WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db)
            .await
    }

    /// Job context for scoring; a missing job degrades to generic analysis
    async fn load_job_context(&self, job_id: &str) -> JobContext {
        let job = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = ?")
            .bind(job_id)
            .fetch_optional(&self.db)
            .await;

        match job {
            Ok(Some(job)) => job.job_context(),
            Ok(None) => {
                warn!(job_id = %job_id, "Job not found for candidate, analyzing without context");
                JobContext::default()
            }
            Err(e) => {
                warn!(error = %e, job_id = %job_id, "Failed to load job, analyzing without context");
                JobContext::default()
            }
        }
    }

    /// Stored resume paths are relative to the storage root; a leading
    /// separator would otherwise make join() discard the root entirely
    fn resolve_resume_path(&self, resume_url: &str) -> PathBuf {
        let relative = resume_url.trim_start_matches(|c| c == '/' || c == '\\');
        self.storage_root.join(relative)
    }

    async fn update_progress(
        &self,
        candidate_id: &str,
        status: ParsingStatus,
        progress: i64,
        message: &str,
    ) -> anyhow::Result<()> {
        let result = sqlx::query(
            r#"UPDATE candidates SET
                parsing_status = ?, parsing_progress = ?, parsing_status_message = ?,
                updated_at = datetime('now')
            WHERE id = ?"#,
        )
        .bind(status.as_str())
        .bind(progress)
        .bind(message)
        .bind(candidate_id)
        .execute(&self.db)
        .await
        .context("updating parsing progress")?;

        if result.rows_affected() == 0 {
            return Err(anyhow!("candidate {} disappeared mid-parse", candidate_id));
        }

        Ok(())
    }

    /// Independent failure write so a broken pipeline stage can never leave
    /// the row stuck in PROCESSING
    async fn mark_failed(&self, candidate_id: &str, message: &str) {
        let result = sqlx::query(
            r#"UPDATE candidates SET
                parsing_status = ?, parsing_progress = ?, parsing_status_message = ?,
                is_parsed = 0, updated_at = datetime('now')
            WHERE id = ?"#,
        )
        .bind(ParsingStatus::Failed.as_str())
        .bind(PROGRESS_QUEUED)
        .bind(message)
        .bind(candidate_id)
        .execute(&self.db)
        .await;

        if let Err(e) = result {
            error!(
                error = %e,
                candidate_id = %candidate_id,
                "Failed to record parsing failure"
            );
        }
    }
}

fn serialize_section<T: serde::Serialize>(section: &T) -> anyhow::Result<String> {
    serde_json::to_string(section).context("serializing profile section")
}
