// src/candidates/tests/pipeline_tests.rs
//! End-to-end pipeline tests over an in-memory database with mock
//! extraction and profiling collaborators.

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::candidates::models::Candidate;
use crate::candidates::pipeline::{ResumeProcessor, MSG_COMPLETED, MSG_QUEUED};
use crate::candidates::status::ParsingStatus;
use crate::common::migrations::run_migrations;
use crate::services::extraction::{ExtractedDocument, ExtractionError, TextExtractor};
use crate::services::profiler::{
    AiAssessment, BasicInfo, JobContext, ProfilerError, ResumeProfile, ResumeProfiler,
};

async fn setup_db() -> SqlitePool {
    // A single connection keeps every query on the same in-memory database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}

async fn insert_job(pool: &SqlitePool, job_id: &str) {
    sqlx::query("INSERT INTO users (id, email, name) VALUES ('U_TEST01', 'hr@test.com', 'HR')")
        .execute(pool)
        .await
        .ok();
    sqlx::query(
        r#"INSERT INTO jobs (id, user_id, title, description, skills)
           VALUES (?, 'U_TEST01', 'Backend Engineer', 'Build services', '["Rust","SQL"]')"#,
    )
    .bind(job_id)
    .execute(pool)
    .await
    .unwrap();
}

async fn insert_candidate(pool: &SqlitePool, id: &str, job_id: &str, email: &str, resume_url: &str) {
    sqlx::query(
        r#"INSERT INTO candidates (id, job_id, added_by, name, email, resume_url)
           VALUES (?, ?, 'U_TEST01', 'resume', ?, ?)"#,
    )
    .bind(id)
    .bind(job_id)
    .bind(email)
    .bind(resume_url)
    .execute(pool)
    .await
    .unwrap();
}

async fn fetch(pool: &SqlitePool, id: &str) -> Candidate {
    sqlx::query_as::<_, Candidate>("SELECT * FROM candidates WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Extractor mock that records the resolved path and the row's progress at
/// call time; paths containing `fail_marker` produce an extraction error
struct MockExtractor {
    db: SqlitePool,
    seen_paths: Arc<Mutex<Vec<String>>>,
    seen_progress: Arc<Mutex<Vec<i64>>>,
    fail_marker: Option<String>,
}

impl MockExtractor {
    fn new(db: SqlitePool) -> Self {
        Self {
            db,
            seen_paths: Arc::new(Mutex::new(Vec::new())),
            seen_progress: Arc::new(Mutex::new(Vec::new())),
            fail_marker: None,
        }
    }

    fn failing_on(db: SqlitePool, marker: &str) -> Self {
        Self {
            fail_marker: Some(marker.to_string()),
            ..Self::new(db)
        }
    }
}

#[async_trait]
impl TextExtractor for MockExtractor {
    async fn extract(&self, path: &Path) -> Result<ExtractedDocument, ExtractionError> {
        let path_str = path.to_string_lossy().to_string();
        self.seen_paths.lock().unwrap().push(path_str.clone());

        let progress: i64 =
            sqlx::query_scalar("SELECT parsing_progress FROM candidates LIMIT 1")
                .fetch_one(&self.db)
                .await
                .unwrap();
        self.seen_progress.lock().unwrap().push(progress);

        if let Some(marker) = &self.fail_marker {
            if path_str.contains(marker) {
                return Err(ExtractionError::Unreadable("corrupt file".to_string()));
            }
        }

        Ok(ExtractedDocument {
            text: "Jane Doe. Backend engineer. Rust and SQL.".to_string(),
            links: vec!["https://github.com/jane".to_string()],
        })
    }
}

/// Profiler mock returning a canned profile; records the row's progress and
/// the job context it was handed
struct MockProfiler {
    db: SqlitePool,
    profile: ResumeProfile,
    seen_progress: Arc<Mutex<Vec<i64>>>,
    seen_contexts: Arc<Mutex<Vec<JobContext>>>,
    fail: bool,
}

impl MockProfiler {
    fn returning(db: SqlitePool, profile: ResumeProfile) -> Self {
        Self {
            db,
            profile,
            seen_progress: Arc::new(Mutex::new(Vec::new())),
            seen_contexts: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }
}

#[async_trait]
impl ResumeProfiler for MockProfiler {
    async fn analyze(
        &self,
        _text: &str,
        _links: &[String],
        job: &JobContext,
    ) -> Result<ResumeProfile, ProfilerError> {
        let progress: i64 =
            sqlx::query_scalar("SELECT parsing_progress FROM candidates LIMIT 1")
                .fetch_one(&self.db)
                .await
                .unwrap();
        self.seen_progress.lock().unwrap().push(progress);
        self.seen_contexts.lock().unwrap().push(job.clone());

        if self.fail {
            return Err(ProfilerError::RequestFailed("provider down".to_string()));
        }
        Ok(self.profile.clone())
    }
}

fn jane_profile() -> ResumeProfile {
    ResumeProfile {
        basic_info: BasicInfo {
            full_name: Some("Jane Doe".to_string()),
            email: Some("Jane.Doe@Example.com".to_string()),
            phone: Some("+1-555-0100".to_string()),
            ..Default::default()
        },
        ai_assessment: AiAssessment {
            technical_fit: Some(90.0),
            cultural_fit: Some(80.0),
            overall_score: Some(87.5),
            strengths: vec!["Rust".to_string()],
            ..Default::default()
        },
        ..Default::default()
    }
}

fn processor(
    db: SqlitePool,
    extractor: MockExtractor,
    profiler: MockProfiler,
) -> Arc<ResumeProcessor> {
    Arc::new(ResumeProcessor::new(
        db,
        PathBuf::from("/srv/storage"),
        Arc::new(extractor),
        Arc::new(profiler),
    ))
}

#[tokio::test]
async fn test_pipeline_completes_and_stores_profile() {
    let db = setup_db().await;
    insert_job(&db, "J_TEST01").await;
    insert_candidate(
        &db,
        "CA_TEST01",
        "J_TEST01",
        "pending@parsing.com",
        "uploads/resumes/CA_TEST01.pdf",
    )
    .await;

    let proc = processor(
        db.clone(),
        MockExtractor::new(db.clone()),
        MockProfiler::returning(db.clone(), jane_profile()),
    );
    proc.process_candidate("CA_TEST01").await;

    let c = fetch(&db, "CA_TEST01").await;
    assert_eq!(c.parsing_status, "COMPLETED");
    assert_eq!(c.parsing_progress, 100);
    assert_eq!(c.parsing_status_message, MSG_COMPLETED);
    assert_eq!(c.is_parsed, 1);
    assert_eq!(c.name, "Jane Doe");
    assert_eq!(c.email, "jane.doe@example.com");
    assert_eq!(c.phone_number.as_deref(), Some("+1-555-0100"));
    assert!((c.ats_score - 87.5).abs() < f64::EPSILON);

    let basic: BasicInfo = serde_json::from_str(c.basic_info.as_deref().unwrap()).unwrap();
    assert_eq!(basic.full_name.as_deref(), Some("Jane Doe"));
    let assessment: AiAssessment =
        serde_json::from_str(c.ai_assessment.as_deref().unwrap()).unwrap();
    assert_eq!(assessment.overall_score, Some(87.5));
}

#[tokio::test]
async fn test_progress_checkpoints_in_order() {
    let db = setup_db().await;
    insert_job(&db, "J_TEST01").await;
    insert_candidate(
        &db,
        "CA_TEST01",
        "J_TEST01",
        "pending@parsing.com",
        "uploads/resumes/CA_TEST01.pdf",
    )
    .await;

    let extractor = MockExtractor::new(db.clone());
    let profiler = MockProfiler::returning(db.clone(), jane_profile());
    let extractor_progress = Arc::clone(&extractor.seen_progress);
    let profiler_progress = Arc::clone(&profiler.seen_progress);

    let proc = processor(db.clone(), extractor, profiler);
    proc.process_candidate("CA_TEST01").await;

    // Extraction runs at 20, analysis at 50, completion lands at 100
    assert_eq!(*extractor_progress.lock().unwrap(), vec![20]);
    assert_eq!(*profiler_progress.lock().unwrap(), vec![50]);
    assert_eq!(fetch(&db, "CA_TEST01").await.parsing_progress, 100);
}

#[tokio::test]
async fn test_missing_candidate_is_a_silent_noop() {
    let db = setup_db().await;
    let extractor = MockExtractor::new(db.clone());
    let extractor_paths = Arc::clone(&extractor.seen_paths);

    let proc = processor(
        db.clone(),
        extractor,
        MockProfiler::returning(db.clone(), jane_profile()),
    );
    proc.process_candidate("CA_GONE00").await;

    // Nothing was extracted and nothing blew up
    assert!(extractor_paths.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_existing_email_survives_profile_without_one() {
    let db = setup_db().await;
    insert_job(&db, "J_TEST01").await;
    insert_candidate(
        &db,
        "CA_TEST01",
        "J_TEST01",
        "existing@example.com",
        "uploads/resumes/CA_TEST01.pdf",
    )
    .await;

    let mut profile = jane_profile();
    profile.basic_info.email = None;
    profile.basic_info.phone = None;

    let proc = processor(
        db.clone(),
        MockExtractor::new(db.clone()),
        MockProfiler::returning(db.clone(), profile),
    );
    proc.process_candidate("CA_TEST01").await;

    let c = fetch(&db, "CA_TEST01").await;
    assert_eq!(c.parsing_status, "COMPLETED");
    assert_eq!(c.email, "existing@example.com");
}

#[tokio::test]
async fn test_failure_marks_failed_and_resets_progress() {
    let db = setup_db().await;
    insert_job(&db, "J_TEST01").await;
    insert_candidate(
        &db,
        "CA_TEST01",
        "J_TEST01",
        "pending@parsing.com",
        "uploads/resumes/CA_TEST01.pdf",
    )
    .await;

    let proc = processor(
        db.clone(),
        MockExtractor::failing_on(db.clone(), "CA_TEST01"),
        MockProfiler::returning(db.clone(), jane_profile()),
    );
    proc.process_candidate("CA_TEST01").await;

    let c = fetch(&db, "CA_TEST01").await;
    assert_eq!(c.parsing_status, "FAILED");
    assert_eq!(c.parsing_progress, 0);
    assert_eq!(c.is_parsed, 0);
    assert!(!c.parsing_status_message.is_empty());
    assert_ne!(c.parsing_status_message, MSG_QUEUED);
}

#[tokio::test]
async fn test_one_bad_file_does_not_poison_the_batch() {
    let db = setup_db().await;
    insert_job(&db, "J_TEST01").await;
    for id in ["CA_AAAAAA", "CA_BBBBBB", "CA_CCCCCC"] {
        insert_candidate(
            &db,
            id,
            "J_TEST01",
            "pending@parsing.com",
            &format!("uploads/resumes/{}.pdf", id),
        )
        .await;
    }

    let proc = processor(
        db.clone(),
        MockExtractor::failing_on(db.clone(), "CA_BBBBBB"),
        MockProfiler::returning(db.clone(), jane_profile()),
    );

    for id in ["CA_AAAAAA", "CA_BBBBBB", "CA_CCCCCC"] {
        proc.spawn(id.to_string()).await;
    }
    proc.shutdown().await;

    assert_eq!(fetch(&db, "CA_AAAAAA").await.parsing_status, "COMPLETED");
    assert_eq!(fetch(&db, "CA_BBBBBB").await.parsing_status, "FAILED");
    assert_eq!(fetch(&db, "CA_CCCCCC").await.parsing_status, "COMPLETED");
}

#[tokio::test]
async fn test_profiler_receives_job_context() {
    let db = setup_db().await;
    insert_job(&db, "J_TEST01").await;
    insert_candidate(
        &db,
        "CA_TEST01",
        "J_TEST01",
        "pending@parsing.com",
        "uploads/resumes/CA_TEST01.pdf",
    )
    .await;

    let profiler = MockProfiler::returning(db.clone(), jane_profile());
    let contexts = Arc::clone(&profiler.seen_contexts);

    let proc = processor(db.clone(), MockExtractor::new(db.clone()), profiler);
    proc.process_candidate("CA_TEST01").await;

    let seen = contexts.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].title, "Backend Engineer");
    assert_eq!(seen[0].skills_required, vec!["Rust", "SQL"]);
}

#[tokio::test]
async fn test_leading_separator_stays_inside_storage_root() {
    let db = setup_db().await;
    insert_job(&db, "J_TEST01").await;
    insert_candidate(
        &db,
        "CA_TEST01",
        "J_TEST01",
        "pending@parsing.com",
        "/uploads/resumes/CA_TEST01.pdf",
    )
    .await;

    let extractor = MockExtractor::new(db.clone());
    let paths = Arc::clone(&extractor.seen_paths);

    let proc = processor(
        db.clone(),
        extractor,
        MockProfiler::returning(db.clone(), jane_profile()),
    );
    proc.process_candidate("CA_TEST01").await;

    let seen = paths.lock().unwrap();
    assert_eq!(seen[0], "/srv/storage/uploads/resumes/CA_TEST01.pdf");
}

#[tokio::test]
async fn test_stuck_processing_candidate_can_be_requeued() {
    let db = setup_db().await;
    insert_job(&db, "J_TEST01").await;
    insert_candidate(
        &db,
        "CA_TEST01",
        "J_TEST01",
        "pending@parsing.com",
        "uploads/resumes/CA_TEST01.pdf",
    )
    .await;

    // Simulate a task hung mid-parse on an external call
    sqlx::query(
        r#"UPDATE candidates SET parsing_status = 'PROCESSING', parsing_progress = 50,
           parsing_status_message = 'Analyzing resume with AI...' WHERE id = 'CA_TEST01'"#,
    )
    .execute(&db)
    .await
    .unwrap();

    // The recovery gate must permit re-queueing stuck rows
    let stuck = fetch(&db, "CA_TEST01").await;
    let current = ParsingStatus::parse(&stuck.parsing_status).unwrap();
    assert!(current.can_transition(ParsingStatus::Pending));

    sqlx::query(
        r#"UPDATE candidates SET parsing_status = 'PENDING', parsing_progress = 0,
           parsing_status_message = 'Queued for reparse', is_parsed = 0 WHERE id = 'CA_TEST01'"#,
    )
    .execute(&db)
    .await
    .unwrap();

    let proc = processor(
        db.clone(),
        MockExtractor::new(db.clone()),
        MockProfiler::returning(db.clone(), jane_profile()),
    );
    proc.spawn("CA_TEST01".to_string()).await;
    proc.shutdown().await;

    let c = fetch(&db, "CA_TEST01").await;
    assert_eq!(c.parsing_status, "COMPLETED");
    assert_eq!(c.parsing_progress, 100);
    assert_eq!(c.is_parsed, 1);
}

#[tokio::test]
async fn test_missing_job_degrades_to_empty_context() {
    let db = setup_db().await;
    // The fixture needs a candidate whose job row is genuinely absent, so FK
    // enforcement is suspended for this one insert
    sqlx::query("PRAGMA foreign_keys = OFF")
        .execute(&db)
        .await
        .unwrap();
    insert_candidate(
        &db,
        "CA_TEST01",
        "J_GONE00",
        "pending@parsing.com",
        "uploads/resumes/CA_TEST01.pdf",
    )
    .await;
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&db)
        .await
        .unwrap();

    let profiler = MockProfiler::returning(db.clone(), jane_profile());
    let contexts = Arc::clone(&profiler.seen_contexts);

    let proc = processor(db.clone(), MockExtractor::new(db.clone()), profiler);
    proc.process_candidate("CA_TEST01").await;

    assert_eq!(fetch(&db, "CA_TEST01").await.parsing_status, "COMPLETED");
    assert!(contexts.lock().unwrap()[0].title.is_empty());
}
