// Application state shared across all modules

use sqlx::SqlitePool;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use crate::candidates::pipeline::ResumeProcessor;
use crate::common::dev_mode::DevModeConfig;
use crate::services::SettingsService;

/// Application state containing database pool, services, and configuration
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub resumes_dir: PathBuf,
    pub jwt_secret: String,
    pub admin_emails: HashSet<String>,
    pub dev_mode: DevModeConfig,
    pub processor: Arc<ResumeProcessor>,
    pub settings_service: Arc<SettingsService>,
}
