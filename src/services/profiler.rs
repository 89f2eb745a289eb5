// src/services/profiler.rs
//! AI resume profiling
//!
//! Sends extracted resume text plus the job context to an OpenAI-compatible
//! chat-completions API and parses the reply into a typed profile. The
//! provider is prompted for a fixed JSON schema; anything it returns outside
//! that schema is tolerated field-by-field rather than failing the whole
//! candidate.
//!
//! The upstream model is instructed to emit `pending@parsing.com` when a
//! resume carries no email. That sentinel is converted to `None` here, at
//! the boundary, so the rest of the pipeline never compares magic strings.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::services::settings::SettingsService;

/// Sentinel the AI provider uses for "no email found"; also used as the
/// intake placeholder for bulk uploads
pub const PLACEHOLDER_EMAIL: &str = "pending@parsing.com";

const MAX_RESUME_CHARS: usize = 8000;

const SYSTEM_INSTRUCTION: &str = "You are a Senior Technical Recruiter. Extract candidate data into the specified JSON format.\nONLY include professional work experience. NO personal/academic projects.\nStrictly return ONLY the JSON object. NO markdown, NO preamble.";

const JSON_SCHEMA: &str = r#"{
  "basic_info": { "full_name": "string", "job_title": "string", "location": "string", "email": "string", "phone": "string", "linkedin": "string", "github": "string", "experience_years": "number" },
  "executive_summary": { "ai_generated_summary": "string" },
  "education": [{ "degree": "string", "institution": "string", "year": "number" }],
  "work_experience": [{ "role": "string", "company": "string", "start_date": "string", "end_date": "string", "responsibilities": ["string"] }],
  "skills": { "technical_skills": { "advanced": ["string"], "intermediate": ["string"], "beginner": ["string"] }, "soft_skills": ["string"] },
  "ai_assessment": { "technical_fit": "number", "cultural_fit": "number", "overall_score": "number", "strengths": ["string"], "areas_for_growth": ["string"] }
}"#;

#[derive(Debug, thiserror::Error)]
pub enum ProfilerError {
    #[error("AI provider not configured")]
    NotConfigured,

    #[error("AI request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid AI response: {0}")]
    InvalidResponse(String),
}

/// Job context handed to the profiler so scoring reflects the posting
#[derive(Debug, Clone, Default, Serialize)]
pub struct JobContext {
    pub title: String,
    pub skills_required: Vec<String>,
    pub description: String,
}

// ============================================================================
// Profile Schema
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasicInfo {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub github: Option<String>,
    #[serde(default)]
    pub experience_years: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    #[serde(default)]
    pub ai_generated_summary: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub year: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkExperienceEntry {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub responsibilities: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnicalSkills {
    #[serde(default)]
    pub advanced: Vec<String>,
    #[serde(default)]
    pub intermediate: Vec<String>,
    #[serde(default)]
    pub beginner: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Skills {
    #[serde(default)]
    pub technical_skills: TechnicalSkills,
    #[serde(default)]
    pub soft_skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiAssessment {
    #[serde(default)]
    pub technical_fit: Option<f64>,
    #[serde(default)]
    pub cultural_fit: Option<f64>,
    #[serde(default)]
    pub overall_score: Option<f64>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub areas_for_growth: Vec<String>,
}

/// Structured profile returned by the AI provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeProfile {
    #[serde(default)]
    pub basic_info: BasicInfo,
    #[serde(default)]
    pub executive_summary: ExecutiveSummary,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub work_experience: Vec<WorkExperienceEntry>,
    #[serde(default)]
    pub skills: Skills,
    #[serde(default)]
    pub ai_assessment: AiAssessment,
}

impl ResumeProfile {
    /// Normalize provider output: the placeholder email and empty strings
    /// become `None` so callers never have to compare sentinels
    pub fn sanitize(mut self) -> Self {
        let is_placeholder = |v: &String| {
            v.trim().is_empty() || v.trim().eq_ignore_ascii_case(PLACEHOLDER_EMAIL)
        };
        if self.basic_info.email.as_ref().map_or(false, is_placeholder) {
            self.basic_info.email = None;
        }
        for field in [
            &mut self.basic_info.full_name,
            &mut self.basic_info.phone,
            &mut self.basic_info.job_title,
            &mut self.basic_info.location,
        ] {
            if field.as_deref().map_or(false, |v| v.trim().is_empty()) {
                *field = None;
            }
        }
        self
    }
}

/// Boundary to the AI analysis collaborator
#[async_trait]
pub trait ResumeProfiler: Send + Sync {
    async fn analyze(
        &self,
        text: &str,
        links: &[String],
        job: &JobContext,
    ) -> Result<ResumeProfile, ProfilerError>;
}

// ============================================================================
// OpenAI-backed implementation
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

pub struct OpenAiProfiler {
    settings_service: Arc<SettingsService>,
    client: Client,
}

impl OpenAiProfiler {
    pub fn new(settings_service: Arc<SettingsService>) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(180))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            settings_service,
            client,
        }
    }

    async fn get_setting_or(&self, key: &str, default: &str) -> String {
        self.settings_service
            .get_setting(key)
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| default.to_string())
    }

    fn build_prompt(text: &str, links: &[String], job: &JobContext) -> String {
        let jd_context = if job.title.is_empty() {
            "No JD.".to_string()
        } else {
            let description: String = job.description.chars().take(500).collect();
            format!(
                "JD: {}. Requirements: {}. {}",
                job.title,
                job.skills_required.join(", "),
                description
            )
        };

        // Control characters confuse smaller models; strip and truncate
        let cleaned: String = text
            .chars()
            .filter(|c| !c.is_control() || *c == '\n')
            .take(MAX_RESUME_CHARS)
            .collect();

        format!(
            "Schema:\n{}\n\nContext:\n{}\nLinks: {}\n\nResume Text:\n{}\n\nJSON Output:",
            JSON_SCHEMA,
            jd_context,
            links.join(", "),
            cleaned
        )
    }
}

#[async_trait]
impl ResumeProfiler for OpenAiProfiler {
    async fn analyze(
        &self,
        text: &str,
        links: &[String],
        job: &JobContext,
    ) -> Result<ResumeProfile, ProfilerError> {
        let api_key = self
            .settings_service
            .get_setting("openai_api_key")
            .await
            .ok()
            .flatten()
            .ok_or(ProfilerError::NotConfigured)?;

        let base_url = self
            .get_setting_or("openai_base_url", "https://api.openai.com")
            .await;
        let model = self
            .get_setting_or("openai_model_resume_parsing", "gpt-4o-mini")
            .await;

        let request = ChatCompletionRequest {
            model: model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_INSTRUCTION.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Self::build_prompt(text, links, job),
                },
            ],
            temperature: 0.2,
            response_format: serde_json::json!({"type": "json_object"}),
        };

        debug!(model = %model, "Sending resume profiling request");

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", base_url))
            .bearer_auth(&api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProfilerError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, "AI provider returned error");
            return Err(ProfilerError::RequestFailed(format!(
                "provider returned {}: {}",
                status, body
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ProfilerError::InvalidResponse(e.to_string()))?;

        let content = completion
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .ok_or_else(|| ProfilerError::InvalidResponse("empty completion".to_string()))?;

        let profile = parse_profile_response(content)?;

        info!(
            model = %model,
            has_email = profile.basic_info.email.is_some(),
            overall_score = ?profile.ai_assessment.overall_score,
            "Resume profiling completed"
        );

        Ok(profile)
    }
}

/// Parse the provider's reply, tolerating markdown fences and preamble by
/// falling back to the outermost JSON object
pub fn parse_profile_response(content: &str) -> Result<ResumeProfile, ProfilerError> {
    let parsed: Result<ResumeProfile, _> = serde_json::from_str(content);
    let profile = match parsed {
        Ok(p) => p,
        Err(_) => {
            let start = content.find('{');
            let end = content.rfind('}');
            match (start, end) {
                (Some(s), Some(e)) if e > s => serde_json::from_str(&content[s..=e])
                    .map_err(|err| ProfilerError::InvalidResponse(err.to_string()))?,
                _ => {
                    return Err(ProfilerError::InvalidResponse(
                        "no JSON object in response".to_string(),
                    ))
                }
            }
        }
    };
    Ok(profile.sanitize())
}
