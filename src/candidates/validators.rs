// src/candidates/validators.rs

use regex::Regex;

use crate::common::{ApiError, ValidationResult, Validator};

/// Resume uploads are capped at 10 MB per file
pub const MAX_RESUME_BYTES: usize = 10 * 1024 * 1024;

/// Metadata of an uploaded resume file, validated before it is written to
/// disk or a candidate row is created
#[derive(Debug)]
pub struct UploadedResume {
    pub file_name: String,
    pub size: usize,
}

pub struct ResumeFileValidator;

impl Validator<UploadedResume> for ResumeFileValidator {
    fn validate(&self, data: &UploadedResume) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.file_name.trim().is_empty() {
            result.add_error("file", "File name is required");
        }

        let is_pdf = data
            .file_name
            .rsplit('.')
            .next()
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false)
            && data.file_name.contains('.');

        if !is_pdf {
            result.add_error("file", "Only PDF resumes are supported");
        }

        if data.size == 0 {
            result.add_error("file", "File is empty");
        } else if data.size > MAX_RESUME_BYTES {
            result.add_error("file", "File exceeds the 10MB size limit");
        }

        result
    }
}

pub fn validate_resume_file(file_name: &str, size: usize) -> Result<(), ApiError> {
    let result = ResumeFileValidator.validate(&UploadedResume {
        file_name: file_name.to_string(),
        size,
    });
    if result.is_valid {
        Ok(())
    } else {
        Err(result.into())
    }
}

/// Validate a caller-supplied email when present; absent is fine, the
/// parser fills it in later
pub fn validate_optional_email(email: Option<&str>) -> Result<(), ApiError> {
    if let Some(email) = email {
        let pattern = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .map_err(|e| ApiError::InternalServer(e.to_string()))?;
        if !pattern.is_match(email.trim()) {
            return Err(ApiError::ValidationError(
                "email: Invalid email format".to_string(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_file_passes() {
        assert!(validate_resume_file("resume.pdf", 1024).is_ok());
        assert!(validate_resume_file("Resume.PDF", 1024).is_ok());
    }

    #[test]
    fn test_non_pdf_fails() {
        assert!(validate_resume_file("resume.docx", 1024).is_err());
        assert!(validate_resume_file("resume", 1024).is_err());
    }

    #[test]
    fn test_size_limits() {
        assert!(validate_resume_file("resume.pdf", 0).is_err());
        assert!(validate_resume_file("resume.pdf", MAX_RESUME_BYTES).is_ok());
        assert!(validate_resume_file("resume.pdf", MAX_RESUME_BYTES + 1).is_err());
    }

    #[test]
    fn test_optional_email() {
        assert!(validate_optional_email(None).is_ok());
        assert!(validate_optional_email(Some("jane@example.com")).is_ok());
        assert!(validate_optional_email(Some("not-an-email")).is_err());
    }
}
