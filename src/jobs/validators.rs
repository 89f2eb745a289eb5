// src/jobs/validators.rs

use super::models::*;
use crate::common::{ApiError, ValidationResult, Validator};

// ============================================================================
// Job Validators
// ============================================================================

pub struct JobValidator;

impl Validator<CreateJob> for JobValidator {
    fn validate(&self, data: &CreateJob) -> ValidationResult {
        let mut result = ValidationResult::new();

        // Validate title
        if data.title.trim().is_empty() {
            result.add_error("title", "Job title is required");
        } else if data.title.len() > 255 {
            result.add_error("title", "Job title must be less than 255 characters");
        }

        // Validate description length if provided
        if let Some(description) = &data.description {
            if description.len() > 10000 {
                result.add_error(
                    "description",
                    "Description must be less than 10000 characters",
                );
            }
        }

        // Validate skills if provided
        if let Some(skills) = &data.skills {
            if skills.len() > 50 {
                result.add_error("skills", "At most 50 skills are allowed");
            }
            if skills.iter().any(|s| s.trim().is_empty()) {
                result.add_error("skills", "Skills must not be empty strings");
            }
        }

        result
    }
}

pub fn validate_create_job(data: &CreateJob) -> Result<(), ApiError> {
    let result = JobValidator.validate(data);
    if result.is_valid {
        Ok(())
    } else {
        Err(result.into())
    }
}
