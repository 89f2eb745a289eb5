// src/candidates/privacy.rs
//! Contact-detail redaction for non-admin viewers.
//!
//! Jobs carry a `contact_details_visible` flag. While it is off, anyone who
//! is not an admin sees masked contact fields and no resume link; flipping
//! the flag restores the real values on the next read. Masking happens at
//! response-build time only - stored rows are never altered.

use crate::auth::UserRole;
use crate::candidates::models::CandidateBody;

pub const MASKED_EMAIL: &str = "***@***.***";
pub const MASKED_PHONE: &str = "+XX-XXXXXXXXXX";

/// Apply contact masking to a response body when the viewer may not see
/// contact details for this job
pub fn apply_privacy_filters(body: &mut CandidateBody, viewer_role: UserRole) {
    if viewer_role == UserRole::Admin || body.contact_details_visible {
        return;
    }

    body.email = MASKED_EMAIL.to_string();
    body.phone_number = Some(MASKED_PHONE.to_string());
    body.resume_url = String::new();

    if let Some(basic_info) = body.basic_info.as_mut() {
        if basic_info.email.is_some() {
            basic_info.email = Some(MASKED_EMAIL.to_string());
        }
        if basic_info.phone.is_some() {
            basic_info.phone = Some(MASKED_PHONE.to_string());
        }
        basic_info.linkedin = None;
        basic_info.github = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::profiler::BasicInfo;

    fn body(visible: bool) -> CandidateBody {
        CandidateBody {
            id: "CA_ABC123".to_string(),
            job_id: "J_XYZ789".to_string(),
            added_by: "U_123456".to_string(),
            uploader_role: "admin".to_string(),
            uploader_name: None,
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone_number: Some("+1-555-0100".to_string()),
            resume_url: "uploads/resumes/jane.pdf".to_string(),
            source: None,
            is_parsed: true,
            parsing_status: "COMPLETED".to_string(),
            parsing_progress: 100,
            parsing_status_message: "Parsing completed".to_string(),
            basic_info: Some(BasicInfo {
                email: Some("jane@example.com".to_string()),
                phone: Some("+1-555-0100".to_string()),
                linkedin: Some("https://linkedin.com/in/jane".to_string()),
                github: Some("https://github.com/jane".to_string()),
                ..Default::default()
            }),
            executive_summary: None,
            education: None,
            work_experience: None,
            skills: None,
            ai_assessment: None,
            ats_score: 82.0,
            status: "PENDING".to_string(),
            contact_details_visible: visible,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_non_admin_hidden_job_is_masked() {
        let mut b = body(false);
        apply_privacy_filters(&mut b, UserRole::Hr);
        assert_eq!(b.email, MASKED_EMAIL);
        assert_eq!(b.phone_number.as_deref(), Some(MASKED_PHONE));
        assert!(b.resume_url.is_empty());
        let info = b.basic_info.unwrap();
        assert_eq!(info.email.as_deref(), Some(MASKED_EMAIL));
        assert_eq!(info.phone.as_deref(), Some(MASKED_PHONE));
        assert_eq!(info.linkedin, None);
        assert_eq!(info.github, None);
    }

    #[test]
    fn test_admin_always_sees_contact_details() {
        let mut b = body(false);
        apply_privacy_filters(&mut b, UserRole::Admin);
        assert_eq!(b.email, "jane@example.com");
        assert_eq!(b.resume_url, "uploads/resumes/jane.pdf");
    }

    #[test]
    fn test_visible_job_is_not_masked() {
        let mut b = body(true);
        apply_privacy_filters(&mut b, UserRole::Hr);
        assert_eq!(b.email, "jane@example.com");
        assert_eq!(b.phone_number.as_deref(), Some("+1-555-0100"));
    }

    #[test]
    fn test_missing_contact_fields_stay_missing() {
        let mut b = body(false);
        b.basic_info.as_mut().unwrap().email = None;
        b.basic_info.as_mut().unwrap().phone = None;
        apply_privacy_filters(&mut b, UserRole::Partner);
        let info = b.basic_info.unwrap();
        assert_eq!(info.email, None);
        assert_eq!(info.phone, None);
    }
}
