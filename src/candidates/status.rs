// src/candidates/status.rs
//! Parsing lifecycle states and HR feedback labels.
//!
//! Status and progress always move together: each status maps to a fixed
//! progress percentage, and FAILED resets progress to zero so a stale bar
//! never shows over an error message.

use serde::{Deserialize, Serialize};

/// Progress checkpoints reported during parsing
pub const PROGRESS_QUEUED: i64 = 0;
pub const PROGRESS_EXTRACTING: i64 = 20;
pub const PROGRESS_ANALYZING: i64 = 50;
pub const PROGRESS_COMPLETED: i64 = 100;

/// Parsing lifecycle of a candidate record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParsingStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    /// Reserved for operator intervention; the pipeline never sets this
    ManualReview,
}

impl ParsingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParsingStatus::Pending => "PENDING",
            ParsingStatus::Processing => "PROCESSING",
            ParsingStatus::Completed => "COMPLETED",
            ParsingStatus::Failed => "FAILED",
            ParsingStatus::ManualReview => "MANUAL_REVIEW",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_uppercase().as_str() {
            "PENDING" => Some(ParsingStatus::Pending),
            "PROCESSING" => Some(ParsingStatus::Processing),
            "COMPLETED" => Some(ParsingStatus::Completed),
            "FAILED" => Some(ParsingStatus::Failed),
            "MANUAL_REVIEW" => Some(ParsingStatus::ManualReview),
            _ => None,
        }
    }

    /// Legal state-machine moves. Any state may return to PENDING via
    /// reparse - that is the recovery path for rows stuck mid-parse on a
    /// hung external call or a crash before the task was spawned - while
    /// the forward path stays strictly ordered.
    pub fn can_transition(&self, next: ParsingStatus) -> bool {
        use ParsingStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Processing, Completed)
                | (Processing, Failed)
                | (Processing, ManualReview)
                | (_, Pending)
        )
    }
}

/// HR review outcome for a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HrFeedback {
    Pending,
    Shortlisted,
    InterviewScheduled,
    Interviewed,
    Engaged,
    Taken,
    Hired,
    Rejected,
}

impl HrFeedback {
    pub fn as_str(&self) -> &'static str {
        match self {
            HrFeedback::Pending => "PENDING",
            HrFeedback::Shortlisted => "SHORTLISTED",
            HrFeedback::InterviewScheduled => "INTERVIEW_SCHEDULED",
            HrFeedback::Interviewed => "INTERVIEWED",
            HrFeedback::Engaged => "ENGAGED",
            HrFeedback::Taken => "TAKEN",
            HrFeedback::Hired => "HIRED",
            HrFeedback::Rejected => "REJECTED",
        }
    }

    /// Parse a feedback label, accepting the loose synonyms older clients
    /// still send and folding them onto the canonical set
    pub fn normalize(value: &str) -> Option<Self> {
        let folded = value
            .trim()
            .to_uppercase()
            .replace(|c| c == ' ' || c == '-', "_");
        match folded.as_str() {
            "PENDING" => Some(HrFeedback::Pending),
            "SHORTLISTED" | "SHORTLIST" => Some(HrFeedback::Shortlisted),
            "INTERVIEW_SCHEDULED" | "SCHEDULE_INTERVIEW" => Some(HrFeedback::InterviewScheduled),
            "INTERVIEWED" => Some(HrFeedback::Interviewed),
            "ENGAGED" | "ENGAGE" => Some(HrFeedback::Engaged),
            "TAKEN" | "TAKE" => Some(HrFeedback::Taken),
            "HIRED" | "HIRE" => Some(HrFeedback::Hired),
            "REJECTED" | "REJECT" => Some(HrFeedback::Rejected),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips() {
        for status in [
            ParsingStatus::Pending,
            ParsingStatus::Processing,
            ParsingStatus::Completed,
            ParsingStatus::Failed,
            ParsingStatus::ManualReview,
        ] {
            assert_eq!(ParsingStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ParsingStatus::parse("bogus"), None);
    }

    #[test]
    fn test_forward_transitions_allowed() {
        assert!(ParsingStatus::Pending.can_transition(ParsingStatus::Processing));
        assert!(ParsingStatus::Processing.can_transition(ParsingStatus::Completed));
        assert!(ParsingStatus::Processing.can_transition(ParsingStatus::Failed));
    }

    #[test]
    fn test_reparse_transitions_allowed() {
        assert!(ParsingStatus::Failed.can_transition(ParsingStatus::Pending));
        assert!(ParsingStatus::Completed.can_transition(ParsingStatus::Pending));
        assert!(ParsingStatus::ManualReview.can_transition(ParsingStatus::Pending));
    }

    #[test]
    fn test_stuck_rows_can_be_requeued() {
        // A row hung mid-parse (or never spawned) must stay recoverable
        assert!(ParsingStatus::Processing.can_transition(ParsingStatus::Pending));
        assert!(ParsingStatus::Pending.can_transition(ParsingStatus::Pending));
    }

    #[test]
    fn test_illegal_transitions_rejected() {
        assert!(!ParsingStatus::Pending.can_transition(ParsingStatus::Completed));
        assert!(!ParsingStatus::Completed.can_transition(ParsingStatus::Processing));
        assert!(!ParsingStatus::Failed.can_transition(ParsingStatus::Completed));
        assert!(!ParsingStatus::Failed.can_transition(ParsingStatus::Processing));
    }

    #[test]
    fn test_feedback_synonyms_fold() {
        assert_eq!(HrFeedback::normalize("shortlist"), Some(HrFeedback::Shortlisted));
        assert_eq!(
            HrFeedback::normalize("Schedule Interview"),
            Some(HrFeedback::InterviewScheduled)
        );
        assert_eq!(HrFeedback::normalize("hire"), Some(HrFeedback::Hired));
        assert_eq!(HrFeedback::normalize("REJECT"), Some(HrFeedback::Rejected));
        assert_eq!(HrFeedback::normalize("maybe later"), None);
    }
}
