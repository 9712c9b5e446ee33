//! User Submission Model
//!
//! Registration submissions, their status lifecycle and the append-only
//! timeline audit trail.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult, ErrorCode};
use crate::util;

/// Submission status (closed set, any-to-any transitions allowed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    PendingVerification,
    PaymentVerified,
    AssignedSupport,
    SlotConfirmed,
    InterviewScheduled,
    Completed,
    Dropped,
    Refund,
}

impl SubmissionStatus {
    pub const ALL: [SubmissionStatus; 8] = [
        Self::PendingVerification,
        Self::PaymentVerified,
        Self::AssignedSupport,
        Self::SlotConfirmed,
        Self::InterviewScheduled,
        Self::Completed,
        Self::Dropped,
        Self::Refund,
    ];

    /// Storage / wire token
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingVerification => "pending_verification",
            Self::PaymentVerified => "payment_verified",
            Self::AssignedSupport => "assigned_support",
            Self::SlotConfirmed => "slot_confirmed",
            Self::InterviewScheduled => "interview_scheduled",
            Self::Completed => "completed",
            Self::Dropped => "dropped",
            Self::Refund => "refund",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::PendingVerification => "Pending Verification",
            Self::PaymentVerified => "Payment Verified",
            Self::AssignedSupport => "Assigned Support",
            Self::SlotConfirmed => "Slot Confirmed",
            Self::InterviewScheduled => "Interview Scheduled",
            Self::Completed => "Completed",
            Self::Dropped => "Dropped",
            Self::Refund => "Refund",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                AppError::with_message(ErrorCode::InvalidStatus, format!("Unknown status: {s}"))
                    .with_detail("status", s)
            })
    }
}

/// Audit trail entry, immutable once appended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub id: String,
    pub action: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performed_by: Option<String>,
}

impl TimelineEntry {
    pub fn new(action: impl Into<String>, notes: Option<String>, performed_by: Option<String>) -> Self {
        Self {
            id: util::new_id(),
            action: action.into(),
            timestamp: util::now(),
            notes,
            performed_by,
        }
    }

    /// Entry recorded for a status change
    pub fn status_change(
        status: SubmissionStatus,
        notes: Option<String>,
        performed_by: Option<String>,
    ) -> Self {
        Self::new(
            format!("Status changed to {}", status.label()),
            notes,
            performed_by,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSubmission {
    pub id: String,
    /// Human-facing id, `PJ-YYYY-NNNNN`
    pub reference_id: String,
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub college_batch: String,
    pub target_company_exam: String,
    /// Service key
    pub service_type: String,
    /// `YYYY-MM-DD`, compared lexicographically
    pub preferred_date: String,
    pub payment_screenshot_url: String,
    pub status: SubmissionStatus,
    #[serde(default)]
    pub timeline: Vec<TimelineEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserSubmission {
    /// Fresh submission: pending verification with the two creation entries
    pub fn new_pending(
        form: RegistrationForm,
        reference_id: String,
        payment_screenshot_url: String,
    ) -> Self {
        let now = util::now();
        let entry = |action: &str| TimelineEntry {
            id: util::new_id(),
            action: action.to_string(),
            timestamp: now,
            notes: None,
            performed_by: None,
        };
        Self {
            id: util::new_id(),
            reference_id,
            full_name: form.full_name,
            phone: form.phone,
            email: form.email,
            college_batch: form.college_batch,
            target_company_exam: form.target_company_exam,
            service_type: form.service_type,
            preferred_date: form.preferred_date,
            payment_screenshot_url,
            status: SubmissionStatus::PendingVerification,
            timeline: vec![entry("Form Submitted"), entry("Payment Screenshot Uploaded")],
            admin_notes: None,
            assigned_to: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Lookup accepts either the row id or the reference id
    pub fn matches_key(&self, key: &str) -> bool {
        self.id == key || self.reference_id == key
    }

    /// Set status, append `entry`, replace notes when given, bump `updated_at`
    pub fn apply_status(&mut self, status: SubmissionStatus, entry: TimelineEntry) {
        if let Some(notes) = entry.notes.as_ref().filter(|n| !n.is_empty()) {
            self.admin_notes = Some(notes.clone());
        }
        self.status = status;
        self.push_timeline(entry);
    }

    /// Append without touching status or notes
    pub fn push_timeline(&mut self, entry: TimelineEntry) {
        self.timeline.push(entry);
        self.updated_at = util::now();
    }
}

/// Registration form payload, validated before anything is persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub full_name: String,
    #[validate(length(min = 10, message = "Please enter a valid phone number"))]
    pub phone: String,
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
    #[validate(length(min = 2, message = "Please enter your college/batch"))]
    pub college_batch: String,
    #[validate(length(min = 1, message = "Please enter target company/exam"))]
    pub target_company_exam: String,
    #[validate(length(min = 1, message = "Please select a service type"))]
    pub service_type: String,
    #[validate(length(min = 1, message = "Please select preferred date"))]
    pub preferred_date: String,
}

impl RegistrationForm {
    pub fn validate_input(&self) -> AppResult<()> {
        self.validate().map_err(|e| {
            super::validation_error(
                &e,
                &[
                    "full_name",
                    "phone",
                    "email",
                    "college_batch",
                    "target_company_exam",
                    "service_type",
                    "preferred_date",
                ],
            )
        })
    }
}

/// List filters. Every present field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmissionFilter {
    pub status: Option<SubmissionStatus>,
    pub service_type: Option<String>,
    /// Case-insensitive substring over name, reference id and target
    pub search: Option<String>,
    /// Inclusive lower bound on `preferred_date`
    pub date_from: Option<String>,
    /// Inclusive upper bound on `preferred_date`
    pub date_to: Option<String>,
}

impl SubmissionFilter {
    /// Search needle, ignoring blank input
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.is_empty())
    }

    pub fn matches(&self, sub: &UserSubmission) -> bool {
        if self.status.is_some_and(|s| s != sub.status) {
            return false;
        }
        if let Some(service) = self.service_type.as_deref().filter(|s| !s.is_empty())
            && sub.service_type != service
        {
            return false;
        }
        if let Some(q) = self.search_term() {
            let q = q.to_lowercase();
            let hit = [&sub.full_name, &sub.reference_id, &sub.target_company_exam]
                .iter()
                .any(|v| v.to_lowercase().contains(&q));
            if !hit {
                return false;
            }
        }
        if let Some(from) = self.date_from.as_deref().filter(|s| !s.is_empty())
            && sub.preferred_date.as_str() < from
        {
            return false;
        }
        if let Some(to) = self.date_to.as_deref().filter(|s| !s.is_empty())
            && sub.preferred_date.as_str() > to
        {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> RegistrationForm {
        RegistrationForm {
            full_name: "Asha Rao".into(),
            phone: "+919812345678".into(),
            email: "asha@example.com".into(),
            college_batch: "RVCE, 2025 Batch".into(),
            target_company_exam: "TCS".into(),
            service_type: "exam_slot".into(),
            preferred_date: "2026-02-01".into(),
        }
    }

    #[test]
    fn test_status_labels_and_tokens() {
        assert_eq!(SubmissionStatus::Completed.label(), "Completed");
        assert_eq!(
            SubmissionStatus::PendingVerification.label(),
            "Pending Verification"
        );
        for status in SubmissionStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            assert_eq!(status.as_str().parse::<SubmissionStatus>().unwrap(), status);
        }
        let err = "archived".parse::<SubmissionStatus>().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStatus);
    }

    #[test]
    fn test_new_pending() {
        let sub = UserSubmission::new_pending(form(), "PJ-2026-00042".into(), "https://x/y.png".into());
        assert_eq!(sub.status, SubmissionStatus::PendingVerification);
        assert_eq!(sub.timeline.len(), 2);
        assert_eq!(sub.timeline[0].action, "Form Submitted");
        assert_eq!(sub.timeline[1].action, "Payment Screenshot Uploaded");
        assert_eq!(sub.timeline[0].timestamp, sub.created_at);
        assert_eq!(sub.created_at, sub.updated_at);
        assert_ne!(sub.timeline[0].id, sub.timeline[1].id);
        assert!(sub.matches_key("PJ-2026-00042"));
        assert!(sub.matches_key(&sub.id.clone()));
    }

    #[test]
    fn test_apply_status_appends_and_keeps_prefix() {
        let mut sub = UserSubmission::new_pending(form(), "PJ-2026-00042".into(), String::new());
        let prefix = sub.timeline.clone();
        sub.admin_notes = Some("earlier".into());

        let entry = TimelineEntry::status_change(SubmissionStatus::Completed, None, Some("Admin".into()));
        sub.apply_status(SubmissionStatus::Completed, entry);

        assert_eq!(sub.status, SubmissionStatus::Completed);
        assert_eq!(sub.timeline.len(), 3);
        assert_eq!(&sub.timeline[..2], &prefix[..]);
        assert!(sub.timeline[2].action.contains("Completed"));
        // No notes keeps the existing ones
        assert_eq!(sub.admin_notes.as_deref(), Some("earlier"));

        let entry = TimelineEntry::status_change(
            SubmissionStatus::Refund,
            Some("Refund issued".into()),
            None,
        );
        sub.apply_status(SubmissionStatus::Refund, entry);
        assert_eq!(sub.admin_notes.as_deref(), Some("Refund issued"));
    }

    #[test]
    fn test_registration_validation() {
        assert!(form().validate_input().is_ok());

        let mut bad = form();
        bad.email = "not-an-email".into();
        bad.phone = "123".into();
        let err = bad.validate_input().unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        // First failing field in form order wins
        assert_eq!(err.message, "Please enter a valid phone number");
        let details = err.details.unwrap();
        assert_eq!(details["fields"], serde_json::json!(["phone", "email"]));
    }

    #[test]
    fn test_registration_requires_date() {
        let mut bad = form();
        bad.preferred_date = String::new();
        let err = bad.validate_input().unwrap_err();
        assert_eq!(err.message, "Please select preferred date");
    }

    #[test]
    fn test_filter_matches() {
        let sub = UserSubmission::new_pending(form(), "PJ-2026-00042".into(), String::new());

        assert!(SubmissionFilter::default().matches(&sub));

        let by_search = SubmissionFilter {
            search: Some("asha".into()),
            ..Default::default()
        };
        assert!(by_search.matches(&sub));

        let by_ref = SubmissionFilter {
            search: Some("pj-2026-0004".into()),
            ..Default::default()
        };
        assert!(by_ref.matches(&sub));

        let wrong_status = SubmissionFilter {
            status: Some(SubmissionStatus::Completed),
            ..Default::default()
        };
        assert!(!wrong_status.matches(&sub));

        let in_range = SubmissionFilter {
            date_from: Some("2026-02-01".into()),
            date_to: Some("2026-02-01".into()),
            ..Default::default()
        };
        assert!(in_range.matches(&sub));

        let too_late = SubmissionFilter {
            date_from: Some("2026-02-02".into()),
            ..Default::default()
        };
        assert!(!too_late.matches(&sub));

        let other_service = SubmissionFilter {
            service_type: Some("interview_support".into()),
            ..Default::default()
        };
        assert!(!other_service.matches(&sub));
    }

    #[test]
    fn test_timeline_entry_serde_skips_empty_optionals() {
        let entry = TimelineEntry {
            id: "1".into(),
            action: "Form Submitted".into(),
            timestamp: DateTime::parse_from_rfc3339("2026-01-07T10:30:00Z")
                .unwrap()
                .with_timezone(&Utc),
            notes: None,
            performed_by: None,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(
            json,
            r#"{"id":"1","action":"Form Submitted","timestamp":"2026-01-07T10:30:00Z"}"#
        );
    }
}
