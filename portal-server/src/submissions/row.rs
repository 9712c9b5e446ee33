//! `user_submissions` storage row

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use shared::models::{SubmissionStatus, TimelineEntry, UserSubmission};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRow {
    /// Assigned by the store on insert
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub reference_id: String,
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub college_batch: String,
    pub target_company_exam: String,
    pub service_type: String,
    pub preferred_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub payment_screenshot_url: String,
    pub status: SubmissionStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub timeline: Vec<TimelineEntry>,
    #[serde(default)]
    pub admin_notes: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Nullable column read as its empty value
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl SubmissionRow {
    /// Insert payload: the store assigns id and timestamps
    pub fn for_insert(sub: &UserSubmission) -> Self {
        Self {
            id: None,
            reference_id: sub.reference_id.clone(),
            full_name: sub.full_name.clone(),
            phone: sub.phone.clone(),
            email: sub.email.clone(),
            college_batch: sub.college_batch.clone(),
            target_company_exam: sub.target_company_exam.clone(),
            service_type: sub.service_type.clone(),
            preferred_date: sub.preferred_date.clone(),
            payment_screenshot_url: sub.payment_screenshot_url.clone(),
            status: sub.status,
            timeline: sub.timeline.clone(),
            admin_notes: sub.admin_notes.clone(),
            assigned_to: sub.assigned_to.clone(),
            created_at: None,
            updated_at: None,
        }
    }
}

impl From<SubmissionRow> for UserSubmission {
    fn from(row: SubmissionRow) -> Self {
        let created_at = row.created_at.unwrap_or_else(shared::util::now);
        UserSubmission {
            id: row.id.unwrap_or_default(),
            reference_id: row.reference_id,
            full_name: row.full_name,
            phone: row.phone,
            email: row.email,
            college_batch: row.college_batch,
            target_company_exam: row.target_company_exam,
            service_type: row.service_type,
            preferred_date: row.preferred_date,
            payment_screenshot_url: row.payment_screenshot_url,
            status: row.status,
            timeline: row.timeline,
            admin_notes: row.admin_notes,
            assigned_to: row.assigned_to,
            created_at,
            updated_at: row.updated_at.unwrap_or(created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_payload_omits_store_columns() {
        let sub = super::super::demo::demo_submissions().remove(0);
        let row = serde_json::to_value(SubmissionRow::for_insert(&sub)).unwrap();
        assert!(row.get("id").is_none());
        assert!(row.get("created_at").is_none());
        assert_eq!(row["reference_id"], "PJ-2026-00001");
        assert_eq!(row["status"], "pending_verification");
        assert_eq!(row["timeline"][0]["action"], "Form Submitted");
    }

    #[test]
    fn test_row_maps_to_model() {
        let row: SubmissionRow = serde_json::from_value(json!({
            "id": "0b6f",
            "reference_id": "PJ-2026-12345",
            "full_name": "Asha Rao",
            "phone": "+919812345678",
            "email": "asha@example.com",
            "college_batch": "RVCE, 2025 Batch",
            "target_company_exam": "TCS",
            "service_type": "exam_slot",
            "preferred_date": "2026-02-01",
            "payment_screenshot_url": "https://x/y.png",
            "status": "refund",
            "timeline": null,
            "admin_notes": null,
            "created_at": "2026-01-07T10:30:00.000000+00:00",
            "updated_at": "2026-01-08T10:30:00+00:00"
        }))
        .unwrap();
        let sub = UserSubmission::from(row);
        assert_eq!(sub.id, "0b6f");
        assert_eq!(sub.status, SubmissionStatus::Refund);
        assert!(sub.updated_at > sub.created_at);
        assert!(sub.timeline.is_empty());
    }
}
