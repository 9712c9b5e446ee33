//! Demo repository
//!
//! Five illustrative submissions shown when neither the local cache nor the
//! hosted store has any. Owned by one [`SubmissionManager`] instance; status
//! updates patch this copy for the lifetime of the process only.
//!
//! [`SubmissionManager`]: super::SubmissionManager

use chrono::{DateTime, NaiveDate, Utc};
use shared::models::{SubmissionStatus, TimelineEntry, UserSubmission};
use tokio::sync::RwLock;

const DEMO_SCREENSHOT_URL: &str =
    "https://placehold.co/400x600/0a1628/00d9b8?text=Payment+Screenshot";

pub struct DemoRepository {
    records: RwLock<Vec<UserSubmission>>,
}

impl Default for DemoRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoRepository {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(demo_submissions()),
        }
    }

    pub async fn all(&self) -> Vec<UserSubmission> {
        self.records.read().await.clone()
    }

    /// Lookup by id or reference id
    pub async fn find(&self, key: &str) -> Option<UserSubmission> {
        self.records
            .read()
            .await
            .iter()
            .find(|s| s.matches_key(key))
            .cloned()
    }

    /// Overwrite the record with the same id
    pub async fn replace(&self, record: &UserSubmission) {
        let mut records = self.records.write().await;
        if let Some(slot) = records.iter_mut().find(|s| s.id == record.id) {
            *slot = record.clone();
        }
    }
}

/// UTC instant from calendar parts
fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, min, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or_default()
}

struct Step {
    action: &'static str,
    at: DateTime<Utc>,
    notes: Option<&'static str>,
    admin: bool,
}

fn created(action: &'static str, at: DateTime<Utc>) -> Step {
    Step {
        action,
        at,
        notes: None,
        admin: false,
    }
}

fn changed(action: &'static str, at: DateTime<Utc>, notes: Option<&'static str>) -> Step {
    Step {
        action,
        at,
        notes,
        admin: true,
    }
}

struct Demo {
    n: u32,
    full_name: &'static str,
    phone: &'static str,
    email: &'static str,
    college_batch: &'static str,
    target: &'static str,
    service: &'static str,
    date: &'static str,
    status: SubmissionStatus,
    admin_notes: Option<&'static str>,
    steps: Vec<Step>,
}

impl Demo {
    fn build(self) -> UserSubmission {
        let timeline: Vec<TimelineEntry> = self
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| TimelineEntry {
                id: (i + 1).to_string(),
                action: step.action.to_string(),
                timestamp: step.at,
                notes: step.notes.map(str::to_string),
                performed_by: step.admin.then(|| "Admin".to_string()),
            })
            .collect();
        let created_at = timeline.first().map(|e| e.timestamp).unwrap_or_default();
        let updated_at = timeline.last().map(|e| e.timestamp).unwrap_or_default();
        UserSubmission {
            id: format!("demo-{}", self.n),
            reference_id: format!("PJ-2026-{:05}", self.n),
            full_name: self.full_name.to_string(),
            phone: self.phone.to_string(),
            email: self.email.to_string(),
            college_batch: self.college_batch.to_string(),
            target_company_exam: self.target.to_string(),
            service_type: self.service.to_string(),
            preferred_date: self.date.to_string(),
            payment_screenshot_url: DEMO_SCREENSHOT_URL.to_string(),
            status: self.status,
            timeline,
            admin_notes: self.admin_notes.map(str::to_string),
            assigned_to: None,
            created_at,
            updated_at,
        }
    }
}

pub fn demo_submissions() -> Vec<UserSubmission> {
    const FORM: &str = "Form Submitted";
    const SCREENSHOT: &str = "Payment Screenshot Uploaded";
    const VERIFIED: &str = "Status changed to Payment Verified";

    vec![
        Demo {
            n: 1,
            full_name: "Rahul Sharma",
            phone: "+919876543210",
            email: "rahul.sharma@email.com",
            college_batch: "VIT Vellore, 2025 Batch",
            target: "Accenture",
            service: "exam_slot",
            date: "2026-01-15",
            status: SubmissionStatus::PendingVerification,
            admin_notes: None,
            steps: vec![
                created(FORM, at(2026, 1, 7, 10, 30)),
                created(SCREENSHOT, at(2026, 1, 7, 10, 32)),
            ],
        },
        Demo {
            n: 2,
            full_name: "Priya Patel",
            phone: "+919988776655",
            email: "priya.patel@email.com",
            college_batch: "SRM Chennai, 2025 Batch",
            target: "TCS NQT",
            service: "full_placement_support",
            date: "2026-01-20",
            status: SubmissionStatus::PaymentVerified,
            admin_notes: None,
            steps: vec![
                created(FORM, at(2026, 1, 5, 14, 0)),
                created(SCREENSHOT, at(2026, 1, 5, 14, 5)),
                changed(VERIFIED, at(2026, 1, 5, 16, 0), None),
            ],
        },
        Demo {
            n: 3,
            full_name: "Amit Kumar",
            phone: "+919123456789",
            email: "amit.kumar@email.com",
            college_batch: "BITS Pilani, 2024 Batch",
            target: "Infosys",
            service: "interview_support",
            date: "2026-01-12",
            status: SubmissionStatus::AssignedSupport,
            admin_notes: Some("Assigned to Mentor Ravi"),
            steps: vec![
                created(FORM, at(2026, 1, 3, 9, 0)),
                created(SCREENSHOT, at(2026, 1, 3, 9, 10)),
                changed(VERIFIED, at(2026, 1, 3, 11, 0), None),
                changed(
                    "Status changed to Assigned Support",
                    at(2026, 1, 4, 10, 0),
                    Some("Assigned to Mentor Ravi"),
                ),
            ],
        },
        Demo {
            n: 4,
            full_name: "Sneha Reddy",
            phone: "+918877665544",
            email: "sneha.reddy@email.com",
            college_batch: "JNTU Hyderabad, 2025 Batch",
            target: "Wipro",
            service: "communication_mentorship",
            date: "2026-01-25",
            status: SubmissionStatus::SlotConfirmed,
            admin_notes: Some("Slot confirmed for Jan 25"),
            steps: vec![
                created(FORM, at(2026, 1, 2, 11, 0)),
                created(SCREENSHOT, at(2026, 1, 2, 11, 15)),
                changed(VERIFIED, at(2026, 1, 2, 14, 0), None),
                changed(
                    "Status changed to Slot Confirmed",
                    at(2026, 1, 3, 9, 0),
                    Some("Slot confirmed for Jan 25"),
                ),
            ],
        },
        Demo {
            n: 5,
            full_name: "Vikram Singh",
            phone: "+917766554433",
            email: "vikram.singh@email.com",
            college_batch: "NIT Trichy, 2024 Batch",
            target: "Cognizant",
            service: "exam_slot",
            date: "2026-01-10",
            status: SubmissionStatus::Completed,
            admin_notes: Some("Exam completed successfully"),
            steps: vec![
                created(FORM, at(2025, 12, 28, 10, 0)),
                created(SCREENSHOT, at(2025, 12, 28, 10, 10)),
                changed(VERIFIED, at(2025, 12, 28, 12, 0), None),
                changed(
                    "Status changed to Slot Confirmed",
                    at(2025, 12, 29, 9, 0),
                    None,
                ),
                changed(
                    "Status changed to Completed",
                    at(2026, 1, 6, 18, 0),
                    Some("Exam completed successfully"),
                ),
            ],
        },
    ]
    .into_iter()
    .map(Demo::build)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_demo_dataset_shape() {
        let demo = demo_submissions();
        assert_eq!(demo.len(), 5);
        let refs: HashSet<&str> = demo.iter().map(|s| s.reference_id.as_str()).collect();
        assert_eq!(refs.len(), 5);
        for (i, sub) in demo.iter().enumerate() {
            assert_eq!(sub.reference_id, format!("PJ-2026-0000{}", i + 1));
            assert_eq!(sub.created_at, sub.timeline[0].timestamp);
            assert!(sub.updated_at >= sub.created_at);
        }
    }

    #[test]
    fn test_timeline_is_chronological() {
        for sub in demo_submissions() {
            assert!(sub
                .timeline
                .windows(2)
                .all(|w| w[0].timestamp <= w[1].timestamp));
        }
    }

    #[tokio::test]
    async fn test_replace_is_instance_scoped() {
        let a = DemoRepository::new();
        let b = DemoRepository::new();
        let mut record = a.find("PJ-2026-00001").await.unwrap();
        record.status = SubmissionStatus::Dropped;
        a.replace(&record).await;

        assert_eq!(a.find("demo-1").await.unwrap().status, SubmissionStatus::Dropped);
        assert_eq!(
            b.find("demo-1").await.unwrap().status,
            SubmissionStatus::PendingVerification
        );
    }
}
