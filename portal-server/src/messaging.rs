//! Candidate messages
//!
//! Renders the settings' message templates against a submission and builds
//! WhatsApp deep links for them.
//!
//! | Placeholder | Value |
//! |-------------|-------|
//! | `{{fullName}}` | candidate name |
//! | `{{serviceType}}` | service display label |
//! | `{{targetCompanyExam}}` | target company / exam |
//! | `{{referenceId}}` | reference id |
//! | `{{preferredDate}}` | preferred date |

use serde::Serialize;
use shared::models::{AdminSettings, MessageTemplate, SubmissionStatus, UserSubmission};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedMessage {
    pub template_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_status: Option<SubmissionStatus>,
    /// Template is meant for the submission's current status
    pub suggested: bool,
    pub text: String,
    pub whatsapp_link: String,
}

/// Substitute every known placeholder; unknown ones are left as written
pub fn render(template: &str, submission: &UserSubmission, settings: &AdminSettings) -> String {
    let service_label = settings.service_label(&submission.service_type);
    [
        ("{{fullName}}", submission.full_name.as_str()),
        ("{{serviceType}}", service_label),
        ("{{targetCompanyExam}}", submission.target_company_exam.as_str()),
        ("{{referenceId}}", submission.reference_id.as_str()),
        ("{{preferredDate}}", submission.preferred_date.as_str()),
    ]
    .iter()
    .fold(template.to_string(), |text, (token, value)| {
        text.replace(token, value)
    })
}

/// `https://wa.me/{digits}?text={encoded}`
pub fn whatsapp_link(phone: &str, text: &str) -> String {
    format!(
        "https://wa.me/{}?text={}",
        shared::util::digits_only(phone),
        urlencoding::encode(text)
    )
}

fn render_one(
    template: &MessageTemplate,
    submission: &UserSubmission,
    settings: &AdminSettings,
) -> RenderedMessage {
    let text = render(&template.template, submission, settings);
    RenderedMessage {
        template_id: template.id.clone(),
        name: template.name.clone(),
        trigger_status: template.trigger_status,
        suggested: template.trigger_status == Some(submission.status),
        whatsapp_link: whatsapp_link(&submission.phone, &text),
        text,
    }
}

/// Every template rendered, those triggered by the current status first
pub fn messages_for(submission: &UserSubmission, settings: &AdminSettings) -> Vec<RenderedMessage> {
    let mut messages: Vec<RenderedMessage> = settings
        .message_templates
        .iter()
        .map(|t| render_one(t, submission, settings))
        .collect();
    // stable: template order kept within each group
    messages.sort_by_key(|m| !m.suggested);
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::defaults::default_settings;
    use crate::submissions::demo::demo_submissions;

    #[test]
    fn test_render_uses_service_label() {
        let settings = default_settings();
        let sub = demo_submissions().remove(1);
        let text = render(
            "{{fullName}} / {{serviceType}} / {{referenceId}} / {{unknown}}",
            &sub,
            &settings,
        );
        assert_eq!(
            text,
            "Priya Patel / Full Placement Support / PJ-2026-00002 / {{unknown}}"
        );
    }

    #[test]
    fn test_whatsapp_link_encoding() {
        let link = whatsapp_link("+91 98765-43210", "Hi Asha, done! ✅\nRef: PJ-2026-00001");
        assert_eq!(
            link,
            "https://wa.me/919876543210?text=Hi%20Asha%2C%20done%21%20%E2%9C%85%0ARef%3A%20PJ-2026-00001"
        );
    }

    #[test]
    fn test_suggested_first() {
        let settings = default_settings();
        // demo-4 is slot_confirmed
        let sub = demo_submissions().remove(3);
        let messages = messages_for(&sub, &settings);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].name, "Slot Confirmed");
        assert!(messages[0].suggested);
        assert!(messages[0].text.contains("Sneha Reddy"));
        assert!(!messages[1].suggested);
    }
}
