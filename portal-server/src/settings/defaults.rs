//! Built-in settings snapshot
//!
//! The floor of the resolution chain: returned when neither the local cache
//! nor the hosted store holds settings.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use shared::models::{
    AdminSettings, CompanyPricing, FieldType, FormFieldConfig, MessageTemplate,
    ServiceTypeConfig, SubmissionStatus,
};

pub const DEFAULT_SETTINGS_ID: &str = "1";
pub const DEFAULT_UPI_ID: &str = "primojobs@upi";
pub const DEFAULT_QR_CODE_URL: &str =
    "https://img.sanishtech.com/u/6629801cde5d6b03f4704e221bd65bbc.jpg";
pub const DEFAULT_WHATSAPP_NUMBER: &str = "+919876543210";

/// Service keys in display order
const SERVICE_KEYS: [&str; 4] = [
    "exam_slot",
    "interview_support",
    "full_placement_support",
    "communication_mentorship",
];

pub fn default_service_types() -> Vec<ServiceTypeConfig> {
    let labels = [
        "Exam Slot",
        "Interview Support",
        "Full Placement Support",
        "Communication / Mentorship",
    ];
    SERVICE_KEYS
        .iter()
        .zip(labels)
        .enumerate()
        .map(|(i, (key, label))| ServiceTypeConfig {
            id: (i + 1).to_string(),
            key: key.to_string(),
            label: label.to_string(),
            enabled: true,
        })
        .collect()
}

pub fn default_companies() -> Vec<CompanyPricing> {
    // prices in SERVICE_KEYS order
    let table: [(&str, [i64; 4]); 6] = [
        ("Accenture", [2000, 5000, 8000, 3000]),
        ("TCS", [1500, 4000, 7000, 2500]),
        ("Infosys", [1800, 4500, 7500, 2800]),
        ("Wipro", [1500, 4000, 6500, 2500]),
        ("Cognizant", [1800, 4500, 7500, 2800]),
        ("Capgemini", [2000, 5000, 8000, 3000]),
    ];
    table
        .iter()
        .enumerate()
        .map(|(i, (name, amounts))| CompanyPricing {
            id: (i + 1).to_string(),
            company_name: name.to_string(),
            prices: SERVICE_KEYS
                .iter()
                .zip(amounts)
                .map(|(key, amount)| (key.to_string(), *amount))
                .collect::<BTreeMap<_, _>>(),
            enabled: true,
        })
        .collect()
}

pub fn default_form_fields() -> Vec<FormFieldConfig> {
    let field = |order: u32,
                 name: &str,
                 label: &str,
                 field_type: FieldType,
                 placeholder: Option<&str>| FormFieldConfig {
        id: order.to_string(),
        name: name.to_string(),
        label: label.to_string(),
        field_type,
        required: true,
        placeholder: placeholder.map(str::to_string),
        options: None,
        enabled: true,
        order,
    };

    let mut service = field(6, "serviceType", "Service Type", FieldType::Select, None);
    service.options = Some(SERVICE_KEYS.iter().map(|k| k.to_string()).collect());

    vec![
        field(1, "fullName", "Full Name", FieldType::Text, Some("Enter your full name")),
        field(
            2,
            "phone",
            "Phone Number (WhatsApp)",
            FieldType::Tel,
            Some("+91 XXXXXXXXXX"),
        ),
        field(3, "email", "Email", FieldType::Email, Some("your@email.com")),
        field(
            4,
            "collegeBatch",
            "College / Batch",
            FieldType::Text,
            Some("e.g., ABC College, 2024 Batch"),
        ),
        field(
            5,
            "targetCompanyExam",
            "Target Company / Exam",
            FieldType::Text,
            Some("e.g., Accenture, TCS NQT"),
        ),
        service,
        field(
            7,
            "preferredDate",
            "Preferred Exam Date / Timeline",
            FieldType::Date,
            None,
        ),
    ]
}

pub fn default_message_templates() -> Vec<MessageTemplate> {
    vec![
        MessageTemplate {
            id: "1".to_string(),
            name: "Payment Verified".to_string(),
            template: "Hi {{fullName}}, your payment is verified! ✅\n\nService: {{serviceType}}\nTarget: {{targetCompanyExam}}\nReference ID: {{referenceId}}\n\nOur team will contact you before {{preferredDate}}.".to_string(),
            trigger_status: Some(SubmissionStatus::PaymentVerified),
        },
        MessageTemplate {
            id: "2".to_string(),
            name: "Slot Confirmed".to_string(),
            template: "Hi {{fullName}}, your exam slot has been confirmed! 🎯\n\nCompany: {{targetCompanyExam}}\nDate: {{preferredDate}}\nReference ID: {{referenceId}}\n\nAll the best!".to_string(),
            trigger_status: Some(SubmissionStatus::SlotConfirmed),
        },
        MessageTemplate {
            id: "3".to_string(),
            name: "Support Assigned".to_string(),
            template: "Hi {{fullName}}, a support executive has been assigned to you! 👨‍💼\n\nService: {{serviceType}}\nReference ID: {{referenceId}}\n\nThey will reach out to you shortly.".to_string(),
            trigger_status: Some(SubmissionStatus::AssignedSupport),
        },
    ]
}

/// Full default snapshot stamped with `updated_at`
pub fn default_settings_at(updated_at: DateTime<Utc>) -> AdminSettings {
    AdminSettings {
        id: DEFAULT_SETTINGS_ID.to_string(),
        upi_id: DEFAULT_UPI_ID.to_string(),
        qr_code_url: DEFAULT_QR_CODE_URL.to_string(),
        whatsapp_number: DEFAULT_WHATSAPP_NUMBER.to_string(),
        service_types: default_service_types(),
        companies: default_companies(),
        form_fields: default_form_fields(),
        message_templates: default_message_templates(),
        updated_at,
    }
}

pub fn default_settings() -> AdminSettings {
    default_settings_at(shared::util::now())
}
