//! `admin_settings` storage row

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::models::{
    AdminSettings, CompanyPricing, FormFieldConfig, MessageTemplate, ServiceTypeConfig,
};

use super::defaults;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsRow {
    /// Text or integer depending on how the table was created
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub upi_id: Option<String>,
    #[serde(default)]
    pub qr_code_url: Option<String>,
    #[serde(default)]
    pub whatsapp_number: Option<String>,
    #[serde(default)]
    pub service_types: Option<Vec<ServiceTypeConfig>>,
    #[serde(default)]
    pub companies: Option<Vec<CompanyPricing>>,
    #[serde(default)]
    pub form_fields: Option<Vec<FormFieldConfig>>,
    #[serde(default)]
    pub message_templates: Option<Vec<MessageTemplate>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<SettingsRow> for AdminSettings {
    /// Null columns take the built-in value
    fn from(row: SettingsRow) -> Self {
        let id = match row.id {
            Value::String(s) if !s.is_empty() => s,
            Value::Number(n) => n.to_string(),
            _ => defaults::DEFAULT_SETTINGS_ID.to_string(),
        };
        AdminSettings {
            id,
            upi_id: row
                .upi_id
                .unwrap_or_else(|| defaults::DEFAULT_UPI_ID.to_string()),
            qr_code_url: row
                .qr_code_url
                .unwrap_or_else(|| defaults::DEFAULT_QR_CODE_URL.to_string()),
            whatsapp_number: row
                .whatsapp_number
                .unwrap_or_else(|| defaults::DEFAULT_WHATSAPP_NUMBER.to_string()),
            service_types: row
                .service_types
                .unwrap_or_else(defaults::default_service_types),
            companies: row.companies.unwrap_or_else(defaults::default_companies),
            form_fields: row.form_fields.unwrap_or_else(defaults::default_form_fields),
            message_templates: row
                .message_templates
                .unwrap_or_else(defaults::default_message_templates),
            updated_at: row.updated_at.unwrap_or_else(shared::util::now),
        }
    }
}

impl From<&AdminSettings> for SettingsRow {
    fn from(settings: &AdminSettings) -> Self {
        SettingsRow {
            id: Value::String(settings.id.clone()),
            upi_id: Some(settings.upi_id.clone()),
            qr_code_url: Some(settings.qr_code_url.clone()),
            whatsapp_number: Some(settings.whatsapp_number.clone()),
            service_types: Some(settings.service_types.clone()),
            companies: Some(settings.companies.clone()),
            form_fields: Some(settings.form_fields.clone()),
            message_templates: Some(settings.message_templates.clone()),
            updated_at: Some(settings.updated_at),
        }
    }
}
