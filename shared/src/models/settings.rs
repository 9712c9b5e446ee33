//! Admin Settings Model
//!
//! The singleton settings snapshot that drives the registration form
//! (company list, price lookup, enabled service types) plus the editing
//! rules admin tooling applies to it before saving.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::submission::SubmissionStatus;
use crate::error::{AppError, AppResult, ErrorCode};
use crate::util;

/// Orderable registration service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceTypeConfig {
    pub id: String,
    /// Stable lookup token used inside [`CompanyPricing::prices`]
    pub key: String,
    pub label: String,
    pub enabled: bool,
}

/// Per-company price table, amounts keyed by service key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyPricing {
    pub id: String,
    pub company_name: String,
    #[serde(default)]
    pub prices: BTreeMap<String, i64>,
    pub enabled: bool,
}

impl CompanyPricing {
    /// Missing entries price at 0
    pub fn price(&self, service_key: &str) -> i64 {
        self.prices.get(service_key).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Email,
    Tel,
    Select,
    Date,
    Textarea,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFieldConfig {
    pub id: String,
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Only meaningful for [`FieldType::Select`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub enabled: bool,
    /// Dense 1..N display position
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageTemplate {
    pub id: String,
    pub name: String,
    /// Body with `{{placeholder}}` tokens
    pub template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_status: Option<SubmissionStatus>,
}

/// Resolved settings snapshot (one logical instance)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSettings {
    pub id: String,
    pub upi_id: String,
    pub qr_code_url: String,
    pub whatsapp_number: String,
    pub service_types: Vec<ServiceTypeConfig>,
    pub companies: Vec<CompanyPricing>,
    pub form_fields: Vec<FormFieldConfig>,
    pub message_templates: Vec<MessageTemplate>,
    pub updated_at: DateTime<Utc>,
}

/// Fields an admin may patch.
///
/// Plain fields overwrite when present. `prices` (company id -> service key
/// -> amount) is deep-merged into the company price maps after the
/// overwrite step, so a single price can change without resending the
/// whole company list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    pub upi_id: Option<String>,
    pub qr_code_url: Option<String>,
    pub whatsapp_number: Option<String>,
    pub service_types: Option<Vec<ServiceTypeConfig>>,
    pub companies: Option<Vec<CompanyPricing>>,
    pub form_fields: Option<Vec<FormFieldConfig>>,
    pub message_templates: Option<Vec<MessageTemplate>>,
    pub prices: Option<BTreeMap<String, BTreeMap<String, i64>>>,
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

/// New form field as entered by an admin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFormField {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
}

/// Service key from a label: lowercase, whitespace runs to `_`, anything
/// outside `[a-z0-9_]` dropped.
pub fn service_key_from_label(label: &str) -> String {
    let mut key = String::with_capacity(label.len());
    let mut in_space = false;
    for c in label.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_space {
                key.push('_');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
            key.push(c);
        }
    }
    if key.is_empty() {
        "service".to_string()
    } else {
        key
    }
}

impl AdminSettings {
    // ========== Lookups ==========

    pub fn enabled_companies(&self) -> impl Iterator<Item = &CompanyPricing> {
        self.companies.iter().filter(|c| c.enabled)
    }

    /// Display label for a service key, falling back to the key itself
    pub fn service_label<'a>(&'a self, key: &'a str) -> &'a str {
        self.service_types
            .iter()
            .find(|s| s.key == key)
            .map(|s| s.label.as_str())
            .unwrap_or(key)
    }

    /// Price of `service_key` at an enabled company (matched by id or name).
    /// Unknown company or missing price entry yields 0.
    pub fn price_for(&self, company: &str, service_key: &str) -> i64 {
        self.enabled_companies()
            .find(|c| c.id == company || c.company_name == company)
            .map(|c| c.price(service_key))
            .unwrap_or(0)
    }

    /// Form fields sorted by `order`
    pub fn ordered_form_fields(&self) -> Vec<&FormFieldConfig> {
        let mut fields: Vec<&FormFieldConfig> = self.form_fields.iter().collect();
        fields.sort_by_key(|f| f.order);
        fields
    }

    pub fn templates_for(&self, status: SubmissionStatus) -> impl Iterator<Item = &MessageTemplate> {
        self.message_templates
            .iter()
            .filter(move |t| t.trigger_status == Some(status))
    }

    // ========== Patch ==========

    /// Apply a patch: overwrite present fields, deep-merge `prices`, keep
    /// the id (`"1"` when empty) and refresh `updated_at`.
    pub fn apply_patch(&mut self, patch: SettingsPatch) {
        if let Some(v) = patch.upi_id {
            self.upi_id = v;
        }
        if let Some(v) = patch.qr_code_url {
            self.qr_code_url = v;
        }
        if let Some(v) = patch.whatsapp_number {
            self.whatsapp_number = v;
        }
        if let Some(v) = patch.service_types {
            self.service_types = v;
        }
        if let Some(v) = patch.companies {
            self.companies = v;
        }
        if let Some(v) = patch.form_fields {
            self.form_fields = v;
        }
        if let Some(v) = patch.message_templates {
            self.message_templates = v;
        }
        if let Some(prices) = patch.prices {
            for (company_id, entries) in prices {
                if let Some(company) = self.companies.iter_mut().find(|c| c.id == company_id) {
                    company.prices.extend(entries);
                } else {
                    tracing::debug!(company_id = %company_id, "price patch for unknown company ignored");
                }
            }
        }
        if self.id.is_empty() {
            self.id = "1".to_string();
        }
        self.updated_at = util::now();
    }

    // ========== Service types ==========

    /// Add a service type with a key slugged from `label`.
    ///
    /// A key already in use gets `_2`, `_3`, ... appended. Every company
    /// receives price 0 for the new key.
    pub fn add_service_type(&mut self, label: &str) -> AppResult<&ServiceTypeConfig> {
        let label = label.trim();
        if label.is_empty() {
            return Err(AppError::invalid_field("label", "Service name is required"));
        }

        let base = service_key_from_label(label);
        let mut key = base.clone();
        let mut n = 2;
        while self.service_types.iter().any(|s| s.key == key) {
            key = format!("{base}_{n}");
            n += 1;
        }

        for company in &mut self.companies {
            company.prices.insert(key.clone(), 0);
        }
        self.service_types.push(ServiceTypeConfig {
            id: util::new_id(),
            key,
            label: label.to_string(),
            enabled: true,
        });
        Ok(&self.service_types[self.service_types.len() - 1])
    }

    /// Relabel; the key stays stable
    pub fn rename_service_type(&mut self, id: &str, label: &str) -> AppResult<()> {
        let label = label.trim();
        if label.is_empty() {
            return Err(AppError::invalid_field("label", "Service name is required"));
        }
        self.service_type_mut(id)?.label = label.to_string();
        Ok(())
    }

    pub fn toggle_service_type(&mut self, id: &str) -> AppResult<bool> {
        let service = self.service_type_mut(id)?;
        service.enabled = !service.enabled;
        Ok(service.enabled)
    }

    /// Remove the service type and strip its key from every company
    pub fn remove_service_type(&mut self, id: &str) -> AppResult<ServiceTypeConfig> {
        let idx = self
            .service_types
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| not_found(ErrorCode::ServiceTypeNotFound, id))?;
        let removed = self.service_types.remove(idx);
        for company in &mut self.companies {
            company.prices.remove(&removed.key);
        }
        Ok(removed)
    }

    fn service_type_mut(&mut self, id: &str) -> AppResult<&mut ServiceTypeConfig> {
        self.service_types
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| not_found(ErrorCode::ServiceTypeNotFound, id))
    }

    // ========== Companies ==========

    /// Add a company; existing service keys missing from `prices` get 0
    pub fn add_company(
        &mut self,
        name: &str,
        mut prices: BTreeMap<String, i64>,
    ) -> AppResult<&CompanyPricing> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::invalid_field(
                "companyName",
                "Company name is required",
            ));
        }
        for service in &self.service_types {
            prices.entry(service.key.clone()).or_insert(0);
        }
        self.companies.push(CompanyPricing {
            id: util::new_id(),
            company_name: name.to_string(),
            prices,
            enabled: true,
        });
        Ok(&self.companies[self.companies.len() - 1])
    }

    pub fn update_company_price(
        &mut self,
        company_id: &str,
        service_key: &str,
        amount: i64,
    ) -> AppResult<()> {
        if amount < 0 {
            return Err(AppError::invalid_field("price", "Price cannot be negative"));
        }
        self.company_mut(company_id)?
            .prices
            .insert(service_key.to_string(), amount);
        Ok(())
    }

    pub fn toggle_company(&mut self, id: &str) -> AppResult<bool> {
        let company = self.company_mut(id)?;
        company.enabled = !company.enabled;
        Ok(company.enabled)
    }

    pub fn remove_company(&mut self, id: &str) -> AppResult<CompanyPricing> {
        let idx = self
            .companies
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| not_found(ErrorCode::CompanyNotFound, id))?;
        Ok(self.companies.remove(idx))
    }

    fn company_mut(&mut self, id: &str) -> AppResult<&mut CompanyPricing> {
        self.companies
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| not_found(ErrorCode::CompanyNotFound, id))
    }

    // ========== Form fields ==========

    /// Append a field at `order = N + 1`
    pub fn add_form_field(&mut self, field: NewFormField) -> AppResult<&FormFieldConfig> {
        if field.name.trim().is_empty() {
            return Err(AppError::invalid_field("name", "Field name is required"));
        }
        if field.label.trim().is_empty() {
            return Err(AppError::invalid_field("label", "Field label is required"));
        }
        if self.form_fields.iter().any(|f| f.name == field.name) {
            return Err(AppError::conflict(format!(
                "Form field '{}' already exists",
                field.name
            )));
        }

        self.renumber_form_fields();
        let options = match field.field_type {
            FieldType::Select => Some(field.options.unwrap_or_default()),
            _ => None,
        };
        self.form_fields.push(FormFieldConfig {
            id: util::new_id(),
            name: field.name,
            label: field.label,
            field_type: field.field_type,
            required: field.required,
            placeholder: field.placeholder.filter(|p| !p.is_empty()),
            options,
            enabled: true,
            order: self.form_fields.len() as u32 + 1,
        });
        Ok(&self.form_fields[self.form_fields.len() - 1])
    }

    pub fn remove_form_field(&mut self, id: &str) -> AppResult<FormFieldConfig> {
        self.renumber_form_fields();
        let idx = self
            .form_fields
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| not_found(ErrorCode::FormFieldNotFound, id))?;
        let removed = self.form_fields.remove(idx);
        self.renumber_form_fields();
        Ok(removed)
    }

    /// Swap with the neighbour in display order. Moving past either end
    /// is a no-op.
    pub fn move_form_field(&mut self, id: &str, direction: MoveDirection) -> AppResult<()> {
        self.renumber_form_fields();
        let idx = self
            .form_fields
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| not_found(ErrorCode::FormFieldNotFound, id))?;
        let target = match direction {
            MoveDirection::Up => idx.checked_sub(1),
            MoveDirection::Down => Some(idx + 1).filter(|&i| i < self.form_fields.len()),
        };
        if let Some(target) = target {
            self.form_fields.swap(idx, target);
            self.renumber_form_fields();
        }
        Ok(())
    }

    pub fn toggle_form_field(&mut self, id: &str) -> AppResult<bool> {
        let field = self
            .form_fields
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| not_found(ErrorCode::FormFieldNotFound, id))?;
        field.enabled = !field.enabled;
        Ok(field.enabled)
    }

    /// Sort by current order, then rewrite order as 1..N
    fn renumber_form_fields(&mut self) {
        self.form_fields.sort_by_key(|f| f.order);
        for (i, field) in self.form_fields.iter_mut().enumerate() {
            field.order = i as u32 + 1;
        }
    }
}

fn not_found(code: ErrorCode, id: &str) -> AppError {
    AppError::new(code).with_detail("id", id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> AdminSettings {
        let services = [("1", "exam_slot", "Exam Slot"), ("2", "interview_support", "Interview Support")];
        AdminSettings {
            id: "1".into(),
            upi_id: "demo@upi".into(),
            qr_code_url: "https://example.com/qr.png".into(),
            whatsapp_number: "+910000000000".into(),
            service_types: services
                .iter()
                .map(|(id, key, label)| ServiceTypeConfig {
                    id: id.to_string(),
                    key: key.to_string(),
                    label: label.to_string(),
                    enabled: true,
                })
                .collect(),
            companies: vec![
                CompanyPricing {
                    id: "1".into(),
                    company_name: "Accenture".into(),
                    prices: BTreeMap::from([
                        ("exam_slot".to_string(), 2000),
                        ("interview_support".to_string(), 5000),
                    ]),
                    enabled: true,
                },
                CompanyPricing {
                    id: "2".into(),
                    company_name: "TCS".into(),
                    prices: BTreeMap::from([("exam_slot".to_string(), 1500)]),
                    enabled: false,
                },
            ],
            form_fields: ["fullName", "phone", "email"]
                .iter()
                .enumerate()
                .map(|(i, name)| FormFieldConfig {
                    id: (i + 1).to_string(),
                    name: name.to_string(),
                    label: name.to_string(),
                    field_type: FieldType::Text,
                    required: true,
                    placeholder: None,
                    options: None,
                    enabled: true,
                    order: i as u32 + 1,
                })
                .collect(),
            message_templates: vec![],
            updated_at: DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        }
    }

    fn field_names(s: &AdminSettings) -> Vec<(String, u32)> {
        s.ordered_form_fields()
            .iter()
            .map(|f| (f.name.clone(), f.order))
            .collect()
    }

    #[test]
    fn test_service_key_from_label() {
        assert_eq!(service_key_from_label("Mock Interview"), "mock_interview");
        assert_eq!(service_key_from_label("Resume  Review!"), "resume_review");
        assert_eq!(service_key_from_label("Communication / Mentorship"), "communication__mentorship");
        assert_eq!(service_key_from_label("???"), "service");
    }

    #[test]
    fn test_add_service_type_prices_every_company_at_zero() {
        let mut s = settings();
        let key = s.add_service_type("Mock Interview").unwrap().key.clone();
        assert_eq!(key, "mock_interview");
        assert!(s.companies.iter().all(|c| c.prices.get(&key) == Some(&0)));
    }

    #[test]
    fn test_add_service_type_key_collision_gets_suffix() {
        let mut s = settings();
        let second = s.add_service_type("Exam Slot").unwrap().key.clone();
        assert_eq!(second, "exam_slot_2");
        let third = s.add_service_type("exam slot").unwrap().key.clone();
        assert_eq!(third, "exam_slot_3");
        // Existing prices untouched
        assert_eq!(s.companies[0].price("exam_slot"), 2000);
    }

    #[test]
    fn test_add_service_type_requires_label() {
        let mut s = settings();
        let err = s.add_service_type("   ").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn test_remove_service_type_strips_key_from_companies() {
        let mut s = settings();
        let removed = s.remove_service_type("1").unwrap();
        assert_eq!(removed.key, "exam_slot");
        assert!(s.companies.iter().all(|c| !c.prices.contains_key("exam_slot")));
        assert_eq!(s.service_types.len(), 1);

        let err = s.remove_service_type("1").unwrap_err();
        assert_eq!(err.code, ErrorCode::ServiceTypeNotFound);
    }

    #[test]
    fn test_readd_after_remove_reuses_free_key() {
        let mut s = settings();
        s.remove_service_type("1").unwrap();
        let key = s.add_service_type("Exam Slot").unwrap().key.clone();
        assert_eq!(key, "exam_slot");
        assert_eq!(s.companies[0].price("exam_slot"), 0);
    }

    #[test]
    fn test_price_for() {
        let s = settings();
        assert_eq!(s.price_for("Accenture", "exam_slot"), 2000);
        assert_eq!(s.price_for("1", "interview_support"), 5000);
        // Missing entry
        assert_eq!(s.price_for("Accenture", "unknown"), 0);
        // Disabled company
        assert_eq!(s.price_for("TCS", "exam_slot"), 0);
        // Unknown company
        assert_eq!(s.price_for("Nobody", "exam_slot"), 0);
    }

    #[test]
    fn test_add_company_fills_missing_prices() {
        let mut s = settings();
        let company = s
            .add_company("Infosys", BTreeMap::from([("exam_slot".to_string(), 1800)]))
            .unwrap();
        assert_eq!(company.price("exam_slot"), 1800);
        assert_eq!(company.prices.get("interview_support"), Some(&0));

        assert!(s.add_company(" ", BTreeMap::new()).is_err());
    }

    #[test]
    fn test_company_edits() {
        let mut s = settings();
        s.update_company_price("2", "interview_support", 4000).unwrap();
        assert_eq!(s.companies[1].price("interview_support"), 4000);
        assert!(s.update_company_price("2", "exam_slot", -1).is_err());

        assert!(s.toggle_company("2").unwrap());
        assert_eq!(s.price_for("TCS", "exam_slot"), 1500);

        s.remove_company("1").unwrap();
        assert_eq!(
            s.remove_company("1").unwrap_err().code,
            ErrorCode::CompanyNotFound
        );
    }

    #[test]
    fn test_move_form_field() {
        let mut s = settings();
        s.move_form_field("3", MoveDirection::Up).unwrap();
        assert_eq!(
            field_names(&s),
            vec![("fullName".into(), 1), ("email".into(), 2), ("phone".into(), 3)]
        );

        // Edges are no-ops
        s.move_form_field("1", MoveDirection::Up).unwrap();
        s.move_form_field("2", MoveDirection::Down).unwrap();
        assert_eq!(field_names(&s)[0].0, "fullName");
        assert_eq!(field_names(&s)[2].0, "phone");
    }

    #[test]
    fn test_remove_form_field_renormalises_order() {
        let mut s = settings();
        s.remove_form_field("1").unwrap();
        assert_eq!(
            field_names(&s),
            vec![("phone".into(), 1), ("email".into(), 2)]
        );
        assert_eq!(
            s.remove_form_field("1").unwrap_err().code,
            ErrorCode::FormFieldNotFound
        );
    }

    #[test]
    fn test_add_form_field() {
        let mut s = settings();
        let field = s
            .add_form_field(NewFormField {
                name: "city".into(),
                label: "City".into(),
                field_type: FieldType::Text,
                required: false,
                placeholder: Some(String::new()),
                options: Some(vec!["ignored".into()]),
            })
            .unwrap();
        assert_eq!(field.order, 4);
        assert!(field.options.is_none());
        assert!(field.placeholder.is_none());

        let select = s
            .add_form_field(NewFormField {
                name: "slot".into(),
                label: "Slot".into(),
                field_type: FieldType::Select,
                required: true,
                placeholder: None,
                options: Some(vec!["Morning".into(), "Evening".into()]),
            })
            .unwrap();
        assert_eq!(select.options.as_ref().unwrap().len(), 2);

        let dup = s.add_form_field(NewFormField {
            name: "city".into(),
            label: "City".into(),
            field_type: FieldType::Text,
            required: false,
            placeholder: None,
            options: None,
        });
        assert_eq!(dup.unwrap_err().code, ErrorCode::AlreadyExists);
    }

    #[test]
    fn test_apply_patch_overwrites_and_deep_merges_prices() {
        let mut s = settings();
        let before = s.updated_at;
        s.apply_patch(SettingsPatch {
            upi_id: Some("x".into()),
            prices: Some(BTreeMap::from([(
                "1".to_string(),
                BTreeMap::from([("exam_slot".to_string(), 2500)]),
            )])),
            ..Default::default()
        });
        assert_eq!(s.upi_id, "x");
        assert_eq!(s.whatsapp_number, "+910000000000");
        assert_eq!(s.companies[0].price("exam_slot"), 2500);
        assert_eq!(s.companies[0].price("interview_support"), 5000);
        assert!(s.updated_at > before);
    }

    #[test]
    fn test_apply_patch_assigns_default_id() {
        let mut s = settings();
        s.id = String::new();
        s.apply_patch(SettingsPatch::default());
        assert_eq!(s.id, "1");
    }

    #[test]
    fn test_field_type_serde() {
        let json = serde_json::to_string(&FieldType::Textarea).unwrap();
        assert_eq!(json, "\"textarea\"");
        let field: FormFieldConfig = serde_json::from_str(
            r#"{"id":"6","name":"serviceType","label":"Service Type","type":"select","required":true,"options":["exam_slot"],"enabled":true,"order":6}"#,
        )
        .unwrap();
        assert_eq!(field.field_type, FieldType::Select);
        assert!(field.placeholder.is_none());
    }

    #[test]
    fn test_patch_deserializes_partial() {
        let patch: SettingsPatch = serde_json::from_str(r#"{"upiId":"x"}"#).unwrap();
        assert_eq!(patch.upi_id.as_deref(), Some("x"));
        assert!(patch.companies.is_none());
    }
}
