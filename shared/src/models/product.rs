//! Product Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppResult;

/// Catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Assigned by the persistence layer on creation
    pub id: String,
    pub name: String,
    pub description: String,
    pub usage_instructions: String,
    pub external_link: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// URL slug derived from the product name
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }

    /// Public detail path: `/{slug}/{id}`
    pub fn path(&self) -> String {
        format!("/{}/{}", self.slug(), self.id)
    }
}

/// Create / update payload (every field except id and timestamps)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 500, message = "Description must be 1-500 characters"))]
    pub description: String,
    #[validate(length(min = 1, message = "Usage instructions are required"))]
    pub usage_instructions: String,
    #[validate(url(message = "Please enter a valid URL"))]
    pub external_link: String,
}

impl ProductInput {
    /// Copy with surrounding whitespace removed from every field
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            usage_instructions: self.usage_instructions.trim().to_string(),
            external_link: self.external_link.trim().to_string(),
        }
    }

    pub fn validate_input(&self) -> AppResult<()> {
        self.validate().map_err(|e| {
            super::validation_error(
                &e,
                &["name", "description", "usage_instructions", "external_link"],
            )
        })
    }
}

/// Lowercase, ASCII letters and digits only ("Nancy prasana" -> "nancyprasana")
pub fn slugify(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}
