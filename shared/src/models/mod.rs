//! Data Models
//!
//! In-memory shapes shared by the server and its API clients. All models
//! serialize with camelCase field names; storage rows (snake_case) live in
//! the server crate.

pub mod product;
pub mod settings;
pub mod submission;

pub use product::*;
pub use settings::*;
pub use submission::*;

use std::collections::HashMap;

use crate::error::AppError;
use validator::ValidationErrors;

/// Collapse `validator` output into a single [`AppError`].
///
/// `field_order` decides which failing field provides the message; every
/// failing field is listed under the `fields` detail.
pub(crate) fn validation_error(errors: &ValidationErrors, field_order: &[&str]) -> AppError {
    let by_field: HashMap<String, String> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let message = errs
                .first()
                .and_then(|e| e.message.as_ref())
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("{field} is invalid"));
            (field.to_string(), message)
        })
        .collect();

    let failing: Vec<&str> = field_order
        .iter()
        .copied()
        .filter(|name| by_field.contains_key(*name))
        .collect();

    let Some(first) = failing.first().copied() else {
        return AppError::validation("Validation failed");
    };

    AppError::validation(by_field[first].clone())
        .with_detail("field", first)
        .with_detail("fields", failing)
}
