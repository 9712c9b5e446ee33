//! Utilities
//!
//! - [`logger`] - tracing subscriber setup
//! - [`validation`] - text limits for admin input

pub mod logger;
pub mod validation;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
