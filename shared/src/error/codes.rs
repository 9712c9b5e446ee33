//! Unified error codes for the portal
//!
//! Every error the server reports carries one of these codes. Codes are
//! organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 4xxx: Submission errors
//! - 5xxx: Settings errors
//! - 6xxx: Product / upload errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 1xxx: Auth ====================
    /// Admin passcode missing
    NotAuthenticated = 1001,
    /// Admin passcode wrong
    InvalidPasscode = 1002,

    // ==================== 4xxx: Submission ====================
    SubmissionNotFound = 4001,
    /// Final-tier status update failed (no fallback left)
    SubmissionUpdateFailed = 4002,
    InvalidStatus = 4003,
    /// Could not allocate an unused reference id
    ReferenceIdExhausted = 4004,

    // ==================== 5xxx: Settings ====================
    ServiceTypeNotFound = 5001,
    CompanyNotFound = 5002,
    FormFieldNotFound = 5003,

    // ==================== 6xxx: Product ====================
    ProductNotFound = 6001,
    /// The products relation does not exist in the hosted store
    CatalogNotInitialized = 6002,

    // ==================== 65xx: File Upload ====================
    NoFileProvided = 6501,
    EmptyFile = 6502,
    FileTooLarge = 6503,
    FileStorageFailed = 6504,

    // ==================== 9xxx: System ====================
    InternalError = 9001,
    DatabaseError = 9002,
    /// Hosted store unreachable or query error
    GatewayUnavailable = 9003,
    TimeoutError = 9004,
    ConfigError = 9005,

    // ==================== 94xx: Storage ====================
    /// Local fallback cache failure
    LocalStorageError = 9401,
    StorageCorrupted = 9403,
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",

            // Auth
            ErrorCode::NotAuthenticated => "Admin passcode required",
            ErrorCode::InvalidPasscode => "Incorrect passcode",

            // Submission
            ErrorCode::SubmissionNotFound => "Submission not found",
            ErrorCode::SubmissionUpdateFailed => "Failed to update submission",
            ErrorCode::InvalidStatus => "Invalid submission status",
            ErrorCode::ReferenceIdExhausted => "Could not allocate a unique reference id",

            // Settings
            ErrorCode::ServiceTypeNotFound => "Service type not found",
            ErrorCode::CompanyNotFound => "Company not found",
            ErrorCode::FormFieldNotFound => "Form field not found",

            // Product
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::CatalogNotInitialized => {
                "Database table not found. Please run the SQL setup script."
            }

            // File Upload
            ErrorCode::NoFileProvided => "No file provided",
            ErrorCode::EmptyFile => "Empty file provided",
            ErrorCode::FileTooLarge => "File too large",
            ErrorCode::FileStorageFailed => "File storage failed",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::GatewayUnavailable => "Database is unreachable",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",

            // Storage
            ErrorCode::LocalStorageError => "Local storage error",
            ErrorCode::StorageCorrupted => "Storage corrupted (data file damaged)",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidPasscode),

            // Submission
            4001 => Ok(ErrorCode::SubmissionNotFound),
            4002 => Ok(ErrorCode::SubmissionUpdateFailed),
            4003 => Ok(ErrorCode::InvalidStatus),
            4004 => Ok(ErrorCode::ReferenceIdExhausted),

            // Settings
            5001 => Ok(ErrorCode::ServiceTypeNotFound),
            5002 => Ok(ErrorCode::CompanyNotFound),
            5003 => Ok(ErrorCode::FormFieldNotFound),

            // Product
            6001 => Ok(ErrorCode::ProductNotFound),
            6002 => Ok(ErrorCode::CatalogNotInitialized),

            // File Upload
            6501 => Ok(ErrorCode::NoFileProvided),
            6502 => Ok(ErrorCode::EmptyFile),
            6503 => Ok(ErrorCode::FileTooLarge),
            6504 => Ok(ErrorCode::FileStorageFailed),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::GatewayUnavailable),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),

            // Storage
            9401 => Ok(ErrorCode::LocalStorageError),
            9403 => Ok(ErrorCode::StorageCorrupted),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
