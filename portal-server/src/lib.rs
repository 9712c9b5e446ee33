//! Placement Portal Server
//!
//! Backend for a placement-assistance portal: candidates register for a
//! service and upload a payment screenshot, admins move submissions through
//! their lifecycle, tune pricing and form settings, and curate a catalog of
//! free tools.
//!
//! # Layout
//!
//! ```text
//! portal-server/src/
//! ├── core/          # config, state, server, service error
//! ├── gateway/       # hosted store access (REST + in-process)
//! ├── cache.rs       # durable local fallback cache (redb)
//! ├── settings/      # settings resolver (cache -> store -> defaults)
//! ├── submissions/   # submission lifecycle, demo tier, reference ids
//! ├── catalog.rs     # product catalog
//! ├── uploads.rs     # blob uploads
//! ├── messaging.rs   # message templates, WhatsApp links
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # logging, validation helpers
//! ```

pub mod api;
pub mod cache;
pub mod catalog;
pub mod core;
pub mod gateway;
pub mod messaging;
pub mod settings;
pub mod submissions;
pub mod uploads;
pub mod utils;

pub use crate::core::{Config, PortalError, PortalResult, Server, ServerState};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

pub use utils::logger::{init_logger, init_logger_with_file};
