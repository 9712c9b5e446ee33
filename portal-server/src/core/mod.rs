//! Core: configuration, shared state, service error and the HTTP server
//!
//! - [`Config`] - environment configuration
//! - [`ServerState`] - services shared by handlers
//! - [`Server`] - HTTP server
//! - [`PortalError`] - service-layer error

pub mod config;
pub mod error;
pub mod server;
pub mod state;

pub use config::{Config, ConfigError};
pub use error::{PortalError, PortalResult};
pub use server::Server;
pub use state::ServerState;
