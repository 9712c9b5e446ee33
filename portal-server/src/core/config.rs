use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// Portal server configuration
///
/// # Environment
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | ENVIRONMENT | development | development / staging / production |
/// | HTTP_PORT | 3000 | API listen port |
/// | WORK_DIR | ./data | Holds the local cache file |
/// | CACHE_FILE | local_cache.redb | Cache file name inside WORK_DIR |
/// | SUPABASE_URL | - | Hosted store base URL, required outside development |
/// | SUPABASE_ANON_KEY | - | Hosted store API key, required with SUPABASE_URL |
/// | STORAGE_BUCKET | submissions | Blob bucket |
/// | CATALOG_LOAD_TIMEOUT_MS | 10000 | Deadline for loading the product list |
/// | GATEWAY_TIMEOUT_MS | 30000 | Per-request timeout of the HTTP client |
/// | ADMIN_PASSCODE | admin (development only) | Passcode for admin routes |
/// | LOG_LEVEL | info | Log level when RUST_LOG is unset |
/// | LOG_DIR | - | Daily rolling log files when the directory exists |
/// | LOG_JSON | false | JSON log lines |
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    pub http_port: u16,
    pub work_dir: String,
    pub cache_file: String,
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub storage_bucket: String,
    pub catalog_load_timeout_ms: u64,
    pub gateway_timeout_ms: u64,
    pub admin_passcode: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub log_json: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set when ENVIRONMENT={1}")]
    Missing(&'static str, String),

    #[error("SUPABASE_ANON_KEY must be set together with SUPABASE_URL")]
    MissingApiKey,
}

const DEV_ADMIN_PASSCODE: &str = "admin";

/// Unparseable values fall back to the default
fn parse<T: FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|v| v.trim().parse().ok())
}

impl Config {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through `lookup`; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = var("ENVIRONMENT").unwrap_or_else(|| "development".into());
        let development = environment == "development";

        let supabase_url = var("SUPABASE_URL");
        let supabase_anon_key = var("SUPABASE_ANON_KEY");
        if supabase_url.is_none() && !development {
            return Err(ConfigError::Missing("SUPABASE_URL", environment));
        }
        if supabase_url.is_some() && supabase_anon_key.is_none() {
            return Err(ConfigError::MissingApiKey);
        }

        let admin_passcode = match var("ADMIN_PASSCODE") {
            Some(passcode) => passcode,
            None if development => DEV_ADMIN_PASSCODE.to_string(),
            None => return Err(ConfigError::Missing("ADMIN_PASSCODE", environment)),
        };

        Ok(Self {
            http_port: parse(var("HTTP_PORT")).unwrap_or(3000),
            work_dir: var("WORK_DIR").unwrap_or_else(|| "./data".into()),
            cache_file: var("CACHE_FILE").unwrap_or_else(|| "local_cache.redb".into()),
            supabase_url,
            supabase_anon_key,
            storage_bucket: var("STORAGE_BUCKET").unwrap_or_else(|| "submissions".into()),
            catalog_load_timeout_ms: parse(var("CATALOG_LOAD_TIMEOUT_MS")).unwrap_or(10_000),
            gateway_timeout_ms: parse(var("GATEWAY_TIMEOUT_MS")).unwrap_or(30_000),
            admin_passcode,
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_dir: var("LOG_DIR"),
            log_json: parse(var("LOG_JSON")).unwrap_or(false),
            environment,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Durable local cache location
    pub fn cache_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join(&self.cache_file)
    }
}
