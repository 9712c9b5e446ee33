//! Server state shared by every handler

use std::sync::Arc;
use std::time::Duration;

use crate::cache::LocalCache;
use crate::catalog::CatalogService;
use crate::core::Config;
use crate::gateway::{Gateway, MemoryGateway, RestGateway};
use crate::settings::SettingsResolver;
use crate::submissions::SubmissionManager;
use crate::uploads::UploadService;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Cloned into every request; services hold `Arc`s internally
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub gateway: Arc<dyn Gateway>,
    pub cache: LocalCache,
    pub settings: SettingsResolver,
    pub submissions: Arc<SubmissionManager>,
    pub catalog: CatalogService,
    pub uploads: UploadService,
}

impl ServerState {
    /// Wire services around an existing gateway and cache
    pub fn new(config: Config, gateway: Arc<dyn Gateway>, cache: LocalCache) -> Self {
        let load_timeout = Duration::from_millis(config.catalog_load_timeout_ms);
        Self {
            settings: SettingsResolver::new(gateway.clone(), cache.clone()),
            submissions: Arc::new(SubmissionManager::new(gateway.clone(), cache.clone())),
            catalog: CatalogService::new(gateway.clone(), load_timeout),
            uploads: UploadService::new(gateway.clone(), config.storage_bucket.clone()),
            config,
            gateway,
            cache,
        }
    }

    /// Open the local cache under the work dir and connect the gateway.
    ///
    /// Without a hosted store URL (development only) the in-process gateway
    /// is used; its data is lost on exit.
    pub fn initialize(config: &Config) -> Result<Self, BoxError> {
        std::fs::create_dir_all(&config.work_dir)?;
        let cache_path = config.cache_path();
        let cache = LocalCache::open(&cache_path)?;
        tracing::info!(path = %cache_path.display(), "Local cache opened");

        let gateway: Arc<dyn Gateway> = match (&config.supabase_url, &config.supabase_anon_key) {
            (Some(url), Some(key)) => {
                tracing::info!(url = %url, "Using hosted store");
                Arc::new(RestGateway::new(
                    url,
                    key,
                    Duration::from_millis(config.gateway_timeout_ms),
                )?)
            }
            _ => {
                tracing::warn!("SUPABASE_URL not set, using the in-process store (data is not persisted)");
                Arc::new(MemoryGateway::with_public_base(format!(
                    "http://localhost:{}",
                    config.http_port
                )))
            }
        };

        Ok(Self::new(config.clone(), gateway, cache))
    }
}
