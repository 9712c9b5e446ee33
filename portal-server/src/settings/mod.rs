//! Settings Resolver
//!
//! Produces the single [`AdminSettings`] snapshot. Resolution order:
//!
//! 1. local cache (authoritative once populated)
//! 2. the `admin_settings` row in the hosted store
//! 3. the built-in defaults
//!
//! Writes land in the local cache first and are then pushed to the hosted
//! store on a best-effort basis. A failed push is logged and absorbed; the
//! cached copy stays the effective state.

pub mod defaults;
mod row;

pub use row::SettingsRow;

use std::sync::Arc;

use shared::AppResult;
use shared::models::{AdminSettings, SettingsPatch};

use crate::cache::{CacheKey, LocalCache};
use crate::core::PortalResult;
use crate::gateway::{Gateway, Query, Table, from_row, to_row};

#[derive(Clone)]
pub struct SettingsResolver {
    gateway: Arc<dyn Gateway>,
    cache: LocalCache,
}

impl SettingsResolver {
    pub fn new(gateway: Arc<dyn Gateway>, cache: LocalCache) -> Self {
        Self { gateway, cache }
    }

    /// Current snapshot. Never fails: every error falls through to the
    /// next tier.
    pub async fn resolve(&self) -> AdminSettings {
        match self.cache.get::<AdminSettings>(CacheKey::AdminSettings) {
            Ok(Some(settings)) => return settings,
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Cached settings unreadable, ignoring"),
        }

        let fetched = self
            .gateway
            .fetch_one(Table::AdminSettings, &Query::new())
            .await
            .and_then(from_row::<SettingsRow>);
        match fetched {
            Ok(row) => return row.into(),
            Err(e) if e.is_absent() => {
                tracing::debug!(error = %e, "No stored settings, using defaults");
            }
            Err(e) => tracing::warn!(error = %e, "Failed to load settings, using defaults"),
        }

        defaults::default_settings()
    }

    /// Apply `patch` over the resolved snapshot and persist it
    pub async fn update(&self, patch: SettingsPatch) -> PortalResult<AdminSettings> {
        let mut settings = self.resolve().await;
        settings.apply_patch(patch);
        self.save(settings).await
    }

    /// Run an editing rule against the resolved snapshot and persist the
    /// result. Nothing is written when `f` fails.
    pub async fn edit<R>(
        &self,
        f: impl FnOnce(&mut AdminSettings) -> AppResult<R>,
    ) -> PortalResult<(R, AdminSettings)> {
        let mut settings = self.resolve().await;
        let out = f(&mut settings)?;
        settings.apply_patch(SettingsPatch::default());
        let saved = self.save(settings).await?;
        Ok((out, saved))
    }

    /// Price of a service at an enabled company, 0 when unknown
    pub async fn price_for(&self, company: &str, service_key: &str) -> i64 {
        self.resolve().await.price_for(company, service_key)
    }

    /// Cache first, then the hosted store. Returns the store's copy when
    /// the upsert succeeded, the local copy otherwise.
    async fn save(&self, settings: AdminSettings) -> PortalResult<AdminSettings> {
        self.cache.set(CacheKey::AdminSettings, &settings)?;

        let row = to_row(&SettingsRow::from(&settings))?;
        let stored = self
            .gateway
            .upsert(Table::AdminSettings, row)
            .await
            .and_then(from_row::<SettingsRow>);
        match stored {
            Ok(row) => Ok(row.into()),
            Err(e) => {
                tracing::warn!(error = %e, "Settings saved locally only");
                Ok(settings)
            }
        }
    }
}
