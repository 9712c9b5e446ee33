//! Submission Lifecycle Manager
//!
//! Owns registration submissions across three tiers:
//!
//! | Tier | Holds | Written by |
//! |------|-------|------------|
//! | local cache | submissions the store never accepted, demo clones | `create` fallback, demo-tier updates |
//! | demo repository | five illustrative submissions | demo-tier updates (process lifetime) |
//! | hosted store | everything else | `create`, gateway-tier updates |
//!
//! Reads absorb gateway failures and fall back to the next tier. Mutations
//! locate the record (local cache, then demo, then store) and apply the
//! change in the tier that holds it. Only the store tier can fail hard.
//!
//! Status transitions are unconstrained: any status may follow any other.

pub mod demo;
pub mod reference;
mod row;

pub use demo::DemoRepository;
pub use row::SubmissionRow;

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::json;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    RegistrationForm, SubmissionFilter, SubmissionStatus, TimelineEntry, UserSubmission,
};

use crate::cache::{CacheKey, LocalCache};
use crate::core::{PortalError, PortalResult};
use crate::gateway::{Gateway, GatewayError, Query, Table, from_row, from_rows, to_row};
use crate::utils::validation::{MAX_ACTION_LEN, MAX_NOTE_LEN, validate_optional_text, validate_required_text};

/// Generated ids tried before giving up
pub const MAX_REFERENCE_ATTEMPTS: usize = 8;

/// Columns searched by the free-text filter
const SEARCH_COLUMNS: [&str; 3] = ["full_name", "reference_id", "target_company_exam"];

type ReferenceGenerator = Arc<dyn Fn() -> String + Send + Sync>;

/// Where a located record lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    LocalCache,
    Demo,
    Gateway,
}

#[derive(Debug, Clone)]
pub struct Located {
    pub tier: Tier,
    pub record: UserSubmission,
}

/// Mutation applied to a located record
enum Change {
    Status(SubmissionStatus, TimelineEntry),
    Note(TimelineEntry),
}

impl Change {
    fn apply(&self, record: &mut UserSubmission) {
        match self {
            Change::Status(status, entry) => record.apply_status(*status, entry.clone()),
            Change::Note(entry) => record.push_timeline(entry.clone()),
        }
    }
}

pub struct SubmissionManager {
    gateway: Arc<dyn Gateway>,
    cache: LocalCache,
    demo: DemoRepository,
    next_reference: ReferenceGenerator,
}

impl SubmissionManager {
    pub fn new(gateway: Arc<dyn Gateway>, cache: LocalCache) -> Self {
        Self {
            gateway,
            cache,
            demo: DemoRepository::new(),
            next_reference: Arc::new(reference::generate),
        }
    }

    /// Replace the reference id source
    pub fn with_reference_generator(
        mut self,
        generator: impl Fn() -> String + Send + Sync + 'static,
    ) -> Self {
        self.next_reference = Arc::new(generator);
        self
    }

    // ========== Create ==========

    /// Register a new submission.
    ///
    /// A rejected or unreachable store is not an error: the submission is
    /// kept in the local cache (most recent first) and returned as built.
    pub async fn create(
        &self,
        form: RegistrationForm,
        payment_screenshot_url: &str,
    ) -> PortalResult<UserSubmission> {
        form.validate_input()?;

        let reference_id = self.allocate_reference_id().await?;
        let submission =
            UserSubmission::new_pending(form, reference_id, payment_screenshot_url.to_string());

        let row = to_row(&SubmissionRow::for_insert(&submission))?;
        let inserted = self
            .gateway
            .insert(Table::UserSubmissions, row)
            .await
            .and_then(from_row::<SubmissionRow>);

        match inserted {
            Ok(row) => {
                tracing::info!(reference_id = %submission.reference_id, "Submission stored");
                Ok(row.into())
            }
            Err(e) => {
                tracing::warn!(
                    reference_id = %submission.reference_id,
                    error = %e,
                    "Gateway insert failed, keeping submission locally"
                );
                self.cache
                    .update::<Vec<UserSubmission>, _, PortalError>(CacheKey::Submissions, |list| {
                        list.insert(0, submission.clone());
                        Ok(())
                    })?;
                Ok(submission)
            }
        }
    }

    async fn allocate_reference_id(&self) -> PortalResult<String> {
        let local = self.local_list();
        for attempt in 1..=MAX_REFERENCE_ATTEMPTS {
            let candidate = (self.next_reference)();
            if self.reference_in_use(&candidate, &local).await {
                tracing::debug!(reference_id = %candidate, attempt, "Reference id collision");
                continue;
            }
            return Ok(candidate);
        }
        Err(AppError::new(ErrorCode::ReferenceIdExhausted)
            .with_detail("attempts", MAX_REFERENCE_ATTEMPTS)
            .into())
    }

    /// Local and demo tiers always; the store when reachable
    async fn reference_in_use(&self, candidate: &str, local: &[UserSubmission]) -> bool {
        if local.iter().any(|s| s.reference_id == candidate)
            || self.demo.find(candidate).await.is_some()
        {
            return true;
        }
        let query = Query::new().eq("reference_id", candidate).limit(1);
        match self.gateway.select(Table::UserSubmissions, &query).await {
            Ok(rows) => !rows.is_empty(),
            Err(e) => {
                tracing::debug!(error = %e, "Reference id check skipped the store");
                false
            }
        }
    }

    // ========== Read ==========

    /// Submissions matching `filter`, never failing.
    ///
    /// Local-only records come first, followed by the store's rows; a record
    /// present in both is taken from the store. With nothing in either tier
    /// the demo dataset stands in.
    pub async fn list(&self, filter: &SubmissionFilter) -> Vec<UserSubmission> {
        let local = self.local_list();

        let fetched = self
            .gateway
            .select(Table::UserSubmissions, &store_query(filter))
            .await
            .and_then(from_rows::<SubmissionRow>);

        let merged: Vec<UserSubmission> = match fetched {
            Ok(rows) if !rows.is_empty() => {
                let remote: Vec<UserSubmission> = rows.into_iter().map(Into::into).collect();
                let remote_refs: HashSet<&str> =
                    remote.iter().map(|s| s.reference_id.as_str()).collect();
                local
                    .iter()
                    .filter(|s| !remote_refs.contains(s.reference_id.as_str()))
                    .cloned()
                    .chain(remote.iter().cloned())
                    .collect()
            }
            Ok(_) => local,
            Err(e) => {
                if e.is_absent() {
                    tracing::debug!(error = %e, "No submissions table, using local tiers");
                } else {
                    tracing::warn!(error = %e, "Failed to list submissions, using local tiers");
                }
                local
            }
        };

        let records = if merged.is_empty() {
            self.demo.all().await
        } else {
            merged
        };
        records.into_iter().filter(|s| filter.matches(s)).collect()
    }

    /// Lookup by id or reference id across all tiers
    pub async fn find(&self, key: &str) -> Option<UserSubmission> {
        match self.locate(key).await {
            Ok(found) => found.map(|l| l.record),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Store lookup failed");
                None
            }
        }
    }

    /// First tier holding `key`: local cache, demo, then the store.
    ///
    /// Only a store failure other than "absent" is an error.
    pub async fn locate(&self, key: &str) -> Result<Option<Located>, GatewayError> {
        if let Some(record) = self.local_list().into_iter().find(|s| s.matches_key(key)) {
            return Ok(Some(Located {
                tier: Tier::LocalCache,
                record,
            }));
        }
        if let Some(record) = self.demo.find(key).await {
            return Ok(Some(Located {
                tier: Tier::Demo,
                record,
            }));
        }

        let query = if reference::is_reference_id(key) {
            Query::new().eq("reference_id", key)
        } else {
            Query::by_id(key)
        };
        match self
            .gateway
            .fetch_one(Table::UserSubmissions, &query)
            .await
            .and_then(from_row::<SubmissionRow>)
        {
            Ok(row) => Ok(Some(Located {
                tier: Tier::Gateway,
                record: row.into(),
            })),
            // a key the id column cannot parse is simply not there
            Err(e) if e.is_absent() || matches!(e, GatewayError::Validation(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    // ========== Mutate ==========

    /// Set the status and append a timeline entry labelled after it.
    /// Non-empty `notes` replace the admin notes.
    pub async fn update_status(
        &self,
        key: &str,
        status: SubmissionStatus,
        notes: Option<String>,
        performed_by: Option<String>,
    ) -> PortalResult<UserSubmission> {
        validate_optional_text(&notes, "notes", MAX_NOTE_LEN)?;
        let entry = TimelineEntry::status_change(status, notes, performed_by);
        self.apply_change(key, Change::Status(status, entry)).await
    }

    /// Append a free-text entry without touching status or notes
    pub async fn add_timeline_entry(
        &self,
        key: &str,
        action: &str,
        notes: Option<String>,
        performed_by: Option<String>,
    ) -> PortalResult<UserSubmission> {
        validate_required_text(action, "action", MAX_ACTION_LEN)?;
        validate_optional_text(&notes, "notes", MAX_NOTE_LEN)?;
        let entry = TimelineEntry::new(action.trim(), notes, performed_by);
        self.apply_change(key, Change::Note(entry)).await
    }

    async fn apply_change(&self, key: &str, change: Change) -> PortalResult<UserSubmission> {
        let located = self.locate(key).await.map_err(|e| {
            tracing::error!(key = %key, error = %e, "Submission lookup failed");
            PortalError::UpdateFailed(e.to_string())
        })?;
        let Some(Located { tier, mut record }) = located else {
            return Err(PortalError::NotFound(
                ErrorCode::SubmissionNotFound,
                key.to_string(),
            ));
        };

        match tier {
            Tier::LocalCache => self.cache.update::<Vec<UserSubmission>, _, PortalError>(
                CacheKey::Submissions,
                |list| {
                    let record = list.iter_mut().find(|s| s.matches_key(key)).ok_or_else(|| {
                        PortalError::NotFound(ErrorCode::SubmissionNotFound, key.to_string())
                    })?;
                    change.apply(record);
                    Ok(record.clone())
                },
            ),
            Tier::Demo => {
                change.apply(&mut record);
                self.cache
                    .update::<Vec<UserSubmission>, _, PortalError>(CacheKey::Submissions, |list| {
                        list.push(record.clone());
                        Ok(())
                    })?;
                self.demo.replace(&record).await;
                Ok(record)
            }
            Tier::Gateway => {
                change.apply(&mut record);
                let patch = json!({
                    "status": record.status,
                    "timeline": record.timeline,
                    "admin_notes": record.admin_notes,
                    "updated_at": record.updated_at,
                });
                self.gateway
                    .update(Table::UserSubmissions, &record.id, patch)
                    .await
                    .and_then(from_row::<SubmissionRow>)
                    .map(Into::into)
                    .map_err(|e| {
                        tracing::error!(id = %record.id, error = %e, "Submission update failed");
                        PortalError::UpdateFailed(e.to_string())
                    })
            }
        }
    }

    // ========== Internals ==========

    /// Cached list; an unreadable cache reads as empty
    fn local_list(&self) -> Vec<UserSubmission> {
        match self.cache.get::<Vec<UserSubmission>>(CacheKey::Submissions) {
            Ok(list) => list.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "Cached submissions unreadable, ignoring");
                Vec::new()
            }
        }
    }
}

/// Store-side translation of the list filter
fn store_query(filter: &SubmissionFilter) -> Query {
    let mut query = Query::new();
    if let Some(status) = filter.status {
        query = query.eq("status", status.as_str());
    }
    if let Some(service) = filter.service_type.as_deref().filter(|s| !s.is_empty()) {
        query = query.eq("service_type", service);
    }
    if let Some(needle) = filter.search_term() {
        query = query.any_ilike(&SEARCH_COLUMNS, needle);
    }
    if let Some(from) = filter.date_from.as_deref().filter(|s| !s.is_empty()) {
        query = query.gte("preferred_date", from);
    }
    if let Some(to) = filter.date_to.as_deref().filter(|s| !s.is_empty()) {
        query = query.lte("preferred_date", to);
    }
    query.order_by("created_at", true)
}
