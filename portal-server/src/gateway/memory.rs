//! In-process gateway
//!
//! Keeps rows as JSON objects in memory and evaluates [`Query`] the same way
//! PostgREST would. Faults can be injected to exercise fallback paths:
//! going offline, dropping a relation, or adding latency.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use tokio::sync::RwLock;

use super::{Gateway, GatewayError, GatewayResult, Query, Table};

const DEFAULT_PUBLIC_BASE: &str = "http://localhost:54321";

#[derive(Default)]
struct Store {
    tables: HashMap<Table, Vec<Value>>,
    missing: HashSet<Table>,
    /// path -> (bytes, content type)
    blobs: HashMap<String, (Vec<u8>, String)>,
}

pub struct MemoryGateway {
    store: RwLock<Store>,
    offline: AtomicBool,
    latency_ms: AtomicU64,
    public_base: String,
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::with_public_base(DEFAULT_PUBLIC_BASE)
    }

    /// Base used when building public blob URLs
    pub fn with_public_base(base: impl Into<String>) -> Self {
        Self {
            store: RwLock::new(Store::default()),
            offline: AtomicBool::new(false),
            latency_ms: AtomicU64::new(0),
            public_base: base.into().trim_end_matches('/').to_string(),
        }
    }

    // ========== Fault injection ==========

    /// Every call fails with `Connectivity` while offline
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Delay applied before every call
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    /// Make `table` behave as if the relation was never created
    pub async fn drop_relation(&self, table: Table) {
        let mut store = self.store.write().await;
        store.tables.remove(&table);
        store.missing.insert(table);
    }

    // ========== Inspection ==========

    /// Insert rows verbatim (no id or timestamp assignment)
    pub async fn seed(&self, table: Table, rows: impl IntoIterator<Item = Value>) {
        let mut store = self.store.write().await;
        store.missing.remove(&table);
        store.tables.entry(table).or_default().extend(rows);
    }

    pub async fn rows(&self, table: Table) -> Vec<Value> {
        self.store
            .read()
            .await
            .tables
            .get(&table)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn blob(&self, path: &str) -> Option<(Vec<u8>, String)> {
        self.store.read().await.blobs.get(path).cloned()
    }

    // ========== Internals ==========

    async fn enter(&self) -> GatewayResult<()> {
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(GatewayError::Connectivity(
                "in-process gateway is offline".to_string(),
            ));
        }
        Ok(())
    }

    fn check_relation(store: &Store, table: Table) -> GatewayResult<()> {
        if store.missing.contains(&table) {
            return Err(GatewayError::RelationNotFound(table.name().to_string()));
        }
        Ok(())
    }

    fn object(row: Value) -> GatewayResult<serde_json::Map<String, Value>> {
        match row {
            Value::Object(map) => Ok(map),
            other => Err(GatewayError::Validation(format!(
                "row must be a JSON object, got {other}"
            ))),
        }
    }

    fn row_id(row: &Value) -> Option<&str> {
        row.get("id").and_then(Value::as_str)
    }
}

fn timestamp() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true))
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn select(&self, table: Table, query: &Query) -> GatewayResult<Vec<Value>> {
        self.enter().await?;
        let store = self.store.read().await;
        Self::check_relation(&store, table)?;
        let rows = store.tables.get(&table).cloned().unwrap_or_default();
        Ok(query.apply(rows))
    }

    async fn insert(&self, table: Table, row: Value) -> GatewayResult<Value> {
        self.enter().await?;
        let mut map = Self::object(row)?;
        let mut store = self.store.write().await;
        Self::check_relation(&store, table)?;

        let rows = store.tables.entry(table).or_default();
        let given_id = map.get("id").and_then(Value::as_str).map(str::to_string);
        match given_id {
            Some(id) if rows.iter().any(|r| Self::row_id(r) == Some(id.as_str())) => {
                return Err(GatewayError::Validation(format!(
                    "duplicate key value violates unique constraint \"{table}_pkey\""
                )));
            }
            Some(_) => {}
            None => {
                map.insert("id".into(), Value::String(uuid::Uuid::new_v4().to_string()));
            }
        }
        let now = timestamp();
        for column in ["created_at", "updated_at"] {
            if map.get(column).is_none_or(Value::is_null) {
                map.insert(column.into(), now.clone());
            }
        }

        let row = Value::Object(map);
        rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, table: Table, id: &str, patch: Value) -> GatewayResult<Value> {
        self.enter().await?;
        let patch = Self::object(patch)?;
        let mut store = self.store.write().await;
        Self::check_relation(&store, table)?;

        let row = store
            .tables
            .get_mut(&table)
            .and_then(|rows| rows.iter_mut().find(|r| Self::row_id(r) == Some(id)))
            .ok_or(GatewayError::RowNotFound)?;
        if let Value::Object(existing) = &mut *row {
            for (k, v) in patch {
                if k != "id" {
                    existing.insert(k, v);
                }
            }
        }
        Ok(row.clone())
    }

    async fn upsert(&self, table: Table, row: Value) -> GatewayResult<Value> {
        self.enter().await?;
        let map = Self::object(row)?;
        let mut store = self.store.write().await;
        Self::check_relation(&store, table)?;

        let id = map
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| GatewayError::Validation("upsert requires an id".to_string()))?;

        let rows = store.tables.entry(table).or_default();
        if let Some(row) = rows
            .iter_mut()
            .find(|r| Self::row_id(r) == Some(id.as_str()))
        {
            if let Value::Object(existing) = &mut *row {
                existing.extend(map);
            }
            return Ok(row.clone());
        }
        let row = Value::Object(map);
        rows.push(row.clone());
        Ok(row)
    }

    async fn delete(&self, table: Table, id: &str) -> GatewayResult<()> {
        self.enter().await?;
        let mut store = self.store.write().await;
        Self::check_relation(&store, table)?;
        if let Some(rows) = store.tables.get_mut(&table) {
            rows.retain(|r| Self::row_id(r) != Some(id));
        }
        Ok(())
    }

    async fn count(&self, table: Table) -> GatewayResult<u64> {
        self.enter().await?;
        let store = self.store.read().await;
        Self::check_relation(&store, table)?;
        Ok(store.tables.get(&table).map_or(0, |rows| rows.len() as u64))
    }

    async fn put_blob(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> GatewayResult<String> {
        self.enter().await?;
        let key = format!("{bucket}/{path}");
        let mut store = self.store.write().await;
        if !upsert && store.blobs.contains_key(&key) {
            return Err(GatewayError::Validation(
                "The resource already exists".to_string(),
            ));
        }
        store
            .blobs
            .insert(key.clone(), (bytes, content_type.to_string()));
        Ok(format!(
            "{}/storage/v1/object/public/{key}",
            self.public_base
        ))
    }
}
