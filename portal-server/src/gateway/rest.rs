//! Hosted store over HTTP
//!
//! Talks to a PostgREST endpoint (`/rest/v1/{table}`) and the Storage API
//! (`/storage/v1/object/{bucket}/{path}`) using the project's anon key.
//!
//! # Error mapping
//!
//! | Response | GatewayError |
//! |----------|--------------|
//! | transport failure | `Connectivity` |
//! | `PGRST116` | `RowNotFound` |
//! | `42P01` | `RelationNotFound` |
//! | 400 / 409 / 422, SQLSTATE class 22 or 23 | `Validation` |
//! | anything else | `Connectivity` |

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use super::{Condition, Gateway, GatewayError, GatewayResult, Query, Table};

/// PostgREST error body
#[derive(Debug, Default, Deserialize)]
struct PostgrestError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RestGateway {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestGateway {
    pub fn new(base_url: &str, api_key: &str, timeout: std::time::Duration) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Connectivity(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.base_url, table.name())
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn send(builder: RequestBuilder) -> GatewayResult<Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| GatewayError::Connectivity(e.to_string()))?;
        if response.status().is_success() {
            return Ok(response);
        }
        Err(Self::map_error(response).await)
    }

    async fn map_error(response: Response) -> GatewayError {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let body: PostgrestError = serde_json::from_str(&text).unwrap_or_default();
        classify(status, body.code.as_deref(), body.message.unwrap_or(text))
    }

    /// Rows from a `return=representation` response
    async fn rows(response: Response) -> GatewayResult<Vec<Value>> {
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::Connectivity(e.to_string()))?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str::<Value>(&text)? {
            Value::Array(rows) => Ok(rows),
            row @ Value::Object(_) => Ok(vec![row]),
            other => Err(GatewayError::Validation(format!(
                "unexpected response body: {other}"
            ))),
        }
    }

    /// Exactly one row or `RowNotFound`
    async fn single(response: Response) -> GatewayResult<Value> {
        Self::rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or(GatewayError::RowNotFound)
    }
}

/// Map a failed response onto the gateway error kinds
fn classify(status: StatusCode, code: Option<&str>, message: String) -> GatewayError {
    match code {
        Some("PGRST116") => return GatewayError::RowNotFound,
        Some("42P01") | Some("PGRST205") => return GatewayError::RelationNotFound(message),
        Some(c) if c.starts_with("22") || c.starts_with("23") => {
            return GatewayError::Validation(message);
        }
        _ => {}
    }
    match status {
        StatusCode::NOT_FOUND if code.is_none() => GatewayError::RelationNotFound(message),
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
            GatewayError::Validation(message)
        }
        _ => GatewayError::Connectivity(format!("{status}: {message}")),
    }
}

/// `value` quoted for PostgREST when it contains reserved characters
fn quote(value: &str) -> String {
    if value.contains([',', '.', ':', '(', ')', '"', ' ']) {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// PostgREST query parameters for a [`Query`]
pub(crate) fn query_params(query: &Query) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];
    for condition in &query.conditions {
        match condition {
            Condition::Eq(col, v) => params.push((col.clone(), format!("eq.{}", scalar(v)))),
            Condition::Gte(col, v) => params.push((col.clone(), format!("gte.{v}"))),
            Condition::Lte(col, v) => params.push((col.clone(), format!("lte.{v}"))),
            Condition::AnyILike(cols, needle) => {
                let pattern = quote(&format!("*{needle}*"));
                let parts: Vec<String> = cols
                    .iter()
                    .map(|c| format!("{c}.ilike.{pattern}"))
                    .collect();
                params.push(("or".to_string(), format!("({})", parts.join(","))));
            }
        }
    }
    if let Some(order) = &query.order {
        let dir = if order.descending { "desc" } else { "asc" };
        params.push(("order".to_string(), format!("{}.{dir}", order.column)));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}

#[async_trait]
impl Gateway for RestGateway {
    async fn select(&self, table: Table, query: &Query) -> GatewayResult<Vec<Value>> {
        let builder = self
            .request(Method::GET, &self.table_url(table))
            .query(&query_params(query));
        Self::rows(Self::send(builder).await?).await
    }

    async fn insert(&self, table: Table, row: Value) -> GatewayResult<Value> {
        let builder = self
            .request(Method::POST, &self.table_url(table))
            .header("Prefer", "return=representation")
            .json(&[row]);
        Self::single(Self::send(builder).await?).await
    }

    async fn update(&self, table: Table, id: &str, patch: Value) -> GatewayResult<Value> {
        let builder = self
            .request(Method::PATCH, &self.table_url(table))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(&patch);
        Self::single(Self::send(builder).await?).await
    }

    async fn upsert(&self, table: Table, row: Value) -> GatewayResult<Value> {
        let builder = self
            .request(Method::POST, &self.table_url(table))
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&[row]);
        Self::single(Self::send(builder).await?).await
    }

    async fn delete(&self, table: Table, id: &str) -> GatewayResult<()> {
        let builder = self
            .request(Method::DELETE, &self.table_url(table))
            .query(&[("id", format!("eq.{id}"))]);
        Self::send(builder).await?;
        Ok(())
    }

    async fn count(&self, table: Table) -> GatewayResult<u64> {
        let builder = self
            .request(Method::HEAD, &self.table_url(table))
            .query(&[("select", "*")])
            .header("Prefer", "count=exact");
        let response = Self::send(builder).await?;
        // Content-Range: 0-24/3573 (or */0 when empty)
        let total = response
            .headers()
            .get(reqwest::header::CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.rsplit('/').next())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        Ok(total)
    }

    async fn put_blob(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> GatewayResult<String> {
        let url = format!("{}/storage/v1/object/{bucket}/{path}", self.base_url);
        let builder = self
            .request(Method::POST, &url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-upsert", if upsert { "true" } else { "false" })
            .body(bytes);
        Self::send(builder).await?;
        Ok(format!(
            "{}/storage/v1/object/public/{bucket}/{path}",
            self.base_url
        ))
    }
}
