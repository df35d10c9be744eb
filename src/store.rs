//! Access to the external record store holding trained-model metadata and
//! visualization references.
//!
//! The store exposes, per logical table, select-all and select-by-equality
//! queries returning raw JSON records, plus resolution of a storage path to
//! a publicly reachable URL. Calls are synchronous and issued on the
//! interaction thread; there are no retries, no timeouts beyond the client
//! default, and no circuit breaking. A failure maps to
//! [`DashboardError::UpstreamQuery`] once, at the call site.

use std::collections::BTreeMap;

use serde_json::Value as JsonValue;

use crate::config::StoreConfig;
use crate::error::DashboardError;

/// Seam between the analytical layer and whatever backs the record store.
pub trait RecordStore {
    /// All records of a logical table.
    fn select_all(&self, table: &str) -> Result<Vec<JsonValue>, DashboardError>;

    /// Records of a logical table where `column` equals `value`.
    fn select_eq(
        &self,
        table: &str,
        column: &str,
        value: &JsonValue,
    ) -> Result<Vec<JsonValue>, DashboardError>;

    /// Publicly resolvable URL for a stored file.
    fn public_url(&self, bucket: &str, path: &str) -> String;
}

// ---------------------------------------------------------------------------
// HttpStore – PostgREST-style backend
// ---------------------------------------------------------------------------

/// Blocking client for a PostgREST-style store (Supabase layout): tables
/// under `/rest/v1/`, public objects under `/storage/v1/object/public/`.
pub struct HttpStore {
    base_url: String,
    api_key: String,
    client: reqwest::blocking::Client,
}

impl HttpStore {
    pub fn new(config: &StoreConfig) -> Self {
        HttpStore {
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            client: reqwest::blocking::Client::new(),
        }
    }

    fn get(&self, url: &str) -> Result<Vec<JsonValue>, DashboardError> {
        log::debug!("record store query: {url}");
        let response = self
            .client
            .get(url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .map_err(|e| DashboardError::UpstreamQuery(e.to_string()))?
            .error_for_status()
            .map_err(|e| DashboardError::UpstreamQuery(e.to_string()))?;

        response
            .json::<Vec<JsonValue>>()
            .map_err(|e| DashboardError::UpstreamQuery(format!("malformed response: {e}")))
    }
}

impl RecordStore for HttpStore {
    fn select_all(&self, table: &str) -> Result<Vec<JsonValue>, DashboardError> {
        self.get(&format!("{}/rest/v1/{table}?select=*", self.base_url))
    }

    fn select_eq(
        &self,
        table: &str,
        column: &str,
        value: &JsonValue,
    ) -> Result<Vec<JsonValue>, DashboardError> {
        // PostgREST equality filters are plain text on the query string.
        let literal = match value {
            JsonValue::String(s) => s.clone(),
            other => other.to_string(),
        };
        self.get(&format!(
            "{}/rest/v1/{table}?select=*&{column}=eq.{literal}",
            self.base_url
        ))
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/public/{bucket}/{path}", self.base_url)
    }
}

// ---------------------------------------------------------------------------
// MemoryStore – in-memory backend for tests and offline development
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: BTreeMap<String, Vec<JsonValue>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, table: &str, record: JsonValue) {
        self.tables.entry(table.to_string()).or_default().push(record);
    }
}

impl RecordStore for MemoryStore {
    fn select_all(&self, table: &str) -> Result<Vec<JsonValue>, DashboardError> {
        Ok(self.tables.get(table).cloned().unwrap_or_default())
    }

    fn select_eq(
        &self,
        table: &str,
        column: &str,
        value: &JsonValue,
    ) -> Result<Vec<JsonValue>, DashboardError> {
        Ok(self
            .tables
            .get(table)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| r.get(column) == Some(value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("memory://{bucket}/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn memory_store_filters_by_equality() {
        let mut store = MemoryStore::new();
        store.insert("visualizations", json!({"model_id": 1, "vis_type": "rfecv"}));
        store.insert("visualizations", json!({"model_id": 2, "vis_type": "venn"}));

        let hits = store
            .select_eq("visualizations", "model_id", &json!(1))
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["vis_type"], "rfecv");

        // Unknown tables are empty, not errors.
        assert!(store.select_all("nope").unwrap().is_empty());
    }

    #[test]
    fn http_store_builds_public_urls() {
        let store = HttpStore::new(&StoreConfig {
            url: "https://example.supabase.co/".to_string(),
            api_key: "key".to_string(),
        });
        assert_eq!(
            store.public_url("Visualisations", "model_1/rfecv.png"),
            "https://example.supabase.co/storage/v1/object/public/Visualisations/model_1/rfecv.png"
        );
    }
}
