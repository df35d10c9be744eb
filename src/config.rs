//! Record-store connection configuration. Supplied by the process
//! environment or a TOML file, never hardcoded.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

const URL_VAR: &str = "BATTIMPACT_STORE_URL";
const KEY_VAR: &str = "BATTIMPACT_STORE_KEY";

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the record store, e.g. `https://xyz.supabase.co`.
    pub url: String,
    /// API key sent with every request.
    pub api_key: String,
}

impl StoreConfig {
    /// Read from `BATTIMPACT_STORE_URL` / `BATTIMPACT_STORE_KEY`.
    pub fn from_env() -> Result<Self> {
        let url = std::env::var(URL_VAR).with_context(|| format!("{URL_VAR} not set"))?;
        let api_key = std::env::var(KEY_VAR).with_context(|| format!("{KEY_VAR} not set"))?;
        Ok(StoreConfig { url, api_key })
    }

    /// Read from a TOML file with `url` and `api_key` keys.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).context("parsing store config")
    }

    /// Environment first, file as the fallback.
    pub fn load(fallback: &Path) -> Result<Self> {
        match Self::from_env() {
            Ok(config) => Ok(config),
            Err(_) => Self::from_file(fallback),
        }
    }
}
