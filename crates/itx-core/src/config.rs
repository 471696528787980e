//! Configuration for itx
//!
//! Loaded from an optional TOML file; the API binary layers env
//! overrides (`ITX_STORE`, `ITX_API_PORT`) on top.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// itx configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path of the JSONL document store
    pub store_path: String,

    /// Address the API binds to
    pub host: String,

    /// Port the API listens on
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: "issues.jsonl".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Config {
    /// Load config from a TOML file, falling back to defaults when absent
    pub fn load(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("invalid config: {}", e)))?;
        Ok(config)
    }
}
