//! Service-wide configuration, loaded/saved as TOML the way the rest of
//! this ecosystem's `Config` types do.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// How often the store's background task re-snapshots metadata if dirty.
    pub sync_metadata_timeout_ms: u64,
    /// K: how many top n-grams survive per language/per-n detector profile.
    pub detector_profile_size: usize,
    /// Minimum occurrence count an ingested word needs to be written to the store.
    pub ingest_boundary: u64,
    /// Worker thread count for the Wikipedia ingester.
    pub wikipedia_workers: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            sync_metadata_timeout_ms: 60_000,
            detector_profile_size: 400,
            ingest_boundary: 2,
            wikipedia_workers: 4,
        }
    }
}

impl ServiceConfig {
    pub fn sync_metadata_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.sync_metadata_timeout_ms)
    }

    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(
        path: P,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: ServiceConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
