//! Pipeline configuration.
//!
//! A [`PipelineConfig`] is built once (defaults, optionally overlaid by a TOML
//! file and CLI flags) and handed to every component explicitly.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Result type for configuration loading.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Which triple store backend the pipeline talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Remote GraphDB/RDF4J repository over HTTP.
    #[default]
    Remote,
    /// Embedded oxigraph store, lost when the process exits.
    Memory,
}

/// Configuration for the concept-to-graph pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// ConceptNet endpoint that concepts are appended to.
    pub api_base: String,
    /// Edges requested per page.
    pub page_size: usize,
    /// Per-request timeout for both the relation API and the store.
    pub request_timeout_secs: u64,
    /// Authority raw ConceptNet ids are namespaced under.
    pub ingest_base: String,
    /// Namespace concept IRIs live in, used by the relevance query.
    pub concept_base: String,
    /// Base URL of the triple store server.
    pub store_base: String,
    /// Repository name on the store server.
    pub repository: String,
    /// Row cap on the relevance query.
    pub result_limit: usize,
    /// Authority used for the published Turtle description.
    pub description_base: String,
    /// Store backend.
    pub store: StoreBackend,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.conceptnet.io/c/en".into(),
            page_size: 2000,
            request_timeout_secs: 30,
            ingest_base: "http://conceptnet.io".into(),
            concept_base: "http://conceptnet.io/c/en/".into(),
            store_base: "http://localhost:7200".into(),
            repository: "yolo".into(),
            result_limit: 1000,
            description_base: "http://example.org/".into(),
            store: StoreBackend::Remote,
        }
    }
}

impl PipelineConfig {
    /// Load from a TOML file. Missing keys fall back to defaults.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the pipeline loop or query nothing.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.page_size == 0 {
            return Err(ConfigError::Invalid {
                message: "page_size must be > 0".into(),
            });
        }
        if self.result_limit == 0 {
            return Err(ConfigError::Invalid {
                message: "result_limit must be > 0".into(),
            });
        }
        for (name, value) in [
            ("api_base", &self.api_base),
            ("ingest_base", &self.ingest_base),
            ("concept_base", &self.concept_base),
            ("store_base", &self.store_base),
            ("repository", &self.repository),
            ("description_base", &self.description_base),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    message: format!("{name} must not be empty"),
                });
            }
        }
        Ok(())
    }

    /// `{store_base}/repositories/{repository}/statements`
    pub fn statements_endpoint(&self) -> String {
        format!("{}/statements", self.query_endpoint())
    }

    /// `{store_base}/repositories/{repository}`
    pub fn query_endpoint(&self) -> String {
        format!(
            "{}/repositories/{}",
            self.store_base.trim_end_matches('/'),
            self.repository
        )
    }
}
