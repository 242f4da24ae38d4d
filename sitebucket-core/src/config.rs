use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use crate::contract::WebsiteConfig;

/// Uploads in flight when no concurrency is configured.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Settings for a directory sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncOptions {
    /// Maximum number of uploads in flight. Zero is treated as one.
    pub concurrency: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        SyncOptions {
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Deployment settings that do not depend on the provider session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    pub website: WebsiteConfig,
    pub sync: SyncOptions,
}

impl DeployConfig {
    pub fn trace_loaded(&self) {
        info!(
            index_document = %self.website.index_document,
            error_document = %self.website.error_document,
            concurrency = self.sync.concurrency,
            "Loaded DeployConfig"
        );
        debug!(?self, "DeployConfig loaded (full debug)");
    }
}
