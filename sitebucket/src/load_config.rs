/// `load_config` module: loads the optional YAML deployment config into typed settings.
///
/// This module is the only place where user-supplied YAML is parsed. Every section is
/// optional, so an empty file (or no file at all) yields the defaults.
///
/// # Responsibilities
/// - Parse the YAML file into [`CliConfig`]
/// - Keep AWS session settings (`aws`) apart from the provider-neutral
///   [`DeployConfig`] (`website`, `sync`) that the core consumes
/// - Produce error messages that name the offending file
///
/// # Errors
/// All errors in this module use `anyhow::Error` and are surfaced at the CLI boundary.
use anyhow::Result;
use serde::Deserialize;
use sitebucket_core::config::{DeployConfig, SyncOptions, WebsiteConfig};
use std::fs;
use std::path::Path;
use tracing::{error, info};

/// How to build the AWS session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AwsSection {
    /// Named profile from the shared AWS config files.
    pub profile: Option<String>,
    /// Region for the session and for newly created buckets.
    pub region: Option<String>,
    /// Alternative endpoint, e.g. a local S3 emulator. Forces path-style addressing.
    pub endpoint_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub aws: AwsSection,
    pub website: WebsiteConfig,
    pub sync: SyncOptions,
}

impl CliConfig {
    pub fn deploy(&self) -> DeployConfig {
        DeployConfig {
            website: self.website.clone(),
            sync: self.sync.clone(),
        }
    }
}

/// Loads the YAML config file at `path`.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    if config_content.trim().is_empty() {
        info!(config_path = ?path_ref, "Config file is empty, using defaults");
        return Ok(CliConfig::default());
    }

    let config: CliConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => conf,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!(
                "Failed to parse config YAML {:?}: {e}",
                path_ref
            ));
        }
    };
    config.deploy().trace_loaded();
    Ok(config)
}

/// Loads `path` when given, defaults otherwise.
pub fn load_optional_config(path: Option<&Path>) -> Result<CliConfig> {
    match path {
        Some(path) => load_config(path),
        None => {
            info!("No config file given, using defaults");
            Ok(CliConfig::default())
        }
    }
}
