//! TOML configuration loading.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::api::RetryPolicy;
use crate::error::Result;
use crate::looter::LooterOptions;

/// Top-level configuration file structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub options: OptionsConfig,
    #[serde(default)]
    pub network: NetworkConfig,
}

/// Download behavior options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OptionsConfig {
    /// Also fetch videos.
    pub include_videos: bool,

    /// Only fetch videos; implies `include_videos`.
    pub videos_only: bool,

    /// Worker pool size.
    pub jobs: usize,

    /// Artifact naming template.
    pub template: String,

    /// Write a JSON metadata document next to each artifact.
    pub dump_metadata: bool,

    /// Only write metadata documents.
    pub metadata_only: bool,

    /// Force the detailed refetch for every record.
    pub extended_metadata: bool,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            include_videos: false,
            videos_only: false,
            jobs: 16,
            template: "{id}".into(),
            dump_metadata: false,
            metadata_only: false,
            extended_metadata: false,
        }
    }
}

/// Transport settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("instalooter-rs/", env!("CARGO_PKG_VERSION")).into(),
            timeout_secs: 30,
            retry_attempts: 3,
            retry_delay_ms: 500,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Looter options derived from this configuration.
    pub fn looter_options(&self) -> LooterOptions {
        LooterOptions {
            include_videos: self.options.include_videos || self.options.videos_only,
            videos_only: self.options.videos_only,
            jobs: self.options.jobs,
            template: self.options.template.clone(),
            dump_metadata: self.options.dump_metadata || self.options.metadata_only,
            metadata_only: self.options.metadata_only,
            extended_metadata: self.options.extended_metadata,
        }
    }

    /// Retry policy derived from this configuration.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.network.retry_attempts,
            base_delay: Duration::from_millis(self.network.retry_delay_ms),
        }
    }

    /// Request timeout derived from this configuration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.network.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.options.jobs, 16);
        assert_eq!(config.options.template, "{id}");
        assert_eq!(config.network.timeout_secs, 30);
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [options]
            videos_only = true
            jobs = 4

            [network]
            retry_attempts = 1
            "#,
        )
        .unwrap();

        assert!(config.options.videos_only);
        assert_eq!(config.options.jobs, 4);
        assert_eq!(config.network.retry_attempts, 1);
        // Untouched sections keep their defaults.
        assert_eq!(config.options.template, "{id}");

        let options = config.looter_options();
        assert!(options.include_videos, "videos_only implies include_videos");
    }

    #[test]
    fn test_metadata_only_implies_dump() {
        let config: Config = toml::from_str("[options]\nmetadata_only = true\n").unwrap();
        let options = config.looter_options();
        assert!(options.dump_metadata);
        assert!(options.metadata_only);
    }
}
