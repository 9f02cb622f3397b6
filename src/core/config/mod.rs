//! Defines the core runtime `Config` struct, its defaults, and related utilities.
//! Submodules handle loading, building, and validation.

pub(crate) mod builder;
pub(crate) mod file;
pub(crate) mod loading;
pub(crate) mod validation;

pub use builder::ConfigBuilder;
pub use file::ConfigFile;

use crate::core::error::Result;
use std::time::Duration;

/// Runtime configuration settings used by the mailprobe core logic.
#[derive(Debug, Clone)]
pub struct Config {
    pub dns_timeout: Duration,
    pub dns_servers: Vec<String>,

    pub smtp_timeout: Duration,
    pub smtp_port: u16,
    pub smtp_sender: String,
    pub helo_domain: String,

    pub cache_ttl: Duration,
    pub rate_limit_max: usize,
    pub rate_limit_window: Duration,

    pub batch_size: usize,
    pub max_concurrency: usize,
    pub inter_batch_delay: Duration,
    pub retry_attempts: u32,
    pub retry_backoff: Duration,

    pub loaded_config_path: Option<String>,
}

impl Config {
    fn build_default() -> Self {
        let dns_servers = vec![
            "8.8.8.8".to_string(),
            "8.8.4.4".to_string(),
            "1.1.1.1".to_string(),
            "1.0.0.1".to_string(),
        ];

        Config {
            dns_timeout: Duration::from_secs(5),
            dns_servers,
            smtp_timeout: Duration::from_secs(10),
            smtp_port: 25,
            smtp_sender: "verify-probe@example.com".to_string(),
            helo_domain: "localhost".to_string(),
            cache_ttl: Duration::from_secs(3600),
            rate_limit_max: 10,
            rate_limit_window: Duration::from_secs(60),
            batch_size: 10,
            max_concurrency: 5,
            inter_batch_delay: Duration::from_secs(3),
            retry_attempts: 2,
            retry_backoff: Duration::from_secs(1),
            loaded_config_path: None,
        }
    }

    /// Checks the configuration for values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::build_default()
    }
}
