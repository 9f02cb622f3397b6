//! Loads configuration files from disk and folds them into a runtime `Config`.

use super::file::ConfigFile;
use super::Config;
use crate::core::error::{AppError, Result};
use std::path::Path;
use std::time::Duration;

/// Name looked for in the working directory when no path is given.
const DEFAULT_CONFIG_FILE: &str = "mailprobe.toml";

pub(crate) fn load_config_file(path: &str) -> Result<ConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("Cannot read config file '{}': {}", path, e)))?;
    toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("Invalid config file '{}': {}", path, e)))
}

/// Returns the default config file path if one exists in the working directory.
pub(crate) fn find_default_config_file() -> Option<String> {
    if Path::new(DEFAULT_CONFIG_FILE).is_file() {
        Some(DEFAULT_CONFIG_FILE.to_string())
    } else {
        None
    }
}

/// Applies every value present in `file` on top of `config`.
pub(crate) fn apply(config: &mut Config, file: &ConfigFile) {
    if let Some(secs) = file.dns.dns_timeout {
        config.dns_timeout = Duration::from_secs(secs);
    }
    if let Some(ref servers) = file.dns.dns_servers {
        config.dns_servers = servers.clone();
    }

    if let Some(secs) = file.smtp.smtp_timeout {
        config.smtp_timeout = Duration::from_secs(secs);
    }
    if let Some(port) = file.smtp.smtp_port {
        config.smtp_port = port;
    }
    if let Some(ref sender) = file.smtp.smtp_sender {
        config.smtp_sender = sender.clone();
    }
    if let Some(ref helo) = file.smtp.helo_domain {
        config.helo_domain = helo.clone();
    }

    if let Some(secs) = file.cache.cache_ttl {
        config.cache_ttl = Duration::from_secs(secs);
    }

    if let Some(max) = file.rate_limit.max_requests {
        config.rate_limit_max = max;
    }
    if let Some(secs) = file.rate_limit.window {
        config.rate_limit_window = Duration::from_secs(secs);
    }

    if let Some(size) = file.batch.batch_size {
        config.batch_size = size;
    }
    if let Some(concurrency) = file.batch.max_concurrency {
        config.max_concurrency = concurrency;
    }
    if let Some(ms) = file.batch.inter_batch_delay_ms {
        config.inter_batch_delay = Duration::from_millis(ms);
    }
    if let Some(attempts) = file.batch.retry_attempts {
        config.retry_attempts = attempts;
    }
    if let Some(ms) = file.batch.retry_backoff_ms {
        config.retry_backoff = Duration::from_millis(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_values_override_defaults() {
        let file: ConfigFile = toml::from_str(
            r#"
            [smtp]
            smtp_timeout = 3
            smtp_port = 2525

            [batch]
            batch_size = 50
            inter_batch_delay_ms = 1500
        "#,
        )
        .expect("valid config");

        let mut config = Config::default();
        apply(&mut config, &file);

        assert_eq!(config.smtp_timeout, Duration::from_secs(3));
        assert_eq!(config.smtp_port, 2525);
        assert_eq!(config.batch_size, 50);
        assert_eq!(config.inter_batch_delay, Duration::from_millis(1500));
        // Untouched values keep their defaults.
        assert_eq!(config.retry_attempts, 2);
    }
}
