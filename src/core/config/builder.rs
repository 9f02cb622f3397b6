//! Fluent builder assembling a validated runtime `Config` from defaults,
//! an optional TOML file, and programmatic overrides (in that order).

use super::{loading, Config};
use crate::core::error::Result;
use std::time::Duration;

#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config_file: Option<String>,
    skip_default_file: bool,

    smtp_timeout: Option<Duration>,
    smtp_port: Option<u16>,
    smtp_sender: Option<String>,
    helo_domain: Option<String>,

    dns_timeout: Option<Duration>,
    dns_servers: Option<Vec<String>>,

    cache_ttl: Option<Duration>,
    rate_limit_max: Option<usize>,
    rate_limit_window: Option<Duration>,

    batch_size: Option<usize>,
    max_concurrency: Option<usize>,
    inter_batch_delay: Option<Duration>,
    retry_attempts: Option<u32>,
    retry_backoff: Option<Duration>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the given TOML file instead of probing for `mailprobe.toml`.
    pub fn config_file(mut self, path: impl Into<String>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Never read a config file, even if one exists in the working directory.
    pub fn without_config_file(mut self) -> Self {
        self.skip_default_file = true;
        self
    }

    pub fn smtp_timeout(mut self, timeout: Duration) -> Self {
        self.smtp_timeout = Some(timeout);
        self
    }

    pub fn smtp_port(mut self, port: u16) -> Self {
        self.smtp_port = Some(port);
        self
    }

    pub fn smtp_sender(mut self, sender: impl Into<String>) -> Self {
        self.smtp_sender = Some(sender.into());
        self
    }

    pub fn helo_domain(mut self, helo: impl Into<String>) -> Self {
        self.helo_domain = Some(helo.into());
        self
    }

    pub fn dns_timeout(mut self, timeout: Duration) -> Self {
        self.dns_timeout = Some(timeout);
        self
    }

    pub fn dns_servers(mut self, servers: Vec<String>) -> Self {
        self.dns_servers = Some(servers);
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    pub fn rate_limit(mut self, max_requests: usize, window: Duration) -> Self {
        self.rate_limit_max = Some(max_requests);
        self.rate_limit_window = Some(window);
        self
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = Some(size);
        self
    }

    pub fn max_concurrency(mut self, concurrency: usize) -> Self {
        self.max_concurrency = Some(concurrency);
        self
    }

    pub fn inter_batch_delay(mut self, delay: Duration) -> Self {
        self.inter_batch_delay = Some(delay);
        self
    }

    pub fn retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = Some(attempts);
        self
    }

    pub fn retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = Some(backoff);
        self
    }

    /// Resolves the final configuration and validates it.
    pub fn build(self) -> Result<Config> {
        let mut config = Config::default();

        let file_path = match self.config_file {
            Some(ref path) => Some(path.clone()),
            None if self.skip_default_file => None,
            None => loading::find_default_config_file(),
        };
        if let Some(ref path) = file_path {
            let file = loading::load_config_file(path)?;
            loading::apply(&mut config, &file);
            tracing::debug!("Loaded configuration from {}", path);
            config.loaded_config_path = Some(path.clone());
        }

        if let Some(timeout) = self.smtp_timeout {
            config.smtp_timeout = timeout;
        }
        if let Some(port) = self.smtp_port {
            config.smtp_port = port;
        }
        if let Some(sender) = self.smtp_sender {
            config.smtp_sender = sender;
        }
        if let Some(helo) = self.helo_domain {
            config.helo_domain = helo;
        }
        if let Some(timeout) = self.dns_timeout {
            config.dns_timeout = timeout;
        }
        if let Some(servers) = self.dns_servers {
            config.dns_servers = servers;
        }
        if let Some(ttl) = self.cache_ttl {
            config.cache_ttl = ttl;
        }
        if let Some(max) = self.rate_limit_max {
            config.rate_limit_max = max;
        }
        if let Some(window) = self.rate_limit_window {
            config.rate_limit_window = window;
        }
        if let Some(size) = self.batch_size {
            config.batch_size = size;
        }
        if let Some(concurrency) = self.max_concurrency {
            config.max_concurrency = concurrency;
        }
        if let Some(delay) = self.inter_batch_delay {
            config.inter_batch_delay = delay;
        }
        if let Some(attempts) = self.retry_attempts {
            config.retry_attempts = attempts;
        }
        if let Some(backoff) = self.retry_backoff {
            config.retry_backoff = backoff;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = ConfigBuilder::new()
            .without_config_file()
            .smtp_timeout(Duration::from_secs(3))
            .smtp_sender("probe@test.example")
            .rate_limit(5, Duration::from_secs(30))
            .build()
            .expect("config builds");
        assert_eq!(config.smtp_timeout, Duration::from_secs(3));
        assert_eq!(config.smtp_sender, "probe@test.example");
        assert_eq!(config.rate_limit_max, 5);
        assert_eq!(config.rate_limit_window, Duration::from_secs(30));
    }

    #[test]
    fn builder_rejects_invalid_sender() {
        let result = ConfigBuilder::new()
            .without_config_file()
            .smtp_sender("not-an-address")
            .build();
        assert!(result.is_err());
    }
}
