//! Defines the structure mirroring the TOML configuration file format.

use serde::Deserialize;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub(crate) dns: DnsConfig,
    #[serde(default)]
    pub(crate) smtp: SmtpConfig,
    #[serde(default)]
    pub(crate) cache: CacheConfig,
    #[serde(default)]
    pub(crate) rate_limit: RateLimitConfig,
    #[serde(default)]
    pub(crate) batch: BatchConfig,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct DnsConfig {
    pub(crate) dns_timeout: Option<u64>,
    pub(crate) dns_servers: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct SmtpConfig {
    pub(crate) smtp_timeout: Option<u64>,
    pub(crate) smtp_port: Option<u16>,
    pub(crate) smtp_sender: Option<String>,
    pub(crate) helo_domain: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct CacheConfig {
    pub(crate) cache_ttl: Option<u64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct RateLimitConfig {
    pub(crate) max_requests: Option<usize>,
    pub(crate) window: Option<u64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct BatchConfig {
    pub(crate) batch_size: Option<usize>,
    pub(crate) max_concurrency: Option<usize>,
    pub(crate) inter_batch_delay_ms: Option<u64>,
    pub(crate) retry_attempts: Option<u32>,
    pub(crate) retry_backoff_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_file() {
        let raw = r#"
            [smtp]
            smtp_timeout = 5
            smtp_sender = "probe@test.example"

            [rate_limit]
            max_requests = 5
            window = 30
        "#;
        let file: ConfigFile = toml::from_str(raw).expect("valid config");
        assert_eq!(file.smtp.smtp_timeout, Some(5));
        assert_eq!(file.smtp.smtp_sender.as_deref(), Some("probe@test.example"));
        assert_eq!(file.rate_limit.max_requests, Some(5));
        assert_eq!(file.rate_limit.window, Some(30));
        assert!(file.batch.batch_size.is_none());
    }

    #[test]
    fn rejects_unknown_fields() {
        let raw = r#"
            [smtp]
            smtp_timeout = 5
            not_a_real_key = true
        "#;
        assert!(toml::from_str::<ConfigFile>(raw).is_err());
    }
}
