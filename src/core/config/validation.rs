//! Sanity checks applied to a fully-assembled runtime configuration.

use super::Config;
use crate::core::error::{AppError, Result};
use crate::core::models::looks_like_address;

pub(crate) fn validate(config: &Config) -> Result<()> {
    if config.smtp_sender.trim().is_empty() || !looks_like_address(&config.smtp_sender) {
        return Err(AppError::Config(format!(
            "smtp_sender '{}' is not a usable MAIL FROM address",
            config.smtp_sender
        )));
    }
    if config.helo_domain.trim().is_empty() {
        return Err(AppError::Config(
            "helo_domain must not be empty".to_string(),
        ));
    }
    if config.smtp_timeout.is_zero() {
        return Err(AppError::Config(
            "smtp_timeout must be greater than zero".to_string(),
        ));
    }
    if config.batch_size == 0 {
        return Err(AppError::Config(
            "batch_size must be at least 1".to_string(),
        ));
    }
    if config.max_concurrency == 0 {
        return Err(AppError::Config(
            "max_concurrency must be at least 1".to_string(),
        ));
    }
    if config.rate_limit_max == 0 {
        return Err(AppError::Config(
            "rate_limit max_requests must be at least 1".to_string(),
        ));
    }
    if config.rate_limit_window.is_zero() {
        return Err(AppError::Config(
            "rate_limit window must be greater than zero".to_string(),
        ));
    }
    Ok(())
}
