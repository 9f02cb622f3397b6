//! Core data types shared across the verification pipeline.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pattern accepted as a plausible email address: something that is not
/// whitespace or `@`, an `@`, a domain part containing at least one dot.
/// Anything failing this never reaches the network.
static ADDRESS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
        .expect("Address regex pattern failed to compile. This is a bug.")
});

/// Returns true if `candidate` has the rough shape of an email address.
pub fn looks_like_address(candidate: &str) -> bool {
    ADDRESS_REGEX.is_match(candidate)
}

/// Extracts the domain part of an address, if it has one.
pub fn domain_of(address: &str) -> Option<&str> {
    address.split('@').nth(1).filter(|d| !d.is_empty())
}

/// A mail exchange host for a domain, as discovered via DNS.
///
/// Within one resolution, records are consumed in ascending `priority`
/// order (lower is preferred, ties keep discovery order).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailExchange {
    pub host: String,
    pub priority: u16,
}

/// The closed set of terminal states a verification can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// The candidate does not look like an email address; no network access.
    InvalidFormat,
    /// The domain has no mail exchange records.
    NoMxRecord,
    /// No mail exchange host could be reached.
    ConnectionFailed,
    /// A server answered the connection with something other than 220.
    ConnectionRejected,
    /// Both EHLO and the HELO fallback were rejected.
    HandshakeFailed,
    /// The server rejected our MAIL FROM sender.
    MailFromRejected,
    /// RCPT TO was accepted; the address is deliverable.
    Valid,
    /// RCPT TO was permanently rejected (5xx).
    Invalid,
    /// RCPT TO failed transiently (4xx); eligible for retry.
    TemporaryFailure,
    /// The server replied with a code outside the expected ranges.
    UnknownResponse,
    /// The per-domain request budget was exhausted.
    RateLimited,
    /// An unexpected internal failure, converted into an outcome.
    Error,
    /// A whole batch failed irrecoverably; substituted for its members.
    BatchError,
}

impl VerificationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidFormat => "invalid_format",
            Self::NoMxRecord => "no_mx_record",
            Self::ConnectionFailed => "connection_failed",
            Self::ConnectionRejected => "connection_rejected",
            Self::HandshakeFailed => "handshake_failed",
            Self::MailFromRejected => "mail_from_rejected",
            Self::Valid => "valid",
            Self::Invalid => "invalid",
            Self::TemporaryFailure => "temporary_failure",
            Self::UnknownResponse => "unknown_response",
            Self::RateLimited => "rate_limited",
            Self::Error => "error",
            Self::BatchError => "batch_error",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of verifying a single address. Immutable once produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationOutcome {
    pub email: String,
    pub is_valid: bool,
    pub status: VerificationStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smtp_response: Option<String>,
    pub from_cache: bool,
    pub checked_at: DateTime<Utc>,
}

impl VerificationOutcome {
    pub fn new(
        email: impl Into<String>,
        status: VerificationStatus,
        message: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            is_valid: status == VerificationStatus::Valid,
            status,
            message: message.into(),
            smtp_response: None,
            from_cache: false,
            checked_at: Utc::now(),
        }
    }

    /// Attaches the raw server reply line that produced this outcome.
    pub fn with_response(mut self, line: impl Into<String>) -> Self {
        self.smtp_response = Some(line.into());
        self
    }

    /// A copy of this outcome marked as served from the cache.
    pub(crate) fn as_cached(&self) -> Self {
        let mut copy = self.clone();
        copy.from_cache = true;
        copy
    }
}
