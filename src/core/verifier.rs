//! The verification orchestrator: syntax check, MX resolution, and
//! failover across mail-exchange hosts.

use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::models::{
    domain_of, looks_like_address, VerificationOutcome, VerificationStatus,
};
use crate::utils::dns::{MxLookup, MxResolver};
use crate::utils::smtp::probe_host;
use std::sync::Arc;

/// Drives a single address through validation, resolution and probing.
pub struct Verifier {
    config: Arc<Config>,
    resolver: Arc<dyn MxLookup>,
}

impl Verifier {
    /// Creates a verifier with the production DNS resolver.
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let resolver = MxResolver::from_config(&config)?;
        Ok(Self::with_resolver(config, Arc::new(resolver)))
    }

    /// Creates a verifier with an injected resolver.
    pub fn with_resolver(config: Arc<Config>, resolver: Arc<dyn MxLookup>) -> Self {
        Self { config, resolver }
    }

    /// Produces exactly one outcome for `address`.
    ///
    /// Hosts are attempted in ascending priority order; the first host that
    /// carries the conversation to a protocol verdict supplies the final
    /// outcome. Per-host transport failures are logged and swallowed —
    /// failover, not failure, is the default. An `Err` from this method
    /// signals an unexpected internal fault, which the scheduler converts
    /// into an `error` outcome.
    pub async fn verify(&self, address: &str) -> Result<VerificationOutcome> {
        let address = address.trim();
        if !looks_like_address(address) {
            tracing::debug!(target: "verify_task", "<{}> failed the format check", address);
            return Ok(VerificationOutcome::new(
                address,
                VerificationStatus::InvalidFormat,
                "Candidate does not look like an email address",
            ));
        }

        // The format check guarantees exactly one '@' with a non-empty tail.
        let domain = domain_of(address).unwrap_or_default();

        let records = self.resolver.lookup_mx(domain).await;
        if records.is_empty() {
            return Ok(VerificationOutcome::new(
                address,
                VerificationStatus::NoMxRecord,
                format!("No mail exchange records found for {domain}"),
            ));
        }

        for record in &records {
            tracing::debug!(target: "verify_task",
                "Probing {} (priority {}) for <{}>", record.host, record.priority, address);
            match probe_host(address, &record.host, &self.config).await {
                Ok(outcome) => return Ok(outcome),
                Err(e) => {
                    tracing::warn!(target: "verify_task",
                        "Probe of {} for <{}> failed, trying next host: {}",
                        record.host, address, e);
                }
            }
        }

        Ok(VerificationOutcome::new(
            address,
            VerificationStatus::ConnectionFailed,
            format!(
                "All {} mail exchange host(s) for {} were unreachable",
                records.len(),
                domain
            ),
        ))
    }
}
