//! Fans a list of addresses through the cache / rate-limiter / orchestrator
//! pipeline in bounded-concurrency groups and batches, with bounded
//! retry-with-backoff for transient failures.

use crate::core::config::Config;
use crate::core::models::{domain_of, VerificationOutcome, VerificationStatus};
use crate::core::verifier::Verifier;
use crate::verification::cache::ResultCache;
use crate::verification::rate_limit::RateLimiter;
use futures::future::join_all;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// Fixed pause between concurrency groups within a batch; the pause
/// between batches is the configured `inter_batch_delay`.
const GROUP_DELAY: Duration = Duration::from_millis(500);

/// Composed pipeline: a cache, a rate limiter, and an orchestrator, each
/// independently constructible, driven over batches of addresses.
///
/// The emitted sequence always matches the input order: group results are
/// appended in group-then-position order, never completion order.
pub struct BatchVerifier {
    config: Arc<Config>,
    verifier: Arc<Verifier>,
    cache: Arc<ResultCache>,
    limiter: Arc<RateLimiter>,
}

impl BatchVerifier {
    /// Builds the pipeline with a cache and rate limiter sized from `config`.
    pub fn new(config: Arc<Config>, verifier: Arc<Verifier>) -> Self {
        let cache = Arc::new(ResultCache::new(config.cache_ttl));
        let limiter = Arc::new(RateLimiter::new(
            config.rate_limit_max,
            config.rate_limit_window,
        ));
        Self::with_parts(config, verifier, cache, limiter)
    }

    /// Builds the pipeline from pre-constructed parts, e.g. to share a
    /// cache between runs.
    pub fn with_parts(
        config: Arc<Config>,
        verifier: Arc<Verifier>,
        cache: Arc<ResultCache>,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            config,
            verifier,
            cache,
            limiter,
        }
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Verifies every address, returning one outcome per input in input
    /// order. The run itself never fails: individual faults become
    /// `error` outcomes and a batch-wide fault becomes `batch_error` for
    /// each member of that batch.
    pub async fn run(&self, addresses: &[String]) -> Vec<VerificationOutcome> {
        self.run_with_progress(addresses, |_| {}).await
    }

    /// Like [`run`](Self::run), invoking `progress` once per settled outcome.
    pub async fn run_with_progress<F>(
        &self,
        addresses: &[String],
        progress: F,
    ) -> Vec<VerificationOutcome>
    where
        F: Fn(&VerificationOutcome) + Send + Sync,
    {
        let batch_size = self.config.batch_size.max(1);
        let batch_count = addresses.len().div_ceil(batch_size);
        let mut results = Vec::with_capacity(addresses.len());

        for (index, batch) in addresses.chunks(batch_size).enumerate() {
            tracing::info!(target: "batch_task",
                "Processing batch {}/{} ({} address(es))", index + 1, batch_count, batch.len());

            match AssertUnwindSafe(self.process_batch(batch, &progress))
                .catch_unwind()
                .await
            {
                Ok(outcomes) => results.extend(outcomes),
                Err(_) => {
                    tracing::error!(target: "batch_task",
                        "Batch {} aborted; substituting batch_error for {} address(es)",
                        index + 1, batch.len());
                    for address in batch {
                        let outcome = VerificationOutcome::new(
                            address.trim(),
                            VerificationStatus::BatchError,
                            "Batch processing aborted unexpectedly",
                        );
                        progress(&outcome);
                        results.push(outcome);
                    }
                }
            }

            if index + 1 < batch_count {
                sleep(self.config.inter_batch_delay).await;
            }
        }

        results
    }

    async fn process_batch<F>(&self, batch: &[String], progress: &F) -> Vec<VerificationOutcome>
    where
        F: Fn(&VerificationOutcome) + Send + Sync,
    {
        let concurrency = self.config.max_concurrency.max(1);
        let group_count = batch.len().div_ceil(concurrency);
        let mut outcomes = Vec::with_capacity(batch.len());

        for (index, group) in batch.chunks(concurrency).enumerate() {
            let settled = join_all(group.iter().map(|address| self.verify_one(address))).await;
            for outcome in settled {
                progress(&outcome);
                outcomes.push(outcome);
            }
            if index + 1 < group_count {
                sleep(GROUP_DELAY).await;
            }
        }

        outcomes
    }

    /// The per-address pipeline: cache, admission, orchestrator, retry.
    async fn verify_one(&self, address: &str) -> VerificationOutcome {
        let address = address.trim();

        if let Some(hit) = self.cache.get(address) {
            tracing::debug!(target: "batch_task", "Cache hit for <{}> ({})", address, hit.status);
            return hit;
        }

        // Addresses without a domain part never reach the network, so they
        // bypass admission control and fail the format check downstream.
        let domain = domain_of(address);

        let mut last_outcome: Option<VerificationOutcome> = None;

        for attempt in 0..=self.config.retry_attempts {
            if let Some(domain) = domain {
                if !self.limiter.try_acquire(domain) {
                    tracing::debug!(target: "batch_task",
                        "Rate limit reached for {} while checking <{}>", domain, address);
                    return VerificationOutcome::new(
                        address,
                        VerificationStatus::RateLimited,
                        format!("Rate limit reached for domain {domain}"),
                    );
                }
            }

            match self.verifier.verify(address).await {
                Ok(outcome) => {
                    if !self.cache.contains(address) {
                        self.cache.put(address, &outcome);
                    }
                    if outcome.status == VerificationStatus::TemporaryFailure
                        && attempt < self.config.retry_attempts
                    {
                        let delay = self.status_backoff(attempt);
                        tracing::debug!(target: "batch_task",
                            "Temporary failure for <{}>; retry {}/{} in {:?}",
                            address, attempt + 1, self.config.retry_attempts, delay);
                        last_outcome = Some(outcome);
                        sleep(delay).await;
                        continue;
                    }
                    return outcome;
                }
                Err(e) => {
                    tracing::warn!(target: "batch_task",
                        "Verification attempt {} for <{}> failed: {}", attempt + 1, address, e);
                    if attempt < self.config.retry_attempts {
                        let delay = self.error_backoff(attempt);
                        sleep(delay).await;
                        continue;
                    }
                    // Budget exhausted on a hard failure: fall back to the
                    // last observed outcome, else surface the error itself.
                    return last_outcome.unwrap_or_else(|| {
                        VerificationOutcome::new(
                            address,
                            VerificationStatus::Error,
                            format!("Verification failed: {e}"),
                        )
                    });
                }
            }
        }

        // The loop always returns from its final iteration; this fallback
        // keeps the signature total without a panic.
        last_outcome.unwrap_or_else(|| {
            VerificationOutcome::new(
                address,
                VerificationStatus::Error,
                "Retry budget exhausted without an outcome",
            )
        })
    }

    /// Backoff after a transient SMTP verdict: doubles each attempt.
    fn status_backoff(&self, attempt: u32) -> Duration {
        self.config.retry_backoff * 2u32.saturating_pow(attempt)
    }

    /// Backoff after an outright failure: grows linearly on a 1.5x base.
    /// The two scales are intentionally different, matching the behavior
    /// this tool replaces.
    fn error_backoff(&self, attempt: u32) -> Duration {
        (self.config.retry_backoff * 3 * (attempt + 1)) / 2
    }
}
