//! Resource management around the orchestrator: result caching, per-domain
//! admission control, and the batched scheduler.

pub mod cache;
pub mod rate_limit;
pub mod scheduler;

pub use cache::ResultCache;
pub use rate_limit::RateLimiter;
pub use scheduler::BatchVerifier;
