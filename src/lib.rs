//! mailprobe — checks whether email addresses are deliverable by talking
//! to their mail-exchange hosts over the raw SMTP wire protocol, without
//! ever sending mail.
//!
//! The crate is organized as a composed pipeline: a [`Verifier`] resolves
//! MX records and drives one probe session per host, while a
//! [`BatchVerifier`] wraps it with a TTL [`ResultCache`], a per-domain
//! sliding-window [`RateLimiter`], and batched, bounded-concurrency
//! scheduling with retry-and-backoff. Each piece is independently
//! constructible for embedding and testing.
//!
//! Mail servers may greylist, lie, or block probing, so a `valid` outcome
//! is strong evidence, not proof, of deliverability.

pub mod core;
pub mod io;
pub mod utils;
pub mod verification;

pub use crate::core::config::{Config, ConfigBuilder, ConfigFile};
pub use crate::core::error::{AppError, Result};
pub use crate::core::models::{MailExchange, VerificationOutcome, VerificationStatus};
pub use crate::core::verifier::Verifier;
pub use crate::utils::dns::{MxLookup, MxResolver};
pub use crate::verification::{BatchVerifier, RateLimiter, ResultCache};
