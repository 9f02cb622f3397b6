//! Defines the custom error types for the mailprobe application.

use std::io;
use std::time::Duration;
use thiserror::Error;
use trust_dns_resolver::error::ResolveError;

/// The primary error type for the verification process.
#[derive(Error, Debug)]
pub enum AppError {
    /// Error occurring during configuration loading or validation.
    #[error("Configuration Error: {0}")]
    Config(String),

    /// Error initializing necessary components (e.g., the DNS resolver).
    #[error("Initialization Error: {0}")]
    Initialization(String),

    /// Error related to file input/output operations.
    #[error("IO Error: {0}")]
    Io(#[from] io::Error),

    /// Error during JSON serialization or deserialization.
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error reading or writing CSV data.
    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),

    /// Error during DNS resolver construction.
    #[error("DNS Resolution Error: {0}")]
    Dns(#[from] ResolveError),

    /// An SMTP probe session exceeded its deadline.
    #[error("SMTP session timed out after {0:?}")]
    SmtpTimeout(Duration),

    /// The mail server closed the connection before the probe finished.
    #[error("Connection to {0} closed unexpectedly")]
    ConnectionClosed(String),

    /// Error related to concurrency or task execution.
    #[error("Task Execution Error: {0}")]
    Task(String),

    /// An underlying error that doesn't fit other categories, using anyhow.
    #[error("Generic Error: {0}")]
    Generic(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
