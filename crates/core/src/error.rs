//! Error types for the Cascata domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Cascata operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Orchestration errors ---
    #[error("Orchestration error: {0}")]
    Orchestrate(#[from] OrchestrateError),

    // --- Channel errors ---
    #[error("Channel error: {0}")]
    Channel(#[from] crate::channel::ChannelError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// A failure from a single answering backend. All variants are recoverable
/// inside the fallback loop: the orchestrator advances to the next provider.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Malformed provider response: {0}")]
    BadResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("I/O error: {0}")]
    Io(String),
}

/// A failure on one of the specialized image paths. These have no fallback:
/// the error surfaces to the caller immediately, distinct from chain
/// exhaustion.
#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("Image generation failed: {0}")]
    Generation(ProviderError),

    #[error("Image reading failed: {0}")]
    Reading(ProviderError),

    #[error("No image payload provided for reading")]
    MissingImage,
}

/// Terminal orchestration failures — the only errors `resolve` ever returns.
#[derive(Debug, Error)]
pub enum OrchestrateError {
    /// Every provider in the chain failed. Carries the per-provider attempt
    /// log for operability; end users only ever see a generic message.
    #[error("All {} providers in the chain failed", attempts.len())]
    AllProvidersFailed { attempts: Vec<(String, ProviderError)> },

    #[error(transparent)]
    Capability(#[from] CapabilityError),
}
