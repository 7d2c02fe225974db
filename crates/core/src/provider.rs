//! Provider traits — the abstraction over AI answering backends.
//!
//! A `Provider` turns a text prompt into a text answer. The orchestrator
//! calls `invoke()` without knowing which backend is behind it, and treats
//! every failure uniformly by moving on to the next provider in the chain.
//!
//! Implementations: OpenRouter, Hugging Face inference, Ollama local models.

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::memory::MemoryEntry;

/// A general-purpose answering backend.
///
/// `context` carries the caller's recent exchanges so the backend can be
/// made conversational without changing this contract; adapters MAY ignore
/// it.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name (e.g. "openrouter", "ollama:llama3").
    fn name(&self) -> &str;

    /// Send a prompt and get back the answer text.
    async fn invoke(
        &self,
        prompt: &str,
        context: &[MemoryEntry],
    ) -> std::result::Result<String, ProviderError>;

    /// Health check — can we reach the provider?
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}

/// A specialized image-generation backend. Exactly one per deployment — the
/// image paths have no fallback chain.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    fn name(&self) -> &str;

    /// Generate an image from a text prompt, returning a user-facing
    /// description of where the result landed.
    async fn generate(&self, prompt: &str) -> std::result::Result<String, ProviderError>;
}

/// A specialized image-captioning backend.
#[async_trait]
pub trait ImageReader: Send + Sync {
    fn name(&self) -> &str;

    /// Caption a base64-encoded image payload.
    async fn describe(&self, image_base64: &str) -> std::result::Result<String, ProviderError>;
}
