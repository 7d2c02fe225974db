//! The fallback chain — ordered provider attempts with per-attempt timeouts.
//!
//! Providers are tried strictly sequentially in configured order; the first
//! success wins and remaining providers are never touched. A timed-out
//! attempt counts as a failure like any other, and its abandoned future is
//! dropped on the spot — it can never deliver a late answer. Only full
//! exhaustion escalates to the caller, carrying the per-provider attempt
//! log.

use std::sync::Arc;
use std::time::Duration;

use cascata_config::AppConfig;
use cascata_core::error::{OrchestrateError, ProviderError};
use cascata_core::memory::MemoryEntry;
use cascata_core::provider::Provider;
use tracing::{info, warn};

/// The answer the chain produced, tagged with who produced it.
#[derive(Debug, Clone)]
pub struct ChainAnswer {
    pub text: String,
    pub provider: String,
}

/// A single position in the chain.
struct ChainEntry {
    provider: Arc<dyn Provider>,
    timeout: Duration,
}

/// An ordered list of interchangeable backends tried until one succeeds.
pub struct FallbackChain {
    entries: Vec<ChainEntry>,
}

impl FallbackChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a provider with its per-attempt timeout.
    pub fn add(mut self, provider: Arc<dyn Provider>, timeout: Duration) -> Self {
        self.entries.push(ChainEntry { provider, timeout });
        self
    }

    /// Number of providers in the chain.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Provider names in attempt order.
    pub fn provider_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.provider.name()).collect()
    }

    /// Try every provider in order until one answers.
    ///
    /// Each attempt either completes or times out before the next begins —
    /// never in parallel, and never reordered by observed latency.
    pub async fn complete(
        &self,
        prompt: &str,
        context: &[MemoryEntry],
    ) -> std::result::Result<ChainAnswer, OrchestrateError> {
        let mut attempts: Vec<(String, ProviderError)> = Vec::new();

        for (i, entry) in self.entries.iter().enumerate() {
            let provider_name = entry.provider.name().to_string();

            info!(
                provider = %provider_name,
                attempt = i + 1,
                total = self.entries.len(),
                "Chain: trying provider"
            );

            match tokio::time::timeout(entry.timeout, entry.provider.invoke(prompt, context)).await
            {
                Ok(Ok(text)) => {
                    info!(provider = %provider_name, "Chain: provider answered");
                    return Ok(ChainAnswer {
                        text,
                        provider: provider_name,
                    });
                }
                Ok(Err(e)) => {
                    warn!(
                        provider = %provider_name,
                        error = %e,
                        "Chain: provider failed, trying next"
                    );
                    attempts.push((provider_name, e));
                }
                Err(_) => {
                    warn!(
                        provider = %provider_name,
                        timeout_secs = entry.timeout.as_secs(),
                        "Chain: provider timed out, trying next"
                    );
                    let err = ProviderError::Timeout(format!(
                        "Provider '{}' timed out after {:?}",
                        provider_name, entry.timeout
                    ));
                    attempts.push((provider_name, err));
                }
            }
        }

        Err(OrchestrateError::AllProvidersFailed { attempts })
    }
}

impl Default for FallbackChain {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the chain from configuration. Order in the config file is attempt
/// order; nothing is reordered at runtime.
pub fn build_from_config(config: &AppConfig) -> FallbackChain {
    let mut chain = FallbackChain::new();

    for entry in &config.chain {
        let timeout = Duration::from_secs(entry.timeout_secs);

        let provider: Arc<dyn Provider> = match entry.name.as_str() {
            "openrouter" => {
                let api_key = config.openrouter_api_key.clone().unwrap_or_default();
                let model = entry
                    .model
                    .clone()
                    .unwrap_or_else(|| "mistralai/mixtral-8x7b-instruct".into());
                let mut p = crate::OpenRouterProvider::new(api_key, model);
                if let Some(url) = &entry.api_url {
                    p = p.with_base_url(url);
                }
                Arc::new(p)
            }
            "huggingface" => {
                let api_key = config.huggingface_api_key.clone().unwrap_or_default();
                let mut p = crate::HuggingFaceProvider::new(api_key);
                if let Some(url) = &entry.api_url {
                    p = p.with_url(url);
                }
                Arc::new(p)
            }
            "ollama" => {
                let model = entry.model.clone().unwrap_or_else(|| "llama3".into());
                let mut p = crate::OllamaProvider::new(model);
                if let Some(url) = &entry.api_url {
                    p = p.with_url(url);
                }
                Arc::new(p)
            }
            other => {
                // Config validation rejects unknown kinds; skip defensively
                // if one slips through an unvalidated config.
                warn!(kind = %other, "Skipping unknown chain backend kind");
                continue;
            }
        };

        chain = chain.add(provider, timeout);
    }

    chain
}
