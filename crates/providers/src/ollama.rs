//! Ollama adapter — local models behind the `/api/generate` endpoint.
//!
//! The tail of the default chain is several of these, one per local model,
//! so a machine with Ollama running still answers when every hosted backend
//! is down.

use async_trait::async_trait;
use cascata_core::error::ProviderError;
use cascata_core::memory::MemoryEntry;
use cascata_core::provider::Provider;
use serde::Deserialize;
use tracing::debug;

const DEFAULT_URL: &str = "http://localhost:11434/api/generate";

pub struct OllamaProvider {
    name: String,
    url: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            name: format!("ollama:{model}"),
            url: DEFAULT_URL.into(),
            model,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(
        &self,
        prompt: &str,
        _context: &[MemoryEntry],
    ) -> std::result::Result<String, ProviderError> {
        let body = serde_json::json!({
            "model": self.model,
            "prompt": format!("Responda de forma clara e em português brasileiro:\n{prompt}"),
            "stream": false,
        });

        debug!(provider = %self.name, "Sending generate request");

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 404 {
            return Err(ProviderError::NotConfigured(format!(
                "Model '{}' not available locally",
                self.model
            )));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::BadResponse(format!("Failed to parse response: {e}")))?;

        if generated.response.is_empty() {
            return Err(ProviderError::BadResponse("Empty response from model".into()));
        }

        Ok(generated.response)
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        // The generate endpoint lives under /api; the root answers when the
        // daemon is up.
        let base = self.url.trim_end_matches("/api/generate");
        let response = self
            .client
            .get(base)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}
