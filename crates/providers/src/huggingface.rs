//! Hugging Face text-inference adapter.
//!
//! Talks to the serverless inference API (`{"inputs": ...}` in,
//! `[{"generated_text": ...}]` out). Sits second in the default chain as the
//! free fallback when the router fails.

use async_trait::async_trait;
use cascata_core::error::ProviderError;
use cascata_core::memory::MemoryEntry;
use cascata_core::provider::Provider;
use serde::Deserialize;
use tracing::debug;

const DEFAULT_MODEL_URL: &str = "https://api-inference.huggingface.co/models/bigscience/bloom";

pub struct HuggingFaceProvider {
    name: String,
    url: String,
    api_key: String,
    client: reqwest::Client,
}

impl HuggingFaceProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            name: "huggingface".into(),
            url: DEFAULT_MODEL_URL.into(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

#[async_trait]
impl Provider for HuggingFaceProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(
        &self,
        prompt: &str,
        _context: &[MemoryEntry],
    ) -> std::result::Result<String, ProviderError> {
        let body = serde_json::json!({
            "inputs": format!("Responda de forma clara e completa: {prompt}"),
        });

        debug!(provider = %self.name, "Sending inference request");

        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(ProviderError::RateLimited {
                retry_after_secs: 5,
            });
        }

        if status == 401 || status == 403 {
            return Err(ProviderError::AuthenticationFailed(
                "Invalid API key".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let generations: Vec<Generation> = response
            .json()
            .await
            .map_err(|e| ProviderError::BadResponse(format!("Failed to parse response: {e}")))?;

        generations
            .into_iter()
            .next()
            .and_then(|g| g.generated_text)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| ProviderError::BadResponse("No generated text in response".into()))
    }
}

#[derive(Debug, Deserialize)]
struct Generation {
    #[serde(default)]
    generated_text: Option<String>,
}
