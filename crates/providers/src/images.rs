//! Specialized image backends — one adapter per capability, no chain.
//!
//! Generation posts the prompt to a diffusion endpoint and writes the
//! returned bytes to disk; reading posts decoded image bytes to a
//! captioning endpoint. Failures on these paths surface immediately — the
//! orchestrator never retries them against the general chain.

use std::path::PathBuf;

use async_trait::async_trait;
use base64::Engine;
use cascata_core::error::ProviderError;
use cascata_core::provider::{ImageGenerator, ImageReader};
use serde::Deserialize;
use tracing::{debug, info};

use cascata_config::AppConfig;

/// Stable-diffusion image generation over the Hugging Face inference API.
pub struct StableDiffusionGenerator {
    url: String,
    api_key: String,
    output_dir: PathBuf,
    client: reqwest::Client,
}

impl StableDiffusionGenerator {
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            output_dir: output_dir.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ImageGenerator for StableDiffusionGenerator {
    fn name(&self) -> &str {
        "stable-diffusion"
    }

    async fn generate(&self, prompt: &str) -> std::result::Result<String, ProviderError> {
        let body = serde_json::json!({ "inputs": prompt });

        debug!(provider = "stable-diffusion", "Sending generation request");

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
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::BadResponse(e.to_string()))?;

        if bytes.is_empty() {
            return Err(ProviderError::BadResponse("Empty image payload".into()));
        }

        let filename = format!("generated_{}.png", chrono::Utc::now().timestamp_millis());
        let path = self.output_dir.join(filename);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| ProviderError::Io(format!("Failed to write {}: {e}", path.display())))?;

        info!(path = %path.display(), "Image generated");
        Ok(format!("Imagem gerada: {}", path.display()))
    }
}

/// BLIP image captioning over the Hugging Face inference API.
pub struct BlipCaptioner {
    url: String,
    api_key: String,
    client: reqwest::Client,
}

impl BlipCaptioner {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ImageReader for BlipCaptioner {
    fn name(&self) -> &str {
        "blip-captioning"
    }

    async fn describe(&self, image_base64: &str) -> std::result::Result<String, ProviderError> {
        let cleaned = strip_data_url_prefix(image_base64);
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(cleaned.trim())
            .map_err(|e| ProviderError::BadResponse(format!("Invalid base64 payload: {e}")))?;

        debug!(provider = "blip-captioning", bytes = bytes.len(), "Sending caption request");

        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "image/jpeg")
            .body(bytes)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let captions: Vec<Caption> = response
            .json()
            .await
            .map_err(|e| ProviderError::BadResponse(format!("Failed to parse response: {e}")))?;

        captions
            .into_iter()
            .next()
            .and_then(|c| c.generated_text)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| ProviderError::BadResponse("No caption in response".into()))
    }
}

/// Drop a leading `data:image/...;base64,` marker if present.
fn strip_data_url_prefix(payload: &str) -> &str {
    match payload.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:image/") => rest,
        _ => payload,
    }
}

#[derive(Debug, Deserialize)]
struct Caption {
    #[serde(default)]
    generated_text: Option<String>,
}

/// Build both image adapters from configuration.
pub fn build_image_adapters(
    config: &AppConfig,
) -> (StableDiffusionGenerator, BlipCaptioner) {
    let api_key = config.huggingface_api_key.clone().unwrap_or_default();

    let generator = StableDiffusionGenerator::new(
        &config.images.generation_url,
        &api_key,
        &config.images.output_dir,
    );
    let captioner = BlipCaptioner::new(&config.images.caption_url, &api_key);

    (generator, captioner)
}
