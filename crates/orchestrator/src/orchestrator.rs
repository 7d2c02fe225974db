//! The fallback orchestrator — classify, branch, cascade, remember.
//!
//! `resolve` is the single entry point for a classified prompt. Arithmetic
//! is answered locally; image intents dispatch to their dedicated adapter
//! with no fallback; everything else walks the provider chain. The memory
//! store is written only on the winning path, so an abandoned (timed-out)
//! attempt can never leave a stale result behind.

use std::sync::Arc;
use std::time::Duration;

use cascata_config::AppConfig;
use cascata_core::error::{CapabilityError, OrchestrateError, ProviderError};
use cascata_core::intent::{classify, Intent};
use cascata_core::message::{Outcome, UserId};
use cascata_core::provider::{ImageGenerator, ImageReader};
use cascata_memory::EphemeralMemory;
use cascata_providers::{build_from_config, build_image_adapters, FallbackChain};
use tracing::{debug, error, info};

use crate::eval;
use crate::texts;

/// Prefix prepended to prompts classified as Technical before they reach
/// the general chain.
const TECHNICAL_REWRITE: &str = "Explique de forma clara e detalhada: ";

pub struct Orchestrator {
    chain: FallbackChain,
    memory: Arc<EphemeralMemory>,
    image_generator: Arc<dyn ImageGenerator>,
    image_reader: Arc<dyn ImageReader>,
    generation_timeout: Duration,
    reading_timeout: Duration,
}

impl Orchestrator {
    pub fn new(
        chain: FallbackChain,
        memory: Arc<EphemeralMemory>,
        image_generator: Arc<dyn ImageGenerator>,
        image_reader: Arc<dyn ImageReader>,
    ) -> Self {
        Self {
            chain,
            memory,
            image_generator,
            image_reader,
            generation_timeout: Duration::from_secs(10),
            reading_timeout: Duration::from_secs(5),
        }
    }

    /// Override the image-path timeouts.
    pub fn with_image_timeouts(mut self, generation: Duration, reading: Duration) -> Self {
        self.generation_timeout = generation;
        self.reading_timeout = reading;
        self
    }

    /// Wire everything from static configuration.
    pub fn from_config(config: &AppConfig, memory: Arc<EphemeralMemory>) -> Self {
        let chain = build_from_config(config);
        let (generator, captioner) = build_image_adapters(config);

        Self::new(chain, memory, Arc::new(generator), Arc::new(captioner)).with_image_timeouts(
            Duration::from_secs(config.images.generation_timeout_secs),
            Duration::from_secs(config.images.caption_timeout_secs),
        )
    }

    /// Resolve one prompt for one user. Fails only when every path for the
    /// chosen intent is exhausted.
    pub async fn resolve(
        &self,
        prompt: &str,
        user: &UserId,
    ) -> std::result::Result<Outcome, OrchestrateError> {
        let intent = classify(prompt);
        debug!(user = %user, ?intent, "Prompt classified");

        match intent {
            Intent::Arithmetic => Ok(self.resolve_arithmetic(prompt, user).await),
            Intent::ImageGeneration => self.resolve_image_generation(prompt, user).await,
            Intent::ImageReading => self.resolve_image_reading(prompt, user).await,
            Intent::Technical | Intent::General => {
                self.resolve_general(prompt, user, intent == Intent::Technical)
                    .await
            }
        }
    }

    /// Arithmetic is terminal: evaluation failure becomes a fixed friendly
    /// response, never a retry against the chain.
    async fn resolve_arithmetic(&self, prompt: &str, user: &UserId) -> Outcome {
        let response = match eval::evaluate_display(prompt.trim()) {
            Ok(value) => value,
            Err(reason) => {
                debug!(user = %user, %reason, "Expression did not evaluate");
                texts::INVALID_EXPRESSION.to_string()
            }
        };

        self.memory.record(user, prompt, &response).await;
        Outcome::tagged(response, "math", true)
    }

    /// One dedicated backend, no fallback: failure surfaces immediately as
    /// a capability error, distinct from chain exhaustion.
    async fn resolve_image_generation(
        &self,
        prompt: &str,
        user: &UserId,
    ) -> std::result::Result<Outcome, OrchestrateError> {
        let attempt = tokio::time::timeout(
            self.generation_timeout,
            self.image_generator.generate(prompt),
        )
        .await;

        let text = flatten_timeout(attempt, self.image_generator.name(), self.generation_timeout)
            .map_err(CapabilityError::Generation)?;

        self.memory.record(user, prompt, &text).await;
        Ok(Outcome::tagged(text, "imageGeneration", true))
    }

    async fn resolve_image_reading(
        &self,
        prompt: &str,
        user: &UserId,
    ) -> std::result::Result<Outcome, OrchestrateError> {
        // Payload convention: "<trigger phrase>: <base64 image>"
        let payload = prompt
            .split_once(':')
            .map(|(_, rest)| rest.trim())
            .filter(|p| !p.is_empty())
            .ok_or(CapabilityError::MissingImage)?;

        let attempt =
            tokio::time::timeout(self.reading_timeout, self.image_reader.describe(payload)).await;

        let caption = flatten_timeout(attempt, self.image_reader.name(), self.reading_timeout)
            .map_err(CapabilityError::Reading)?;

        self.memory.record(user, prompt, &caption).await;
        Ok(Outcome::tagged(caption, "imageReading", true))
    }

    async fn resolve_general(
        &self,
        prompt: &str,
        user: &UserId,
        technical: bool,
    ) -> std::result::Result<Outcome, OrchestrateError> {
        let chain_prompt = if technical {
            format!("{TECHNICAL_REWRITE}{prompt}")
        } else {
            prompt.to_string()
        };

        let context = self.memory.recent(user).await;

        match self.chain.complete(&chain_prompt, &context).await {
            Ok(answer) => {
                info!(user = %user, provider = %answer.provider, "Request answered");
                // The memory keeps the prompt as the user sent it, not the
                // rewritten one.
                self.memory.record(user, prompt, &answer.text).await;
                Ok(Outcome::tagged(answer.text, "respondedModel", answer.provider))
            }
            Err(e) => {
                if let OrchestrateError::AllProvidersFailed { attempts } = &e {
                    error!(
                        user = %user,
                        attempts = attempts.len(),
                        "Chain exhausted, no provider could answer"
                    );
                }
                Err(e)
            }
        }
    }
}

/// Collapse a timeout race into a plain provider result.
fn flatten_timeout(
    attempt: Result<std::result::Result<String, ProviderError>, tokio::time::error::Elapsed>,
    name: &str,
    timeout: Duration,
) -> std::result::Result<String, ProviderError> {
    match attempt {
        Ok(result) => result,
        Err(_) => Err(ProviderError::Timeout(format!(
            "Adapter '{name}' timed out after {timeout:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cascata_core::memory::MemoryEntry;
    use cascata_core::provider::Provider;
    use std::sync::Mutex;

    /// Counts invocations and remembers the last prompt it saw.
    struct RecordingProvider {
        name: String,
        result: std::result::Result<String, ProviderError>,
        calls: Mutex<usize>,
        last_prompt: Mutex<Option<String>>,
    }

    impl RecordingProvider {
        fn succeeding(name: &str, answer: &str) -> Self {
            Self {
                name: name.into(),
                result: Ok(answer.into()),
                calls: Mutex::new(0),
                last_prompt: Mutex::new(None),
            }
        }

        fn failing(name: &str) -> Self {
            Self {
                name: name.into(),
                result: Err(ProviderError::Network("down".into())),
                calls: Mutex::new(0),
                last_prompt: Mutex::new(None),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }

        fn last_prompt(&self) -> Option<String> {
            self.last_prompt.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Provider for RecordingProvider {
        fn name(&self) -> &str {
            &self.name
        }

        async fn invoke(
            &self,
            prompt: &str,
            _context: &[MemoryEntry],
        ) -> std::result::Result<String, ProviderError> {
            *self.calls.lock().unwrap() += 1;
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            self.result.clone()
        }
    }

    struct StubGenerator {
        result: std::result::Result<String, ProviderError>,
        calls: Mutex<usize>,
    }

    impl StubGenerator {
        fn succeeding() -> Self {
            Self {
                result: Ok("Imagem gerada: ./generated_1.png".into()),
                calls: Mutex::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                result: Err(ProviderError::ApiError {
                    status_code: 503,
                    message: "model loading".into(),
                }),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl ImageGenerator for StubGenerator {
        fn name(&self) -> &str {
            "stub-generator"
        }

        async fn generate(&self, _prompt: &str) -> std::result::Result<String, ProviderError> {
            *self.calls.lock().unwrap() += 1;
            self.result.clone()
        }
    }

    struct StubReader {
        calls: Mutex<usize>,
    }

    impl StubReader {
        fn new() -> Self {
            Self {
                calls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl ImageReader for StubReader {
        fn name(&self) -> &str {
            "stub-reader"
        }

        async fn describe(&self, _image_base64: &str) -> std::result::Result<String, ProviderError> {
            *self.calls.lock().unwrap() += 1;
            Ok("um gato no sofá".into())
        }
    }

    struct Fixture {
        orchestrator: Orchestrator,
        memory: Arc<EphemeralMemory>,
        providers: Vec<Arc<RecordingProvider>>,
        generator: Arc<StubGenerator>,
        reader: Arc<StubReader>,
    }

    fn fixture(providers: Vec<RecordingProvider>, generator: StubGenerator) -> Fixture {
        let providers: Vec<Arc<RecordingProvider>> = providers.into_iter().map(Arc::new).collect();
        let mut chain = FallbackChain::new();
        for p in &providers {
            chain = chain.add(p.clone(), Duration::from_secs(5));
        }

        let memory = Arc::new(EphemeralMemory::default());
        let generator = Arc::new(generator);
        let reader = Arc::new(StubReader::new());

        let orchestrator = Orchestrator::new(
            chain,
            memory.clone(),
            generator.clone(),
            reader.clone(),
        );

        Fixture {
            orchestrator,
            memory,
            providers,
            generator,
            reader,
        }
    }

    fn user() -> UserId {
        UserId::new("tester")
    }

    #[tokio::test]
    async fn arithmetic_never_touches_providers() {
        let fx = fixture(
            vec![RecordingProvider::succeeding("A", "should not run")],
            StubGenerator::succeeding(),
        );

        let outcome = fx.orchestrator.resolve("2+2*3", &user()).await.unwrap();
        assert_eq!(outcome.final_response, "8");
        assert_eq!(outcome.metadata["math"], serde_json::json!(true));

        assert_eq!(fx.providers[0].calls(), 0);
        assert_eq!(fx.generator.calls(), 0);

        let entries = fx.memory.recent(&user()).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].prompt, "2+2*3");
        assert_eq!(entries[0].response, "8");
    }

    #[tokio::test]
    async fn invalid_expression_gets_the_fixed_reply() {
        let fx = fixture(
            vec![RecordingProvider::succeeding("A", "no")],
            StubGenerator::succeeding(),
        );

        let outcome = fx.orchestrator.resolve("+*-", &user()).await.unwrap();
        assert_eq!(outcome.final_response, texts::INVALID_EXPRESSION);
        assert_eq!(fx.providers[0].calls(), 0);

        // The fixed response is still an exchange worth remembering.
        let entries = fx.memory.recent(&user()).await;
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn deeply_nested_expression_gets_the_fixed_reply() {
        let fx = fixture(vec![], StubGenerator::succeeding());

        // Classified as arithmetic and rejected by the evaluator's depth
        // bound, like any other invalid expression.
        let expr = format!("{}1{}", "(".repeat(100_000), ")".repeat(100_000));
        let outcome = fx.orchestrator.resolve(&expr, &user()).await.unwrap();
        assert_eq!(outcome.final_response, texts::INVALID_EXPRESSION);
    }

    #[tokio::test]
    async fn fallback_order_and_responded_model_tag() {
        let fx = fixture(
            vec![
                RecordingProvider::failing("A"),
                RecordingProvider::succeeding("B", "resposta do B"),
                RecordingProvider::succeeding("C", "nunca"),
            ],
            StubGenerator::succeeding(),
        );

        let outcome = fx
            .orchestrator
            .resolve("qual a capital do Brasil?", &user())
            .await
            .unwrap();

        assert_eq!(outcome.final_response, "resposta do B");
        assert_eq!(outcome.responded_model(), Some("B"));

        assert_eq!(fx.providers[0].calls(), 1);
        assert_eq!(fx.providers[1].calls(), 1);
        assert_eq!(fx.providers[2].calls(), 0);

        let entries = fx.memory.recent(&user()).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].prompt, "qual a capital do Brasil?");
    }

    #[tokio::test]
    async fn exhaustion_leaves_no_trace_in_memory() {
        let fx = fixture(
            vec![
                RecordingProvider::failing("A"),
                RecordingProvider::failing("B"),
            ],
            StubGenerator::succeeding(),
        );

        let err = fx
            .orchestrator
            .resolve("uma pergunta qualquer", &user())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OrchestrateError::AllProvidersFailed { ref attempts } if attempts.len() == 2
        ));
        assert!(fx.memory.recent(&user()).await.is_empty());
    }

    #[tokio::test]
    async fn technical_prompts_are_rewritten_for_the_chain() {
        let fx = fixture(
            vec![RecordingProvider::succeeding("A", "explicação longa")],
            StubGenerator::succeeding(),
        );

        let prompt = "como funciona um programa?";
        fx.orchestrator.resolve(prompt, &user()).await.unwrap();

        let seen = fx.providers[0].last_prompt().unwrap();
        assert_eq!(seen, format!("{TECHNICAL_REWRITE}{prompt}"));

        // Memory keeps the original prompt.
        let entries = fx.memory.recent(&user()).await;
        assert_eq!(entries[0].prompt, prompt);
    }

    #[tokio::test]
    async fn general_prompts_are_not_rewritten() {
        let fx = fixture(
            vec![RecordingProvider::succeeding("A", "oi!")],
            StubGenerator::succeeding(),
        );

        fx.orchestrator.resolve("bom dia", &user()).await.unwrap();
        assert_eq!(fx.providers[0].last_prompt().unwrap(), "bom dia");
    }

    #[tokio::test]
    async fn image_generation_skips_the_chain() {
        let fx = fixture(
            vec![RecordingProvider::succeeding("A", "nunca")],
            StubGenerator::succeeding(),
        );

        let outcome = fx
            .orchestrator
            .resolve("gerar imagem de um gato", &user())
            .await
            .unwrap();

        assert_eq!(outcome.metadata["imageGeneration"], serde_json::json!(true));
        assert_eq!(fx.generator.calls(), 1);
        assert_eq!(fx.providers[0].calls(), 0);
        assert_eq!(fx.memory.recent(&user()).await.len(), 1);
    }

    #[tokio::test]
    async fn image_generation_failure_does_not_fall_through() {
        let fx = fixture(
            vec![RecordingProvider::succeeding("A", "nunca")],
            StubGenerator::failing(),
        );

        let err = fx
            .orchestrator
            .resolve("gerar imagem de um gato", &user())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OrchestrateError::Capability(CapabilityError::Generation(_))
        ));
        // The general chain is never consulted, and nothing is remembered.
        assert_eq!(fx.providers[0].calls(), 0);
        assert!(fx.memory.recent(&user()).await.is_empty());
    }

    #[tokio::test]
    async fn image_reading_requires_a_payload() {
        let fx = fixture(vec![], StubGenerator::succeeding());

        let err = fx
            .orchestrator
            .resolve("ler foto", &user())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OrchestrateError::Capability(CapabilityError::MissingImage)
        ));
        assert_eq!(*fx.reader.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn image_reading_dispatches_the_payload() {
        let fx = fixture(vec![], StubGenerator::succeeding());

        let outcome = fx
            .orchestrator
            .resolve("ler foto: aGVsbG8=", &user())
            .await
            .unwrap();

        assert_eq!(outcome.final_response, "um gato no sofá");
        assert_eq!(outcome.metadata["imageReading"], serde_json::json!(true));
        assert_eq!(*fx.reader.calls.lock().unwrap(), 1);
        assert_eq!(fx.memory.recent(&user()).await.len(), 1);
    }

    #[tokio::test]
    async fn hung_image_adapter_times_out() {
        struct HangingGenerator;

        #[async_trait]
        impl ImageGenerator for HangingGenerator {
            fn name(&self) -> &str {
                "hanging"
            }

            async fn generate(&self, _prompt: &str) -> std::result::Result<String, ProviderError> {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                unreachable!()
            }
        }

        let memory = Arc::new(EphemeralMemory::default());
        let orchestrator = Orchestrator::new(
            FallbackChain::new(),
            memory.clone(),
            Arc::new(HangingGenerator),
            Arc::new(StubReader::new()),
        )
        .with_image_timeouts(Duration::from_millis(50), Duration::from_millis(50));

        let err = orchestrator
            .resolve("gerar imagem de um gato", &user())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OrchestrateError::Capability(CapabilityError::Generation(ProviderError::Timeout(_)))
        ));
        assert!(memory.recent(&user()).await.is_empty());
    }

    #[tokio::test]
    async fn from_config_wires_the_default_chain() {
        let config = AppConfig::default();
        let memory = Arc::new(EphemeralMemory::default());
        let orchestrator = Orchestrator::from_config(&config, memory);
        assert_eq!(orchestrator.chain.len(), 7);
    }
}
