//! AI backend adapters for Cascata.
//!
//! All text backends implement the `cascata_core::Provider` trait; the
//! orchestrator only ever talks to the `FallbackChain`, which tries them in
//! configured order. The image backends implement their own single-adapter
//! traits — there is no chain on those paths.

pub mod chain;
pub mod huggingface;
pub mod images;
pub mod ollama;
pub mod openrouter;

pub use chain::{build_from_config, ChainAnswer, FallbackChain};
pub use huggingface::HuggingFaceProvider;
pub use images::{build_image_adapters, BlipCaptioner, StableDiffusionGenerator};
pub use ollama::OllamaProvider;
pub use openrouter::OpenRouterProvider;
