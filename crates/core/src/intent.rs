//! Intent classification — a pure, total function from prompt text to a
//! closed set of intents.
//!
//! The classifier never errors and never does I/O: every input maps to
//! exactly one `Intent`, with `General` as the default. Rules are checked in
//! a fixed priority order and the first match wins, so the ordering below is
//! part of the contract.

use serde::{Deserialize, Serialize};

/// The classified category of a request. Derived per message, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// The prompt is a bare arithmetic expression
    Arithmetic,
    /// The prompt asks for an image to be generated
    ImageGeneration,
    /// The prompt asks for an image to be read/captioned
    ImageReading,
    /// The prompt touches programming, physics, or mathematics topics
    Technical,
    /// Everything else
    General,
}

/// Case-insensitive prefixes that trigger image generation.
const IMAGE_GENERATION_TRIGGERS: &[&str] = &["gerar foto", "criar imagem", "gerar imagem"];

/// Case-insensitive prefixes that trigger image reading.
const IMAGE_READING_TRIGGERS: &[&str] = &["ler foto", "descrever foto", "legendar foto"];

/// Case-insensitive substrings that mark a technical request.
const TECHNICAL_KEYWORDS: &[&str] = &["programa", "código", "física", "matemática"];

/// Classify a raw prompt into exactly one intent.
///
/// Priority order (first match wins): arithmetic expression, image
/// generation trigger, image reading trigger, technical keyword, general.
pub fn classify(prompt: &str) -> Intent {
    if is_arithmetic(prompt) {
        return Intent::Arithmetic;
    }

    let lower = prompt.to_lowercase();

    if IMAGE_GENERATION_TRIGGERS.iter().any(|t| lower.starts_with(t)) {
        return Intent::ImageGeneration;
    }
    if IMAGE_READING_TRIGGERS.iter().any(|t| lower.starts_with(t)) {
        return Intent::ImageReading;
    }
    if TECHNICAL_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Intent::Technical;
    }

    Intent::General
}

/// Whether the trimmed prompt consists only of the arithmetic character
/// class: digits, the four operators, exponent `^`, parentheses, whitespace,
/// and decimal points.
///
/// Empty and operator-only prompts still match; the downstream evaluator
/// turns them into an "invalid expression" response rather than a crash.
fn is_arithmetic(prompt: &str) -> bool {
    prompt
        .trim()
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_whitespace() || "+-*/^().".contains(c))
}
