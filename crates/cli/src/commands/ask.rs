//! `cascata ask` — Answer one prompt and exit.
//!
//! Bypasses the activation gate; a one-shot invocation is its own consent.

use std::sync::Arc;

use cascata_config::AppConfig;
use cascata_core::message::UserId;
use cascata_memory::EphemeralMemory;
use cascata_orchestrator::Orchestrator;

pub async fn run(prompt: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    config.validate().map_err(|e| format!("Invalid config: {e}"))?;

    let memory = Arc::new(EphemeralMemory::new(
        config.memory.ttl_ms,
        config.memory.warn_window_len,
    ));
    let orchestrator = Orchestrator::from_config(&config, memory);

    eprint!("  Processando...");
    let outcome = orchestrator
        .resolve(prompt, &UserId::new("local_user"))
        .await?;
    eprint!("\r               \r");

    println!("{}", outcome.final_response);
    if let Some(model) = outcome.responded_model() {
        eprintln!("  [{model}]");
    }

    Ok(())
}
