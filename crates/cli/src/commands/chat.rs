//! `cascata chat` — Interactive terminal chat.

use cascata_channels::CliChannel;
use cascata_config::AppConfig;
use cascata_core::channel::Channel;
use cascata_orchestrator::Runtime;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    config.validate().map_err(|e| format!("Invalid config: {e}"))?;

    if config.openrouter_api_key.is_none() {
        eprintln!();
        eprintln!("  Note: no OpenRouter key configured; the chain will skip to");
        eprintln!("  the next provider. Set OPENROUTER_API_KEY or edit:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
    }

    let runtime = Runtime::from_config(&config);

    println!();
    println!("  ╔══════════════════════════════════════╗");
    println!("  ║     Cascata — Interactive Mode       ║");
    println!("  ╚══════════════════════════════════════╝");
    println!();
    println!("  Chain: {} providers configured", config.chain.len());
    println!();
    println!("  Send /ativar to activate the assistant, /ajuda for help.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let channel = CliChannel::new();
    let mut rx = channel
        .start()
        .await
        .map_err(|e| format!("Channel error: {e}"))?;

    print!("  You > ");
    use std::io::Write;
    std::io::stdout().flush()?;

    while let Some(result) = rx.recv().await {
        match result {
            Ok(msg) => {
                let sender = msg.sender_id.clone();
                let replies = runtime.handle_message(&msg).await;
                if !replies.is_empty() {
                    println!();
                }
                for reply in replies {
                    channel
                        .send(&sender, &format!("  Cascata > {reply}"))
                        .await
                        .map_err(|e| format!("Channel error: {e}"))?;
                }
                println!();

                print!("  You > ");
                std::io::stdout().flush()?;
            }
            Err(e) => {
                eprintln!("  [Channel Error] {e}");
                break;
            }
        }
    }

    println!();
    println!("  Até logo! 👋");
    println!();

    Ok(())
}
