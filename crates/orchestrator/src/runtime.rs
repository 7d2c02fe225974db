//! The message runtime — gate, control tokens, and reply protocol.
//!
//! Sits between a channel and the orchestrator. Group messages are ignored
//! outright; control tokens are matched against the exact message body and
//! handled before the gate is consulted; everything else either passes the
//! gate into the orchestrator or is dropped silently.

use std::sync::Arc;

use cascata_config::AppConfig;
use cascata_core::error::{CapabilityError, OrchestrateError};
use cascata_core::message::InboundMessage;
use cascata_memory::EphemeralMemory;
use tracing::{debug, warn};

use crate::gate::ActivationGate;
use crate::orchestrator::Orchestrator;
use crate::texts;

pub struct Runtime {
    gate: ActivationGate,
    orchestrator: Orchestrator,
}

impl Runtime {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            gate: ActivationGate::new(),
            orchestrator,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let memory = Arc::new(EphemeralMemory::new(
            config.memory.ttl_ms,
            config.memory.warn_window_len,
        ));
        Self::new(Orchestrator::from_config(config, memory))
    }

    pub fn gate(&self) -> &ActivationGate {
        &self.gate
    }

    /// Process one inbound message and return the replies to send, in order.
    /// An empty vector means stay silent.
    pub async fn handle_message(&self, msg: &InboundMessage) -> Vec<String> {
        if msg.is_group {
            debug!(user = %msg.sender_id, "Ignoring group message");
            return Vec::new();
        }

        match msg.text.as_str() {
            texts::ACTIVATE => {
                self.gate.activate(&msg.sender_id).await;
                return vec![texts::WELCOME.to_string()];
            }
            texts::DEACTIVATE => {
                self.gate.deactivate(&msg.sender_id).await;
                return vec![texts::GOODBYE.to_string()];
            }
            // Help is answered whether or not the user is active.
            texts::HELP => return vec![texts::HELP_TEXT.to_string()],
            _ => {}
        }

        if !self.gate.is_active(&msg.sender_id).await {
            debug!(user = %msg.sender_id, "Dropping message from inactive user");
            return Vec::new();
        }

        let reply = match self.orchestrator.resolve(&msg.text, &msg.sender_id).await {
            Ok(outcome) => outcome.final_response,
            Err(OrchestrateError::Capability(e)) => {
                warn!(user = %msg.sender_id, error = %e, "Image path failed");
                match e {
                    CapabilityError::MissingImage => texts::ERROR_IMAGE.to_string(),
                    CapabilityError::Generation(_) | CapabilityError::Reading(_) => {
                        texts::ERROR_IMAGE.to_string()
                    }
                }
            }
            Err(e) => {
                warn!(user = %msg.sender_id, error = %e, "Request failed");
                texts::ERROR_GENERIC.to_string()
            }
        };

        vec![texts::PROCESSING.to_string(), reply]
    }
}
