//! # Cascata Core
//!
//! Domain types, traits, and error definitions for the Cascata
//! answer-orchestration runtime. This crate has **zero framework
//! dependencies** — it defines the domain model that all other crates
//! implement against.
//!
//! ## Design Philosophy
//!
//! Every subsystem is defined as a trait here. Implementations live in their
//! respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod channel;
pub mod error;
pub mod intent;
pub mod memory;
pub mod message;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use channel::{Channel, ChannelError};
pub use error::{CapabilityError, Error, OrchestrateError, ProviderError, Result};
pub use intent::{classify, Intent};
pub use memory::MemoryEntry;
pub use message::{InboundMessage, Outcome, UserId};
pub use provider::{ImageGenerator, ImageReader, Provider};
