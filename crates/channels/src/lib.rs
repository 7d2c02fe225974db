//! Chat channel implementations for Cascata.
//!
//! A channel connects to a chat transport and relays `InboundMessage`s to
//! the runtime, carrying reply text back. The CLI channel is the built-in
//! transport; messenger integrations implement the same `Channel` trait.

pub mod cli;

pub use cli::CliChannel;
