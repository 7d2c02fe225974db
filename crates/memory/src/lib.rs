//! Ephemeral conversation memory for Cascata.
//!
//! A per-user sliding time window of recent (prompt, response) exchanges.
//! Nothing here is persisted: entries age out after the configured TTL and
//! whole windows are garbage-collected once every entry in them has expired.

mod ephemeral;

pub use ephemeral::EphemeralMemory;
