//! Request orchestration for Cascata.
//!
//! The pipeline for every inbound message: the activation gate decides
//! whether the user is listening at all, the classifier picks a handling
//! path, and the orchestrator either answers locally (arithmetic), calls a
//! specialized image backend, or walks the fallback chain — recording the
//! winning exchange in ephemeral memory.

pub mod eval;
pub mod gate;
pub mod orchestrator;
pub mod runtime;
pub mod texts;

pub use gate::ActivationGate;
pub use orchestrator::Orchestrator;
pub use runtime::Runtime;
