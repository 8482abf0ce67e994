//! Agent registry: the six fixed personas and their static profiles
//!
//! The persona set is closed: [`AgentId`] is an enum and every lookup is a
//! `match`, so there is nothing to register or remove at runtime.

pub mod profile;
pub mod registry;

pub use profile::{AgentProfile, AgentStatus};
pub use registry::{AgentId, registry};
