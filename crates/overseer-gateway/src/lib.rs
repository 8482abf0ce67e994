//! overseer-gateway - browser front end for Project Overseer
//!
//! Serves the embedded chat page and a WebSocket endpoint through which the
//! page sends messages to agents. Each connection owns an in-memory session
//! transcript that disappears when the page goes away.

pub mod protocol;
pub mod server;
pub mod session;
pub mod webchat;

pub use server::{GatewayServer, GatewayState};
pub use session::{Session, SessionManager};
