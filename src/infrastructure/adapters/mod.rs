//! I/O module adapters
//!
//! - Loopback: in-memory transport for embedding and tests
//! - Stdio: a single connection bound to stdin/stdout

pub mod loopback;
pub mod stdio;

pub use loopback::{LoopbackConnection, LoopbackModule, SentMessage};
pub use stdio::StdioModule;
