//! Application layer - Console orchestration
//! 
//! This layer contains:
//! - Console: Lifecycle delegation and message supply
//! - Errors: Console-specific errors
//! - Messaging: Listener registry, command parsing and dispatching

pub mod console;
pub mod errors;
pub mod messaging;

pub use console::{Console, ConsoleBuilder};
