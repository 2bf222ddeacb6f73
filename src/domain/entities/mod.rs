//! Domain entities - Immutable console values

pub mod message;
pub mod snippet;
pub mod command;

pub use message::Message;
pub use snippet::{Color, Snippet, Style};
pub use command::{Command, CommandDefinition, CommandHandler, CommandRegistry};
