//! Embeddable remote console
//!
//! A [`Console`] owns an external I/O module, receives text lines from its
//! connections and republishes them as [`Message`]s to registered listeners.
//! Messages can be parsed into [`Command`]s, and replies are built from
//! styled [`Snippet`]s.

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use application::errors::{CommandError, ConfigError, ConsoleError, IoError, ListenerError};
pub use application::messaging::{CommandDispatcher, CommandParser, ListenerRegistry};
pub use application::{Console, ConsoleBuilder};
pub use domain::entities::{Color, Command, CommandDefinition, CommandRegistry, Message, Snippet, Style};
pub use domain::traits::{listener_fn, Connection, Connections, IoModule, MessageListener};
pub use infrastructure::config::Config;
