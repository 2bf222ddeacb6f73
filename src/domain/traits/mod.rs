//! Domain traits - Abstractions for I/O implementations and listeners

pub mod io;
pub mod listener;

pub use io::{Connection, Connections, IoModule};
pub use listener::{listener_fn, MessageListener};
