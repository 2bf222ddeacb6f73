//! Message handling - Listener notification and command routing

pub mod dispatcher;
pub mod listeners;
pub mod parser;

pub use dispatcher::CommandDispatcher;
pub use listeners::ListenerRegistry;
pub use parser::CommandParser;
