use std::fmt;
use std::sync::{Arc, Weak};

use crate::application::errors::IoError;
use crate::application::Console;
use crate::domain::entities::Message;

/// Iterator over the connections an I/O module currently holds
pub type Connections<'a> = Box<dyn Iterator<Item = Arc<dyn Connection>> + Send + 'a>;

/// Connection trait - a handle to one remote peer attached to a console
pub trait Connection: Send + Sync + fmt::Debug {
    /// Stable identifier assigned by the I/O module
    fn id(&self) -> &str;

    /// Remote address of the peer
    fn remote_address(&self) -> &str;

    /// The console this connection belongs to, if it is still alive
    fn console(&self) -> Option<Arc<Console>>;

    /// Send a message to the peer
    fn send(&self, message: &Message) -> Result<(), IoError>;
}

/// IoModule trait - abstraction for the network transport behind a console
///
/// The console never guards the lifecycle itself. Whether repeated `start`
/// or `close` calls are accepted is up to the implementation.
pub trait IoModule: Send + Sync + fmt::Debug {
    /// Prepare resources without starting network activity.
    ///
    /// Called exactly once while the console is being built. The weak handle
    /// is what the module uses to build messages and call
    /// [`Console::supply_message`].
    fn init(&self, console: Weak<Console>) -> Result<(), IoError>;

    /// Begin accepting connections
    fn start(&self) -> Result<(), IoError>;

    /// Stop accepting connections and release resources
    fn close(&self) -> Result<(), IoError>;

    /// Number of currently open connections
    fn connection_count(&self) -> usize;

    /// Enumerate the currently open connections
    fn connections(&self) -> Result<Connections<'_>, IoError>;
}
