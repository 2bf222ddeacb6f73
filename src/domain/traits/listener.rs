use std::sync::Arc;

use crate::application::errors::ListenerError;
use crate::domain::entities::Message;

/// Callback notified of every message supplied to a console
pub trait MessageListener: Send + Sync {
    fn on_message(&self, message: &Message) -> Result<(), ListenerError>;
}

impl<F> MessageListener for F
where
    F: Fn(&Message) -> Result<(), ListenerError> + Send + Sync,
{
    fn on_message(&self, message: &Message) -> Result<(), ListenerError> {
        self(message)
    }
}

/// Wrap a closure as a shareable listener.
///
/// Keep the returned `Arc` around to remove the listener later; removal
/// compares by identity.
pub fn listener_fn<F>(f: F) -> Arc<dyn MessageListener>
where
    F: Fn(&Message) -> Result<(), ListenerError> + Send + Sync + 'static,
{
    Arc::new(f)
}
