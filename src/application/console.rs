//! Console - Owns the I/O module and republishes inbound messages

use std::fmt;
use std::sync::Arc;

use super::errors::IoError;
use super::messaging::ListenerRegistry;
use crate::domain::entities::{Message, Snippet};
use crate::domain::traits::{Connections, IoModule, MessageListener};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8080;

/// Server-side object coordinating connections, listeners and dispatch
///
/// Host, port and resource URLs are fixed at construction. Lifecycle calls
/// are forwarded to the I/O module as-is; the console keeps no phase of its
/// own.
pub struct Console {
    io: Arc<dyn IoModule>,
    host: String,
    port: u16,
    http_url: Option<String>,
    websocket_url: Option<String>,
    listeners: ListenerRegistry,
}

impl Console {
    /// Console with default host and port and no resource URLs
    pub fn new(io: Arc<dyn IoModule>) -> Result<Arc<Self>, IoError> {
        Self::builder(io).build()
    }

    pub fn builder(io: Arc<dyn IoModule>) -> ConsoleBuilder {
        ConsoleBuilder::new(io)
    }

    pub fn start(&self) -> Result<(), IoError> {
        tracing::info!("Starting console on {}:{}", self.host, self.port);
        self.io.start()
    }

    pub fn close(&self) -> Result<(), IoError> {
        tracing::info!("Closing console on {}:{}", self.host, self.port);
        self.io.close()
    }

    pub fn connection_count(&self) -> usize {
        self.io.connection_count()
    }

    /// Current connections, straight from the I/O module
    pub fn connections(&self) -> Result<Connections<'_>, IoError> {
        self.io.connections()
    }

    /// Hand an inbound message to every registered listener
    pub fn supply_message(&self, message: &Message) {
        tracing::debug!(
            remote = message.connection().remote_address(),
            "Message supplied to console: {}",
            message.text()
        );

        let failures = self.listeners.dispatch(message);
        if failures > 0 {
            tracing::debug!(failures, "Dispatch finished with listener failures");
        }
    }

    pub fn add_message_listener(&self, listener: Arc<dyn MessageListener>) {
        self.listeners.add(listener);
    }

    /// Returns false when the listener was not registered
    pub fn remove_message_listener(&self, listener: &Arc<dyn MessageListener>) -> bool {
        self.listeners.remove(listener)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Send the same styled message to every current connection.
    ///
    /// Returns how many connections were reached; the first send failure is
    /// returned as-is.
    pub fn broadcast(self: &Arc<Self>, snippets: Vec<Snippet>) -> Result<usize, IoError> {
        let mut sent = 0;
        for connection in self.connections()? {
            let message = Message::from_snippets(Arc::clone(self), Arc::clone(&connection), snippets.clone());
            connection.send(&message)?;
            sent += 1;
        }

        tracing::debug!(sent, "Broadcast delivered");
        Ok(sent)
    }

    pub fn io_module(&self) -> &Arc<dyn IoModule> {
        &self.io
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn http_url(&self) -> Option<&str> {
        self.http_url.as_deref()
    }

    pub fn websocket_url(&self) -> Option<&str> {
        self.websocket_url.as_deref()
    }
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("http_url", &self.http_url)
            .field("websocket_url", &self.websocket_url)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Console({:?})", self.io)
    }
}

/// Builder for [`Console`]
pub struct ConsoleBuilder {
    io: Arc<dyn IoModule>,
    host: String,
    port: u16,
    http_url: Option<String>,
    websocket_url: Option<String>,
}

impl ConsoleBuilder {
    pub fn new(io: Arc<dyn IoModule>) -> Self {
        Self {
            io,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            http_url: None,
            websocket_url: None,
        }
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn http_url(mut self, url: impl Into<String>) -> Self {
        self.http_url = Some(url.into());
        self
    }

    pub fn websocket_url(mut self, url: impl Into<String>) -> Self {
        self.websocket_url = Some(url.into());
        self
    }

    /// Build the console and initialise its I/O module exactly once
    pub fn build(self) -> Result<Arc<Console>, IoError> {
        let console = Arc::new(Console {
            io: self.io,
            host: self.host,
            port: self.port,
            http_url: self.http_url,
            websocket_url: self.websocket_url,
            listeners: ListenerRegistry::new(),
        });

        console.io.init(Arc::downgrade(&console))?;
        tracing::debug!("Console created: {}", console);

        Ok(console)
    }
}
