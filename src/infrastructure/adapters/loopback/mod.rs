//! Loopback I/O module - In-memory connections for embedding and tests
//!
//! Peers are attached with [`LoopbackModule::connect`] and feed lines through
//! [`LoopbackModule::receive`]. Everything sent to a connection is kept in
//! its outbox as plain text and snippets, never as a [`Message`]: a message
//! holds its console strongly, and the module is owned by that console.

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::application::errors::IoError;
use crate::application::Console;
use crate::domain::entities::{Message, Snippet};
use crate::domain::traits::{Connection, Connections, IoModule};

/// Output recorded by a [`LoopbackConnection`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    text: String,
    snippets: Vec<Snippet>,
}

impl SentMessage {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn snippets(&self) -> &[Snippet] {
        &self.snippets
    }
}

/// One in-memory peer
#[derive(Debug)]
pub struct LoopbackConnection {
    id: String,
    remote_address: String,
    connected_at: DateTime<Utc>,
    console: Weak<Console>,
    outbox: Mutex<Vec<SentMessage>>,
}

impl LoopbackConnection {
    fn new(remote_address: impl Into<String>, console: Weak<Console>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            remote_address: remote_address.into(),
            connected_at: Utc::now(),
            console,
            outbox: Mutex::new(Vec::new()),
        }
    }

    pub fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    /// Output sent to this peer, oldest first
    pub fn sent(&self) -> Vec<SentMessage> {
        self.outbox.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn sent_text(&self) -> Vec<String> {
        self.sent().iter().map(|m| m.text().to_string()).collect()
    }
}

impl Connection for LoopbackConnection {
    fn id(&self) -> &str {
        &self.id
    }

    fn remote_address(&self) -> &str {
        &self.remote_address
    }

    fn console(&self) -> Option<Arc<Console>> {
        self.console.upgrade()
    }

    fn send(&self, message: &Message) -> Result<(), IoError> {
        self.outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SentMessage {
                text: message.text().to_string(),
                snippets: message.snippets().to_vec(),
            });
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Running,
    Closed,
}

#[derive(Debug)]
struct LoopbackState {
    console: Weak<Console>,
    phase: Phase,
    connections: Vec<Arc<LoopbackConnection>>,
}

/// In-memory I/O module
#[derive(Debug)]
pub struct LoopbackModule {
    state: Mutex<LoopbackState>,
}

impl LoopbackModule {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LoopbackState {
                console: Weak::new(),
                phase: Phase::Idle,
                connections: Vec::new(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, LoopbackState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_running(state: &LoopbackState) -> Result<(), IoError> {
        match state.phase {
            Phase::Running => Ok(()),
            Phase::Idle => Err(IoError::NotStarted),
            Phase::Closed => Err(IoError::Closed),
        }
    }

    pub fn is_running(&self) -> bool {
        self.state().phase == Phase::Running
    }

    /// Attach a new peer
    pub fn connect(&self, remote_address: impl Into<String>) -> Result<Arc<LoopbackConnection>, IoError> {
        let mut state = self.state();
        Self::ensure_running(&state)?;

        let connection = Arc::new(LoopbackConnection::new(remote_address, state.console.clone()));
        state.connections.push(Arc::clone(&connection));
        tracing::debug!(id = connection.id(), remote = connection.remote_address(), "Loopback peer connected");

        Ok(connection)
    }

    /// Detach a peer by id; false if it was not connected
    pub fn disconnect(&self, id: &str) -> bool {
        let mut state = self.state();
        let before = state.connections.len();
        state.connections.retain(|c| c.id() != id);
        before != state.connections.len()
    }

    /// Deliver a line from `connection` to the console
    pub fn receive(&self, connection: &Arc<LoopbackConnection>, line: &str) -> Result<(), IoError> {
        let console = {
            let state = self.state();
            Self::ensure_running(&state)?;
            if !state.connections.iter().any(|c| Arc::ptr_eq(c, connection)) {
                return Err(IoError::ConnectionNotFound(connection.id().to_string()));
            }
            state.console.upgrade().ok_or(IoError::ConsoleDropped)?
        };

        // Lock released: listeners may call back into the module.
        let message = Message::new(Arc::clone(&console), Arc::clone(connection) as Arc<dyn Connection>, line);
        console.supply_message(&message);
        Ok(())
    }
}

impl Default for LoopbackModule {
    fn default() -> Self {
        Self::new()
    }
}

impl IoModule for LoopbackModule {
    fn init(&self, console: Weak<Console>) -> Result<(), IoError> {
        self.state().console = console;
        Ok(())
    }

    fn start(&self) -> Result<(), IoError> {
        let mut state = self.state();
        match state.phase {
            Phase::Closed => Err(IoError::Closed),
            _ => {
                state.phase = Phase::Running;
                Ok(())
            }
        }
    }

    fn close(&self) -> Result<(), IoError> {
        let mut state = self.state();
        state.phase = Phase::Closed;
        state.connections.clear();
        Ok(())
    }

    fn connection_count(&self) -> usize {
        self.state().connections.len()
    }

    fn connections(&self) -> Result<Connections<'_>, IoError> {
        let snapshot: Vec<Arc<dyn Connection>> = self
            .state()
            .connections
            .iter()
            .map(|c| Arc::clone(c) as Arc<dyn Connection>)
            .collect();
        Ok(Box::new(snapshot.into_iter()))
    }
}
