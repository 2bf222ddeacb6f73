use std::sync::Arc;

use super::Snippet;
use crate::application::errors::IoError;
use crate::application::Console;
use crate::domain::traits::Connection;

/// Text received from, or sent to, a connection
///
/// The text is trimmed once at construction and never changes afterwards.
#[derive(Debug, Clone)]
pub struct Message {
    console: Arc<Console>,
    connection: Arc<dyn Connection>,
    text: String,
    snippets: Vec<Snippet>,
}

impl Message {
    pub fn new(console: Arc<Console>, connection: Arc<dyn Connection>, text: impl AsRef<str>) -> Self {
        let text = text.as_ref().trim().to_string();
        let snippets = vec![Snippet::new(text.clone())];

        Self {
            console,
            connection,
            text,
            snippets,
        }
    }

    /// Build an outgoing message from styled parts.
    ///
    /// The plain text is the trimmed concatenation of the parts; the parts
    /// themselves keep their spacing.
    pub fn from_snippets(console: Arc<Console>, connection: Arc<dyn Connection>, snippets: Vec<Snippet>) -> Self {
        let joined: String = snippets.iter().map(Snippet::text).collect();

        Self {
            console,
            connection,
            text: joined.trim().to_string(),
            snippets,
        }
    }

    pub fn console(&self) -> &Arc<Console> {
        &self.console
    }

    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.connection
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn snippets(&self) -> &[Snippet] {
        &self.snippets
    }

    /// Styled parts as a JSON array, the form rich clients receive on the wire
    pub fn snippets_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.snippets)
    }

    /// Send a styled reply to the connection this message came from
    pub fn reply(&self, snippets: Vec<Snippet>) -> Result<(), IoError> {
        let reply = Message::from_snippets(Arc::clone(&self.console), Arc::clone(&self.connection), snippets);
        self.connection.send(&reply)
    }
}
