//! Command parser - Splits message text into a command name and arguments

use crate::domain::entities::{Command, Message};

/// Parses messages into [`Command`]s
#[derive(Debug, Clone)]
pub struct CommandParser {
    command_prefix: String,
}

impl CommandParser {
    /// An empty prefix treats every non-blank message as a command
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            command_prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.command_prefix
    }

    /// Parse a message, or `None` if it is not a command.
    ///
    /// The first whitespace-delimited token after the prefix is the name,
    /// the remaining tokens are the arguments.
    pub fn parse(&self, message: &Message) -> Option<Command> {
        let body = message.text().strip_prefix(self.command_prefix.as_str())?;

        let mut parts = body.split_whitespace();
        let name = parts.next()?;
        let args = parts.map(str::to_string).collect();

        Command::new(message.clone(), name, args).ok()
    }
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::new("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::application::Console;
    use crate::infrastructure::adapters::loopback::LoopbackModule;

    fn message(text: &str) -> Message {
        let io = Arc::new(LoopbackModule::new());
        let console = Console::new(io.clone()).unwrap();
        console.start().unwrap();
        let conn = io.connect("127.0.0.1:1").unwrap();
        Message::new(console, conn, text)
    }

    #[test]
    fn test_parse_without_prefix() {
        let parser = CommandParser::default();
        let cmd = parser.parse(&message("  kick  player1   spam ")).unwrap();

        assert_eq!(cmd.name(), "kick");
        assert_eq!(cmd.args(), &["player1".to_string(), "spam".to_string()]);
        assert_eq!(cmd.source().text(), "kick  player1   spam");
    }

    #[test]
    fn test_parse_with_prefix() {
        let parser = CommandParser::new("/");

        let cmd = parser.parse(&message("/status")).unwrap();
        assert_eq!(cmd.name(), "status");
        assert_eq!(cmd.args_count(), 0);

        assert!(parser.parse(&message("status")).is_none());
        assert!(parser.parse(&message("/")).is_none());
    }

    #[test]
    fn test_blank_message_is_not_a_command() {
        let parser = CommandParser::default();
        assert!(parser.parse(&message("   ")).is_none());
    }
}
