//! Command dispatcher - Routes parsed commands to registered handlers

use crate::application::errors::{CommandError, ListenerError};
use crate::domain::entities::{Color, Command, CommandDefinition, CommandRegistry, Message, Snippet};
use crate::domain::traits::MessageListener;

/// Handler result
pub type HandlerResult = Result<Vec<Snippet>, CommandError>;

/// Message listener that parses commands and replies with the handler output
pub struct CommandDispatcher {
    parser: super::CommandParser,
    registry: CommandRegistry,
}

impl CommandDispatcher {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            parser: super::CommandParser::new(prefix),
            registry: CommandRegistry::new(),
        }
    }

    /// Register a command handler
    pub fn register(&mut self, command: CommandDefinition) {
        self.registry.register(command);
    }

    pub fn register_defaults(&mut self) {
        // Answered by the dispatcher itself, it needs the registry.
        self.register(
            CommandDefinition::new("help")
                .with_description("Show available commands")
                .with_usage("help [command]"),
        );
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Run the handler registered for a command
    pub fn handle(&self, command: &Command) -> HandlerResult {
        let definition = self
            .registry
            .find(command.name())
            .ok_or_else(|| CommandError::NotFound(command.name().to_string()))?;

        match &definition.handler {
            Some(handler) => handler(command),
            None if definition.name == "help" => Ok(self.help(command.args().first().map(String::as_str))),
            None => Ok(vec![Snippet::new(format!("Command {} not implemented", definition.name))]),
        }
    }

    /// Help text for one command, or the list of all commands
    pub fn help(&self, command: Option<&str>) -> Vec<Snippet> {
        let prefix = self.parser.prefix();

        if let Some(name) = command {
            let Some(cmd) = self.registry.find(name) else {
                return vec![Snippet::new(format!("Command {}{} not found", prefix, name)).with_color(Color::RED)];
            };

            let mut help = vec![
                Snippet::new(format!("{}{}", prefix, cmd.name)).with_bold(true),
                Snippet::new(format!(" - {}", cmd.description.as_deref().unwrap_or("No description"))),
            ];
            if let Some(usage) = &cmd.usage {
                help.push(Snippet::new(format!("\nUsage: {}{}", prefix, usage)).with_italic(true));
            }
            return help;
        }

        let mut help = vec![Snippet::new("Available commands:").with_bold(true)];
        for cmd in self.registry.all() {
            help.push(Snippet::new(format!("\n  {}{}", prefix, cmd.name)).with_color(Color::CYAN));
            help.push(Snippet::new(format!(" - {}", cmd.description.as_deref().unwrap_or(""))));
        }
        help
    }
}

impl MessageListener for CommandDispatcher {
    fn on_message(&self, message: &Message) -> Result<(), ListenerError> {
        let Some(command) = self.parser.parse(message) else {
            return Ok(());
        };
        tracing::debug!("Command: {} with args: {:?}", command.name(), command.args());

        let reply = match self.handle(&command) {
            Ok(snippets) => snippets,
            Err(CommandError::NotFound(name)) => {
                vec![Snippet::new(format!("Unknown command: {}{}", self.parser.prefix(), name)).with_color(Color::RED)]
            }
            Err(e) => {
                tracing::warn!("Command {} failed: {}", command.name(), e);
                vec![Snippet::new(format!("Error: {}", e)).with_color(Color::RED)]
            }
        };

        if !reply.is_empty() {
            message.reply(reply)?;
        }
        Ok(())
    }
}
