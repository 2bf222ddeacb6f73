use std::collections::HashMap;

use super::{Message, Snippet};
use crate::application::errors::{CommandError, ConsoleError};

/// A message parsed into a command name and positional arguments
#[derive(Debug, Clone)]
pub struct Command {
    source: Message,
    name: String,
    args: Vec<String>,
}

impl Command {
    pub fn new(source: Message, name: impl Into<String>, args: Vec<String>) -> Result<Self, ConsoleError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ConsoleError::InvalidArgument("command name must not be blank".to_string()));
        }

        Ok(Self { source, name, args })
    }

    pub fn source(&self) -> &Message {
        &self.source
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn args_count(&self) -> usize {
        self.args.len()
    }

    pub fn arg(&self, index: usize) -> Result<&str, ConsoleError> {
        self.args
            .get(index)
            .map(String::as_str)
            .ok_or(ConsoleError::OutOfRange {
                index,
                len: self.args.len(),
            })
    }
}

/// Command handler function type
pub type CommandHandler = Box<dyn Fn(&Command) -> Result<Vec<Snippet>, CommandError> + Send + Sync>;

/// A named console command with its handler
pub struct CommandDefinition {
    pub name: String,
    pub description: Option<String>,
    pub aliases: Vec<String>,
    pub usage: Option<String>,
    pub handler: Option<CommandHandler>,
}

impl CommandDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            aliases: Vec::new(),
            usage: None,
            handler: None,
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn with_aliases(mut self, aliases: Vec<String>) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Command) -> Result<Vec<Snippet>, CommandError> + Send + Sync + 'static,
    {
        self.handler = Some(Box::new(handler));
        self
    }

    pub fn matches(&self, input: &str) -> bool {
        self.name.eq_ignore_ascii_case(input) || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(input))
    }
}

/// Command registry for managing available commands
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, CommandDefinition>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, command: CommandDefinition) {
        self.commands.insert(command.name.to_lowercase(), command);
    }

    pub fn get(&self, name: &str) -> Option<&CommandDefinition> {
        self.commands.get(&name.to_lowercase())
    }

    /// Look up by name first, then by alias
    pub fn find(&self, input: &str) -> Option<&CommandDefinition> {
        self.get(input).or_else(|| self.commands.values().find(|c| c.matches(input)))
    }

    /// All commands, sorted by name
    pub fn all(&self) -> Vec<&CommandDefinition> {
        let mut commands: Vec<_> = self.commands.values().collect();
        commands.sort_by(|a, b| a.name.cmp(&b.name));
        commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
