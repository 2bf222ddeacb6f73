//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use crate::application::console::{DEFAULT_HOST, DEFAULT_PORT};
use crate::application::errors::{ConfigError, ConsoleError};
use crate::application::Console;
use crate::domain::traits::IoModule;

/// Console configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub console: ServerConfig,
    pub commands: CommandsConfig,
    pub logging: LoggingConfig,
}

/// Identity of the console endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub http_url: Option<String>,
    pub websocket_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CommandsConfig {
    pub prefix: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            http_url: None,
            websocket_url: None,
        }
    }
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self { prefix: "/".to_string() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::MissingField("console.host".to_string()));
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidValue("console.port must be non-zero".to_string()));
        }
        Ok(())
    }
}

impl Console {
    /// Validate `config` and build a console on top of `io`
    pub fn from_config(io: Arc<dyn IoModule>, config: &ServerConfig) -> Result<Arc<Console>, ConsoleError> {
        config.validate()?;

        let mut builder = Console::builder(io).host(config.host.clone()).port(config.port);
        if let Some(url) = &config.http_url {
            builder = builder.http_url(url.clone());
        }
        if let Some(url) = &config.websocket_url {
            builder = builder.websocket_url(url.clone());
        }
        Ok(builder.build()?)
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.console.validate()?;
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::MissingField("logging.level".to_string()));
        }
        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Defaults overlaid with environment variables
    pub fn load_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(host) = var("CONSOLE_HOST") {
            self.console.host = host;
        }

        if let Some(port) = var("CONSOLE_PORT") {
            self.console.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidValue(format!("CONSOLE_PORT={}", port)))?;
        }

        if let Some(prefix) = var("CONSOLE_PREFIX") {
            self.commands.prefix = prefix;
        }

        self.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use crate::infrastructure::adapters::loopback::LoopbackModule;

    #[test]
    fn test_yaml_with_partial_fields() {
        let yaml = "console:\n  port: 9000\n  websocket-url: ws://localhost:9000/ws\ncommands:\n  prefix: '!'\n";
        let config = Config::from_yaml(yaml).unwrap();

        assert_eq!(config.console.host, "localhost");
        assert_eq!(config.console.port, 9000);
        assert_eq!(config.console.websocket_url.as_deref(), Some("ws://localhost:9000/ws"));
        assert_eq!(config.console.http_url, None);
        assert_eq!(config.commands.prefix, "!");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_port_rejected() {
        let result = Config::from_yaml("console:\n  port: 0\n");
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [("CONSOLE_HOST", "0.0.0.0"), ("CONSOLE_PORT", "7000"), ("CONSOLE_PREFIX", ".")]
            .into_iter()
            .collect();
        let mut config = Config::default();
        config.apply_env(|k| vars.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.console.host, "0.0.0.0");
        assert_eq!(config.console.port, 7000);
        assert_eq!(config.commands.prefix, ".");

        let mut bad = Config::default();
        let result = bad.apply_env(|k| (k == "CONSOLE_PORT").then(|| "http".to_string()));
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_console_from_config() {
        let server = ServerConfig {
            host: "example.org".to_string(),
            port: 4242,
            http_url: Some("http://example.org:4242/".to_string()),
            websocket_url: None,
        };
        let console = Console::from_config(Arc::new(LoopbackModule::new()), &server).unwrap();

        assert_eq!(console.host(), "example.org");
        assert_eq!(console.port(), 4242);
        assert_eq!(console.http_url(), Some("http://example.org:4242/"));
        assert_eq!(console.websocket_url(), None);
    }

    #[test]
    fn test_validate_whole_config() {
        assert!(Config::default().validate().is_ok());

        let mut config = Config::default();
        config.logging.level = " ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::MissingField(ref f)) if f == "logging.level"));

        let mut config = Config::default();
        config.console.host = String::new();
        assert!(matches!(config.validate(), Err(ConfigError::MissingField(ref f)) if f == "console.host"));
        assert!(matches!(
            Console::from_config(Arc::new(LoopbackModule::new()), &config.console),
            Err(ConsoleError::Config(_))
        ));
    }

    #[test]
    fn test_default_round_trips_through_yaml() {
        let yaml = Config::default().to_yaml().unwrap();
        let config = Config::from_yaml(&yaml).unwrap();
        assert_eq!(config.console.port, DEFAULT_PORT);
        assert_eq!(config.commands.prefix, "/");
    }
}
