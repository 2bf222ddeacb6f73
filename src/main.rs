use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use remote_console::infrastructure::adapters::StdioModule;
use remote_console::{
    listener_fn, Color, CommandDefinition, CommandDispatcher, CommandError, Config, Console, Snippet,
};

#[derive(Parser)]
#[command(name = "remote-console")]
#[command(about = "An embeddable remote console", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Command prefix (overrides config)
    #[arg(short, long)]
    prefix: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the console on stdin/stdout
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            run_console(cli.config, cli.prefix);
        }
        Commands::Version => {
            println!("remote-console v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            init_config();
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn run_console(config_path: String, prefix_override: Option<String>) {
    // Load config before logging so its level applies; report the outcome afterwards.
    let (mut config, load_error) = if std::path::Path::new(&config_path).exists() {
        match Config::load(&config_path) {
            Ok(config) => (config, None),
            Err(e) => (Config::default(), Some(e)),
        }
    } else {
        match Config::load_env() {
            Ok(config) => (config, None),
            Err(e) => (Config::default(), Some(e)),
        }
    };

    init_logging(&config.logging.level);
    if let Some(e) = load_error {
        tracing::warn!("Failed to load config: {}, using defaults", e);
    }
    if let Some(prefix) = prefix_override {
        config.commands.prefix = prefix;
    }

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {}", e);
            return;
        }
    };

    rt.block_on(async {
        let io = Arc::new(StdioModule::new());
        let console = match Console::from_config(io.clone(), &config.console) {
            Ok(console) => console,
            Err(e) => {
                tracing::error!("Failed to create console: {}", e);
                return;
            }
        };

        let mut dispatcher = CommandDispatcher::new(config.commands.prefix.clone());
        dispatcher.register_defaults();
        register_echo_command(&mut dispatcher);
        register_info_command(&mut dispatcher);
        register_version_command(&mut dispatcher);
        tracing::info!("Registered {} commands", dispatcher.registry().len());

        console.add_message_listener(Arc::new(dispatcher));
        console.add_message_listener(listener_fn(|message| {
            tracing::debug!("[{}] {}", message.connection().remote_address(), message.text());
            Ok(())
        }));

        if let Err(e) = console.start() {
            tracing::error!("Failed to start console: {}", e);
            return;
        }

        tokio::select! {
            _ = io.finished() => tracing::info!("Input closed"),
            _ = tokio::signal::ctrl_c() => tracing::info!("Interrupted"),
        }

        if let Err(e) = console.close() {
            tracing::warn!("Failed to close console: {}", e);
        }
    });

    // A blocking stdin read cannot be cancelled; don't wait on it forever.
    rt.shutdown_timeout(Duration::from_millis(200));
}

fn register_echo_command(dispatcher: &mut CommandDispatcher) {
    dispatcher.register(
        CommandDefinition::new("echo")
            .with_description("Repeat the given text")
            .with_usage("echo <text>")
            .with_aliases(vec!["say".to_string()])
            .with_handler(|cmd| {
                if cmd.args_count() == 0 {
                    return Err(CommandError::InvalidArgs("nothing to echo".to_string()));
                }
                Ok(vec![Snippet::new(cmd.args().join(" "))])
            }),
    );
}

fn register_info_command(dispatcher: &mut CommandDispatcher) {
    dispatcher.register(
        CommandDefinition::new("info")
            .with_description("Show console endpoint and connections")
            .with_handler(|cmd| {
                let console: &Arc<Console> = cmd.source().console();
                let mut info = vec![
                    Snippet::new("Console ").with_bold(true),
                    Snippet::new(format!("{}:{}", console.host(), console.port())).with_color(Color::CYAN),
                    Snippet::new(format!("\nConnections: {}", console.connection_count())),
                    Snippet::new(format!("\nListeners: {}", console.listener_count())),
                ];
                if let Some(url) = console.http_url() {
                    info.push(Snippet::new(format!("\nHTTP: {}", url)));
                }
                if let Some(url) = console.websocket_url() {
                    info.push(Snippet::new(format!("\nWebsocket: {}", url)));
                }
                Ok(info)
            }),
    );
}

fn register_version_command(dispatcher: &mut CommandDispatcher) {
    dispatcher.register(
        CommandDefinition::new("version")
            .with_description("Show version")
            .with_handler(|_| {
                Ok(vec![
                    Snippet::new("remote-console ").with_bold(true),
                    Snippet::new(format!("v{}", env!("CARGO_PKG_VERSION"))).with_color(Color::GREEN),
                ])
            }),
    );
}

fn init_config() {
    match Config::default().to_yaml() {
        Ok(yaml) => {
            println!("{}", yaml);
            println!("\nSave this to config.yaml and adjust as needed.");
        }
        Err(e) => eprintln!("Failed to render config: {}", e),
    }
}
