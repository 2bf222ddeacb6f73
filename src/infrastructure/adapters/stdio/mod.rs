//! Stdio I/O module for local development
//!
//! Exposes exactly one connection. Lines typed on stdin (or read from an
//! injected async reader) are supplied to the console from a tokio task;
//! replies are rendered with ANSI styling on stdout.

use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::application::errors::IoError;
use crate::application::Console;
use crate::domain::entities::{Message, Snippet, Style};
use crate::domain::traits::{Connection, Connections, IoModule};

/// Render snippets as an ANSI-escaped string, each snippet resolved against `ambient`
///
/// The ambient color is the terminal's own foreground, so a color code is
/// only written where the resolved color differs from it.
pub fn render_ansi(snippets: &[Snippet], ambient: &Style) -> String {
    let mut out = String::new();

    for snippet in snippets {
        let style = snippet.resolve(ambient);
        let mut codes = Vec::new();
        if style.bold {
            codes.push("1".to_string());
        }
        if style.italic {
            codes.push("3".to_string());
        }
        if style.underlined {
            codes.push("4".to_string());
        }
        if style.strikethrough {
            codes.push("9".to_string());
        }
        if style.color != ambient.color {
            codes.push(format!("38;2;{};{};{}", style.color.r, style.color.g, style.color.b));
        }

        if codes.is_empty() {
            out.push_str(snippet.text());
        } else {
            out.push_str(&format!("\x1b[{}m{}\x1b[0m", codes.join(";"), snippet.text()));
        }
    }

    out
}

/// The single stdin/stdout peer
#[derive(Debug)]
pub struct StdioConnection {
    console: Weak<Console>,
    style: Style,
}

impl Connection for StdioConnection {
    fn id(&self) -> &str {
        "stdio"
    }

    fn remote_address(&self) -> &str {
        "stdin"
    }

    fn console(&self) -> Option<Arc<Console>> {
        self.console.upgrade()
    }

    fn send(&self, message: &Message) -> Result<(), IoError> {
        let rendered = render_ansi(message.snippets(), &self.style);
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", rendered)?;
        stdout.flush()?;
        Ok(())
    }
}

type Input = Box<dyn AsyncRead + Send + Unpin>;

#[derive(Default)]
struct StdioState {
    connection: Option<Arc<StdioConnection>>,
    // Taken by the reader on start; stdin when unset
    input: Option<Input>,
    reader: Option<JoinHandle<()>>,
    closed: bool,
}

impl fmt::Debug for StdioState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdioState")
            .field("connection", &self.connection)
            .field("reading", &self.reader.is_some())
            .field("closed", &self.closed)
            .finish()
    }
}

/// I/O module bound to the process' stdin/stdout
#[derive(Debug, Default)]
pub struct StdioModule {
    style: Style,
    state: Mutex<StdioState>,
    finished: Arc<Notify>,
}

impl StdioModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ambient style replies are resolved against
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Read lines from `input` instead of the process' stdin
    pub fn with_input(self, input: impl AsyncRead + Send + Unpin + 'static) -> Self {
        self.state().input = Some(Box::new(input));
        self
    }

    /// True while a reader task is attached
    pub fn is_reading(&self) -> bool {
        self.state().reader.is_some()
    }

    fn state(&self) -> MutexGuard<'_, StdioState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolves once the input reaches end of file
    pub async fn finished(&self) {
        self.finished.notified().await
    }
}

async fn read_lines(input: Input, connection: Arc<StdioConnection>, finished: Arc<Notify>) {
    let mut lines = BufReader::new(input).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let Some(console) = connection.console() else {
                    break;
                };
                let message = Message::new(Arc::clone(&console), Arc::clone(&connection) as Arc<dyn Connection>, line);
                if message.text().is_empty() {
                    continue;
                }
                console.supply_message(&message);
            }
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Failed to read stdin: {}", e);
                break;
            }
        }
    }

    tracing::debug!("Stdin reader finished");
    finished.notify_one();
}

impl IoModule for StdioModule {
    fn init(&self, console: Weak<Console>) -> Result<(), IoError> {
        self.state().connection = Some(Arc::new(StdioConnection {
            console,
            style: self.style,
        }));
        Ok(())
    }

    fn start(&self) -> Result<(), IoError> {
        let mut state = self.state();
        if state.closed {
            return Err(IoError::Closed);
        }
        if state.reader.is_some() {
            return Ok(());
        }

        let connection = state.connection.clone().ok_or(IoError::NotStarted)?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| IoError::Io(std::io::Error::other(e)))?;
        let input = state.input.take().unwrap_or_else(|| Box::new(tokio::io::stdin()));
        state.reader = Some(runtime.spawn(read_lines(input, connection, Arc::clone(&self.finished))));

        tracing::info!("Reading console input");
        Ok(())
    }

    fn close(&self) -> Result<(), IoError> {
        let mut state = self.state();
        if let Some(reader) = state.reader.take() {
            reader.abort();
        }
        state.connection = None;
        state.closed = true;
        Ok(())
    }

    fn connection_count(&self) -> usize {
        usize::from(self.state().connection.is_some())
    }

    fn connections(&self) -> Result<Connections<'_>, IoError> {
        let connection = self.state().connection.clone();
        Ok(Box::new(connection.into_iter().map(|c| c as Arc<dyn Connection>)))
    }
}
