use chrono::Local;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

use super::dual_logging::{self, DualLogger};

/// Maximum number of log entries to keep in memory
const MAX_LOG_ENTRIES: usize = 1000;

/// A log entry with timestamp and message
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub target: String,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: Level, target: &str, message: String) -> Self {
        Self {
            timestamp: Local::now().format("%H:%M:%S.%3f").to_string(),
            level: level.to_string().to_uppercase(),
            target: target.to_string(),
            message,
        }
    }

    /// Format for the \logs command
    pub fn format_for_display(&self) -> String {
        format!(
            "[{}] {} [{}] {}",
            self.timestamp, self.level, self.target, self.message
        )
    }
}

/// Thread-safe ring buffer for log entries
#[derive(Clone, Default)]
pub struct LogRingBuffer {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
}

impl LogRingBuffer {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(MAX_LOG_ENTRIES))),
        }
    }

    pub fn push(&self, entry: LogEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            if entries.len() >= MAX_LOG_ENTRIES {
                entries.pop_front();
            }
            entries.push_back(entry);
        }
    }

    pub fn get_recent(&self, count: usize) -> Vec<LogEntry> {
        match self.entries.lock() {
            Ok(entries) => {
                let skip = entries.len().saturating_sub(count);
                entries.iter().skip(skip).cloned().collect()
            }
            Err(_) => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split a compact-format line ("LEVEL target: message") into its parts.
fn parse_compact_line(message: &str) -> (Level, &str, &str) {
    let (level, rest) = if let Some(rest) = message.strip_prefix("TRACE ") {
        (Level::TRACE, rest)
    } else if let Some(rest) = message.strip_prefix("DEBUG ") {
        (Level::DEBUG, rest)
    } else if let Some(rest) = message.strip_prefix("INFO ") {
        (Level::INFO, rest)
    } else if let Some(rest) = message.strip_prefix("WARN ") {
        (Level::WARN, rest)
    } else if let Some(rest) = message.strip_prefix("ERROR ") {
        (Level::ERROR, rest)
    } else {
        return (Level::INFO, "general", message);
    };

    let rest = rest.trim_start();
    match rest.find(':') {
        // A target never contains spaces
        Some(colon_pos) if !rest[..colon_pos].contains(' ') => {
            (level, &rest[..colon_pos], rest[colon_pos + 1..].trim())
        }
        _ => (level, "general", rest),
    }
}

/// Writer that feeds both the in-memory ring buffer and the log file
#[derive(Clone)]
pub struct DualWriter {
    buffer: LogRingBuffer,
    dual_logger: Option<&'static DualLogger>,
}

impl DualWriter {
    pub fn new(buffer: LogRingBuffer, dual_logger: Option<&'static DualLogger>) -> Self {
        Self {
            buffer,
            dual_logger,
        }
    }
}

impl std::io::Write for DualWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Ok(message) = std::str::from_utf8(buf) {
            for line in message.lines().map(str::trim).filter(|l| !l.is_empty()) {
                let (level, target, msg) = parse_compact_line(line);
                let entry = LogEntry::new(level, target, msg.to_string());

                if let Some(logger) = self.dual_logger {
                    logger.write_entry(&entry);
                }
                self.buffer.push(entry);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if let Some(logger) = self.dual_logger {
            logger.flush();
        }
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for DualWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Global log buffer accessible throughout the application
static LOG_BUFFER: OnceLock<LogRingBuffer> = OnceLock::new();

/// Initialize the global log buffer
pub fn init_log_buffer() -> LogRingBuffer {
    LOG_BUFFER.get_or_init(LogRingBuffer::new).clone()
}

/// Get the global log buffer
pub fn get_log_buffer() -> Option<LogRingBuffer> {
    LOG_BUFFER.get().cloned()
}

/// Initialize tracing with dual logging (ring buffer + file).
/// `RUST_LOG` overrides the default `info` filter.
pub fn init_tracing_with_dual_logging() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let dual_logger = dual_logging::init_dual_logger();
    let buffer = init_log_buffer();
    let dual_writer = DualWriter::new(buffer, dual_logger);

    let fmt_layer = fmt::layer()
        .with_writer(dual_writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .without_time() // LogEntry adds its own timestamps
        .compact();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // A subscriber may already be installed (tests, embedding)
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();

    tracing::info!(target: "shell", "Logging system initialized");
}
