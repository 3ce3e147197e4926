// Logging setup: stderr, an on-disk live log, and a bounded in-memory buffer

use chrono::Local;
use once_cell::sync::Lazy;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::error::Result;

const LOG_BUFFER_LIMIT: usize = 2000;

// Global in-memory log buffer
static LOG_BUFFER: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Default live log location: `<data dir>/lol-viewer/logs/lol-viewer-live.log`.
pub fn default_log_path() -> PathBuf {
  dirs::data_dir()
    .unwrap_or_else(|| PathBuf::from("."))
    .join("lol-viewer")
    .join("logs")
    .join("lol-viewer-live.log")
}

/// Install the global subscriber. `level` is used when `RUST_LOG` is unset.
/// A live log that cannot be opened is reported and skipped.
pub fn init(level: &str, log_file: Option<&Path>) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

  let file_layer = log_file.and_then(|path| match open_live_log(path) {
    Ok(file) => Some(
      tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(Mutex::new(file)),
    ),
    Err(e) => {
      eprintln!("[Logger] Could not open live log {}: {}", path.display(), e);
      None
    }
  });

  let _ = tracing_subscriber::registry()
    .with(filter)
    .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
    .with(file_layer)
    .with(
      tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .without_time()
        .with_writer(BufferWriter),
    )
    .try_init();
}

fn open_live_log(path: &Path) -> Result<File> {
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent)?;
  }
  let mut file = File::options().create(true).append(true).open(path)?;
  writeln!(file, "=== LoL Viewer Log ===")?;
  writeln!(file, "Started: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
  writeln!(file, "{}", "=".repeat(60))?;
  Ok(file)
}

/// Push one line into the bounded buffer, dropping the oldest lines.
pub fn append_buffered(line: &str) {
  if let Ok(mut buf) = LOG_BUFFER.lock() {
    buf.push(line.to_string());
    if buf.len() > LOG_BUFFER_LIMIT {
      let excess = buf.len() - LOG_BUFFER_LIMIT;
      buf.drain(0..excess);
    }
  }
}

/// Snapshot of the most recent log lines, oldest first.
pub fn recent_logs() -> Vec<String> {
  LOG_BUFFER.lock().map(|buf| buf.clone()).unwrap_or_default()
}

#[derive(Clone, Copy)]
struct BufferWriter;

impl Write for BufferWriter {
  fn write(&mut self, data: &[u8]) -> io::Result<usize> {
    let text = String::from_utf8_lossy(data);
    for line in text.lines().filter(|l| !l.is_empty()) {
      append_buffered(line);
    }
    Ok(data.len())
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}

impl<'a> MakeWriter<'a> for BufferWriter {
  type Writer = BufferWriter;

  fn make_writer(&'a self) -> Self::Writer {
    *self
  }
}
