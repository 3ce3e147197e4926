// lol-viewer: watches the local League client and prints detector events as JSON lines

use clap::Parser;
use std::path::PathBuf;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use lol_viewer_lib::config::{default_config_path, DetectorConfig};
use lol_viewer_lib::logging;
use lol_viewer_lib::{ChampionDetectorService, DetectorEvent, LcuConnectionManager};

#[derive(Parser, Debug)]
#[command(
  name = "lol-viewer",
  version,
  about = "Detects your champion, enemy picks and lane matchups from the League client"
)]
struct Cli {
  /// Config file (JSON). Defaults to the per-user config directory.
  #[arg(long)]
  config: Option<PathBuf>,

  /// Base polling interval in milliseconds
  #[arg(long)]
  interval_ms: Option<u64>,

  /// Maximum polling interval while the client is not running
  #[arg(long)]
  max_backoff_ms: Option<u64>,

  /// League install directory, for the lockfile fallback
  #[arg(long)]
  league_path: Option<PathBuf>,

  /// Append logs to this file instead of the default live log
  #[arg(long)]
  log_file: Option<PathBuf>,

  /// Debug logging
  #[arg(short, long)]
  verbose: bool,

  /// Run a single poll and exit
  #[arg(long)]
  once: bool,
}

impl Cli {
  fn apply(&self, config: &mut DetectorConfig) {
    if let Some(ms) = self.interval_ms {
      config.poll_interval_ms = ms;
    }
    if let Some(ms) = self.max_backoff_ms {
      config.max_backoff_ms = ms;
    }
    if let Some(path) = &self.league_path {
      config.league_path = Some(path.clone());
    }
    if let Some(path) = &self.log_file {
      config.log_file = Some(path.clone());
    }
    if self.verbose {
      config.log_level = "debug".to_string();
    }
  }
}

fn print_event(event: &DetectorEvent) {
  match serde_json::to_string(event) {
    Ok(line) => println!("{}", line),
    Err(e) => warn!("[Main] Could not serialize event: {}", e),
  }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  let cli = Cli::parse();

  let config_path = cli.config.clone().unwrap_or_else(default_config_path);
  let mut config = DetectorConfig::load(&config_path)?;
  cli.apply(&mut config);
  config.validate()?;

  let live_log = config.live_log_path();
  logging::init(&config.log_level, Some(live_log.as_path()));
  info!(
    "[Main] lol-viewer {} starting (poll {}ms, max backoff {}ms)",
    env!("CARGO_PKG_VERSION"),
    config.poll_interval_ms,
    config.max_backoff_ms
  );

  let connection = LcuConnectionManager::new(&config)?;
  let mut service = ChampionDetectorService::new(connection, config)?;

  if cli.once {
    let mut rx = service.subscribe();
    service.ensure_champion_map().await;
    service.tick().await;
    while let Ok(event) = rx.try_recv() {
      print_event(&event);
    }
    return Ok(());
  }

  let handle = service.start();
  let mut rx = handle.subscribe();

  loop {
    tokio::select! {
      _ = tokio::signal::ctrl_c() => {
        info!("[Main] Interrupted, shutting down");
        break;
      }
      event = rx.recv() => match event {
        Ok(event) => print_event(&event),
        Err(RecvError::Lagged(skipped)) => {
          warn!("[Main] Output fell behind, {} events skipped", skipped);
        }
        Err(RecvError::Closed) => break,
      },
    }
  }

  handle.stop();
  handle.join().await;
  Ok(())
}
