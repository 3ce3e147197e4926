// Detector service - polling loop, backoff and UI notifications

mod backoff;

#[cfg(test)]
mod tests;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub use backoff::PollBackoff;

use crate::config::DetectorConfig;
use crate::detector::{
  ChampionDetector, ChampionMap, Detection, DetectorEvent, GamePhase, GamePhaseTracker,
  MatchupPair,
};
use crate::error::{LcuError, Result};
use crate::lcu::LcuApi;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Owns the LCU connection and the detector, runs one detection pass per
/// tick and turns changes into [`DetectorEvent`]s.
pub struct ChampionDetectorService<A: LcuApi> {
  api: A,
  detector: ChampionDetector,
  config: DetectorConfig,
  backoff: PollBackoff,
  events: broadcast::Sender<DetectorEvent>,
  http: reqwest::Client,
  instance_id: Uuid,
  connected: bool,
  last_phase: GamePhase,
  last_champion: Option<String>,
  last_pairs: Vec<MatchupPair>,
  last_map_attempt: Option<Instant>,
}

impl<A: LcuApi> ChampionDetectorService<A> {
  pub fn new(api: A, config: DetectorConfig) -> Result<Self> {
    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(15))
      .build()
      .map_err(LcuError::ClientBuild)?;
    let detector = ChampionDetector::new(
      GamePhaseTracker::new(config.in_game_failure_tolerance),
      ChampionMap::default(),
    );
    let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

    Ok(Self {
      api,
      detector,
      backoff: PollBackoff::new(config.poll_interval(), config.max_backoff()),
      config,
      events,
      http,
      instance_id: Uuid::new_v4(),
      connected: false,
      last_phase: GamePhase::None,
      last_champion: None,
      last_pairs: Vec::new(),
      last_map_attempt: None,
    })
  }

  /// Use an already loaded champion map instead of fetching one.
  pub fn with_champion_map(mut self, champion_map: ChampionMap) -> Self {
    self.detector.set_champion_map(champion_map);
    self
  }

  pub fn subscribe(&self) -> broadcast::Receiver<DetectorEvent> {
    self.events.subscribe()
  }

  pub fn instance_id(&self) -> Uuid {
    self.instance_id
  }

  pub fn detector(&self) -> &ChampionDetector {
    &self.detector
  }

  pub fn is_connected(&self) -> bool {
    self.connected
  }

  pub fn current_interval(&self) -> Duration {
    self.backoff.current()
  }

  /// Fetch the champion map if it is still empty and the retry delay has
  /// passed since the last attempt.
  pub async fn ensure_champion_map(&mut self) {
    if !self.detector.champion_map().is_empty() {
      return;
    }
    if let Some(at) = self.last_map_attempt {
      if at.elapsed() < self.config.champion_map_retry() {
        return;
      }
    }
    self.last_map_attempt = Some(Instant::now());

    match ChampionMap::fetch(&self.http, &self.config.data_dragon_url).await {
      Ok(map) if !map.is_empty() => self.detector.set_champion_map(map),
      Ok(_) => warn!("[Service] Data Dragon returned no champions"),
      Err(e) => warn!(
        "[Service] Failed to load champion data, retrying in {}s: {}",
        self.config.champion_map_retry_secs, e
      ),
    }
  }

  /// One polling step. Returns how long to wait before the next one.
  pub async fn tick(&mut self) -> Duration {
    if !self.api.is_connected() {
      if !self.api.is_client_running() {
        self.set_connected(false);
        let delay = self.backoff.record_absent();
        debug!(
          "[Service] League client not running, next check in {}ms",
          delay.as_millis()
        );
        return delay;
      }

      if self.backoff.is_backing_off() {
        info!("[Service] League client found");
      }
      self.backoff.reset();

      if !self.api.connect() {
        debug!("[Service] Client running but credentials not available yet");
        self.set_connected(false);
        return self.backoff.current();
      }
    } else {
      self.backoff.reset();
    }
    self.set_connected(true);

    let detection = self
      .detector
      .detect_champion_and_enemies(&mut self.api)
      .await;
    self.publish_phase();
    self.publish_detection(detection);

    // A request may have dropped the connection during this pass
    self.set_connected(self.api.is_connected());
    self.backoff.current()
  }

  /// Tick until `cancel` fires. Each tick is awaited before sleeping, so ticks
  /// never overlap.
  pub async fn run(mut self, cancel: CancellationToken) {
    info!("[Service][{}] Detector loop started", self.instance_id);

    loop {
      let delay = tokio::select! {
        _ = cancel.cancelled() => break,
        delay = async {
          self.ensure_champion_map().await;
          self.tick().await
        } => delay,
      };

      tokio::select! {
        _ = cancel.cancelled() => break,
        _ = tokio::time::sleep(delay) => {}
      }
    }

    info!("[Service][{}] Detector loop stopped", self.instance_id);
  }

  fn set_connected(&mut self, connected: bool) {
    if connected == self.connected {
      return;
    }
    self.connected = connected;
    if connected {
      info!("[Service] Connected to League client");
    } else {
      info!("[Service] Disconnected from League client");
    }
    self.emit(DetectorEvent::ConnectionStatusChanged { connected });
  }

  fn publish_phase(&mut self) {
    let phase = self.detector.current_phase();
    if phase == self.last_phase {
      return;
    }
    let from = std::mem::replace(&mut self.last_phase, phase);
    self.emit(DetectorEvent::PhaseChanged { from, to: phase });

    if phase == GamePhase::ChampSelect {
      let queue = self.detector.phase_tracker().queue_info();
      if queue.is_aram {
        info!("[Service] ARAM champ select (queue {:?})", queue.queue_id);
      }
      self.emit(DetectorEvent::QueueDetected(queue));
    }
  }

  fn publish_detection(&mut self, detection: Detection) {
    match detection.own {
      Some(own) if self.last_champion.as_deref() != Some(own.name.as_str()) => {
        info!("[Service] Champion detected: {}", own.name);
        self.last_champion = Some(own.name.clone());
        self.emit(DetectorEvent::ChampionDetected {
          name: own.name,
          lane: own.lane,
        });
      }
      Some(_) => {}
      None => self.last_champion = None,
    }

    for name in detection.new_enemies {
      self.emit(DetectorEvent::EnemyDetected { name });
    }

    if detection.pairs != self.last_pairs {
      self.last_pairs = detection.pairs.clone();
      self.emit(DetectorEvent::MatchupPairsUpdated {
        pairs: detection.pairs,
      });
    }
  }

  fn emit(&self, event: DetectorEvent) {
    debug!("[Service] Event: {:?}", event);
    // No subscribers is fine
    let _ = self.events.send(event);
  }

  #[cfg(test)]
  pub(crate) fn api_mut(&mut self) -> &mut A {
    &mut self.api
  }
}

impl<A: LcuApi + Send + 'static> ChampionDetectorService<A> {
  /// Spawn the polling loop on the current tokio runtime.
  pub fn start(self) -> DetectorHandle {
    let cancel = CancellationToken::new();
    let running = Arc::new(AtomicBool::new(true));
    let events = self.events.clone();
    let instance_id = self.instance_id;

    let token = cancel.clone();
    let flag = running.clone();
    let task = tokio::spawn(async move {
      self.run(token).await;
      flag.store(false, Ordering::SeqCst);
    });

    DetectorHandle {
      events,
      cancel,
      running,
      task,
      instance_id,
    }
  }
}

/// Handle to a running detector loop.
pub struct DetectorHandle {
  events: broadcast::Sender<DetectorEvent>,
  cancel: CancellationToken,
  running: Arc<AtomicBool>,
  task: JoinHandle<()>,
  instance_id: Uuid,
}

impl DetectorHandle {
  pub fn subscribe(&self) -> broadcast::Receiver<DetectorEvent> {
    self.events.subscribe()
  }

  /// Ask the loop to stop at its next await point.
  pub fn stop(&self) {
    info!("[Service][{}] Stop requested", self.instance_id);
    self.cancel.cancel();
  }

  pub fn is_running(&self) -> bool {
    self.running.load(Ordering::SeqCst) && !self.task.is_finished()
  }

  pub fn instance_id(&self) -> Uuid {
    self.instance_id
  }

  /// Wait for the loop task to finish.
  pub async fn join(self) {
    if let Err(e) = self.task.await {
      warn!("[Service][{}] Detector task ended abnormally: {}", self.instance_id, e);
    }
  }
}
