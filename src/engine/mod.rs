//! Bridge to an external UCI engine.
//!
//! The engine runs behind an [`EngineWorker`]; the bridge writes protocol
//! lines to it and reads its replies from an `mpsc` channel. At most one
//! best-move request is outstanding. [`EngineBridge::poll`] never blocks, so
//! the owner stays responsive while the engine thinks.

pub mod difficulty;
pub mod worker;

pub use difficulty::{Difficulty, DifficultySettings, DIFFICULTY_LEVELS};
pub use worker::{EngineWorker, ProcessWorker, WorkerEvent};

use crate::notation::CodedMove;
use crate::uci::{parse_reply, EngineCommand, EngineReply};
use log::{debug, error, info, trace, warn};
use std::path::Path;
use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start engine `{path}`: {source}")]
    Spawn { path: String, source: std::io::Error },
    #[error("engine process has no stdio pipes")]
    Pipes,
    #[error("engine i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("engine exited")]
    Exited,
    #[error("engine worker error: {0}")]
    Worker(String),
    #[error("engine not ready after {0:?}")]
    LoadTimeout(Duration),
    #[error("engine not ready")]
    NotReady,
    #[error("a best-move request is already pending")]
    Busy,
}

#[derive(Debug, Clone, Copy)]
pub struct BridgeConfig {
    pub load_timeout: Duration,
    /// After this long a search is told to `stop`.
    pub search_timeout: Duration,
    /// How long to wait for `bestmove` after `stop` before giving up.
    pub stop_grace: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            load_timeout: Duration::from_secs(15),
            search_timeout: Duration::from_secs(10),
            stop_grace: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPoll {
    /// No request outstanding.
    Idle,
    Pending,
    /// The request resolved; `None` means the engine produced no usable move.
    Done(Option<CodedMove>),
}

#[derive(Debug, Clone, Copy)]
struct PendingSearch {
    started: Instant,
    stop_sent: bool,
}

pub struct EngineBridge {
    worker: Box<dyn EngineWorker>,
    events: Receiver<WorkerEvent>,
    config: BridgeConfig,
    name: Option<String>,
    ready: bool,
    connected: bool,
    pending: Option<PendingSearch>,
    // Searches given up on whose `bestmove` has not arrived yet
    abandoned: usize,
}

impl EngineBridge {
    pub fn new(worker: Box<dyn EngineWorker>, events: Receiver<WorkerEvent>, config: BridgeConfig) -> Self {
        Self { worker, events, config, name: None, ready: false, connected: true, pending: None, abandoned: 0 }
    }

    /// Starts the engine binary at `path`. Call [`EngineBridge::load`] next.
    pub fn spawn(path: &Path, config: BridgeConfig) -> Result<Self, EngineError> {
        let (worker, events) = ProcessWorker::spawn(path)?;
        Ok(Self::new(Box::new(worker), events, config))
    }

    pub fn config(&self) -> BridgeConfig { self.config }
    pub fn name(&self) -> Option<&str> { self.name.as_deref() }
    pub fn is_ready(&self) -> bool { self.ready }
    pub fn is_thinking(&self) -> bool { self.pending.is_some() }

    fn send(&mut self, cmd: EngineCommand) -> Result<(), EngineError> {
        let line = cmd.to_string();
        trace!(">> {line}");
        self.worker.post(&line)?;
        Ok(())
    }

    /// `uci` + `isready` handshake; blocks until `readyok` or the load timeout.
    pub fn load(&mut self) -> Result<(), EngineError> {
        self.send(EngineCommand::Uci)?;
        self.send(EngineCommand::IsReady)?;
        let deadline = Instant::now() + self.config.load_timeout;
        while !self.ready {
            let left = deadline.saturating_duration_since(Instant::now());
            match self.events.recv_timeout(left) {
                Ok(WorkerEvent::Line(line)) => { self.handle_line(&line); }
                Ok(WorkerEvent::Error(msg)) => {
                    error!("engine worker error during load: {msg}");
                    return Err(EngineError::Worker(msg));
                }
                Ok(WorkerEvent::Exited) | Err(RecvTimeoutError::Disconnected) => {
                    self.connected = false;
                    return Err(EngineError::Exited);
                }
                Err(RecvTimeoutError::Timeout) => return Err(EngineError::LoadTimeout(self.config.load_timeout)),
            }
        }
        info!("engine ready: {}", self.name.as_deref().unwrap_or("unnamed"));
        Ok(())
    }

    /// Tells the engine a fresh game begins; abandons any running search.
    pub fn new_game(&mut self) -> Result<(), EngineError> {
        self.stop();
        self.send(EngineCommand::UciNewGame)
    }

    /// Configures strength, sends the position and starts a depth-limited
    /// search. Resolve it with [`EngineBridge::poll`] or [`EngineBridge::wait`].
    pub fn request_best_move(&mut self, fen: &str, difficulty: Difficulty) -> Result<(), EngineError> {
        if !self.ready { return Err(EngineError::NotReady); }
        if self.pending.is_some() { return Err(EngineError::Busy); }
        let settings = difficulty.settings();
        self.send(EngineCommand::SetOption { name: "Skill Level".into(), value: settings.skill_level.to_string() })?;
        self.send(EngineCommand::PositionFen(fen.to_string()))?;
        self.send(EngineCommand::GoDepth(settings.depth))?;
        self.pending = Some(PendingSearch { started: Instant::now(), stop_sent: false });
        debug!("search started: level {} depth {}", difficulty.level(), settings.depth);
        Ok(())
    }

    /// Advisory stop: posts `stop` and drops the pending request without
    /// waiting. Its late `bestmove` is discarded.
    pub fn stop(&mut self) {
        if self.pending.take().is_none() { return; }
        self.abandoned += 1;
        if let Err(e) = self.send(EngineCommand::Stop) { warn!("failed to send stop: {e}"); }
    }

    pub fn poll(&mut self) -> SearchPoll { self.pump(Duration::ZERO) }

    /// Blocks until the pending request resolves. Bounded by the search
    /// timeout plus the stop grace period.
    pub fn wait(&mut self) -> Option<CodedMove> {
        loop {
            match self.pump(Duration::from_millis(20)) {
                SearchPoll::Pending => continue,
                SearchPoll::Idle => return None,
                SearchPoll::Done(mv) => return mv,
            }
        }
    }

    fn pump(&mut self, block: Duration) -> SearchPoll {
        let mut wait = block;
        while let Some(event) = self.next_event(wait) {
            wait = Duration::ZERO;
            if let Some(result) = self.handle_event(event) {
                return SearchPoll::Done(result);
            }
        }
        self.enforce_timeout()
    }

    fn next_event(&mut self, wait: Duration) -> Option<WorkerEvent> {
        if !self.connected { return None; }
        let got = if wait.is_zero() {
            self.events.try_recv().map_err(|e| matches!(e, TryRecvError::Disconnected))
        } else {
            self.events.recv_timeout(wait).map_err(|e| matches!(e, RecvTimeoutError::Disconnected))
        };
        match got {
            Ok(ev) => Some(ev),
            Err(true) => Some(WorkerEvent::Exited),
            Err(false) => None,
        }
    }

    // Some(result) when the pending request resolved.
    fn handle_event(&mut self, event: WorkerEvent) -> Option<Option<CodedMove>> {
        match event {
            WorkerEvent::Line(line) => self.handle_line(&line),
            WorkerEvent::Error(msg) => {
                error!("engine worker error: {msg}");
                self.pending.take().map(|_| None)
            }
            WorkerEvent::Exited => {
                error!("engine exited");
                self.connected = false;
                self.ready = false;
                self.pending.take().map(|_| None)
            }
        }
    }

    fn handle_line(&mut self, line: &str) -> Option<Option<CodedMove>> {
        trace!("<< {line}");
        match parse_reply(line) {
            EngineReply::ReadyOk => { self.ready = true; None }
            EngineReply::Id { key, value } if key == "name" => { self.name = Some(value); None }
            EngineReply::BestMove { best, .. } => {
                if self.abandoned > 0 {
                    self.abandoned -= 1;
                    debug!("discarding bestmove {best:?} from an abandoned search");
                    return None;
                }
                if self.pending.take().is_none() {
                    warn!("bestmove {best:?} with no search pending");
                    return None;
                }
                let mv = best.as_deref().and_then(|b| match b.parse::<CodedMove>() {
                    Ok(m) => Some(m),
                    Err(e) => { warn!("engine sent unusable move `{b}`: {e}"); None }
                });
                Some(mv)
            }
            _ => None,
        }
    }

    fn enforce_timeout(&mut self) -> SearchPoll {
        let Some(search) = self.pending else { return SearchPoll::Idle; };
        let elapsed = search.started.elapsed();
        if !search.stop_sent && elapsed >= self.config.search_timeout {
            warn!("search ran past {:?}; sending stop", self.config.search_timeout);
            self.pending = Some(PendingSearch { stop_sent: true, ..search });
            if let Err(e) = self.send(EngineCommand::Stop) { warn!("failed to send stop: {e}"); }
        } else if search.stop_sent && elapsed >= self.config.search_timeout + self.config.stop_grace {
            warn!("engine ignored stop; giving up on this search");
            self.pending = None;
            self.abandoned += 1;
            return SearchPoll::Done(None);
        }
        SearchPoll::Pending
    }
}

impl Drop for EngineBridge {
    fn drop(&mut self) { self.worker.terminate(); }
}
