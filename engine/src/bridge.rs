//! Long-lived, restartable request/response pipe to the move generator.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chess::{format_fen, parse_move_list, Move, Position};
use tokio::sync::{watch, Mutex};

use crate::builder::run_build;
use crate::completion::{CompletionPolicy, SingleLine};
use crate::config::BridgeConfig;
use crate::error::EngineError;
use crate::process::{EngineProcess, Response};

/// Lifecycle of the engine process as seen by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    NotStarted,
    Running,
    Restarting,
    Terminated,
}

/// Owns the engine process and serializes every caller's requests into one
/// ordered stream.
///
/// Construct one per host and share it (for example behind an `Arc`); all
/// methods take `&self`. Requests are written in submission order and each
/// output line is matched to the oldest request still waiting.
pub struct EngineBridge {
    config: BridgeConfig,
    policy: Arc<dyn CompletionPolicy>,
    process: Mutex<Option<EngineProcess>>,
    state: Arc<watch::Sender<BridgeState>>,
    next_id: AtomicU64,
}

impl EngineBridge {
    /// A bridge using one-line-per-command framing. Nothing is launched yet.
    pub fn new(config: BridgeConfig) -> Self {
        Self::with_policy(config, SingleLine)
    }

    pub fn with_policy(config: BridgeConfig, policy: impl CompletionPolicy + 'static) -> Self {
        let (state, _) = watch::channel(BridgeState::NotStarted);
        Self {
            config,
            policy: Arc::new(policy),
            process: Mutex::new(None),
            state: Arc::new(state),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn state(&self) -> BridgeState {
        *self.state.borrow()
    }

    /// Watch lifecycle transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<BridgeState> {
        self.state.subscribe()
    }

    /// Launch the engine. A no-op while it is already running.
    pub async fn start(&self) -> Result<(), EngineError> {
        let mut slot = self.process.lock().await;
        if self.state() == BridgeState::Running && slot.is_some() {
            tracing::debug!("Engine already running");
            return Ok(());
        }
        if let Some(stale) = slot.take() {
            stale.terminate().await;
        }
        *slot = Some(self.launch().await?);
        Ok(())
    }

    /// Stop the engine, run the build step, and launch the fresh executable.
    ///
    /// Commands in flight fail with [`EngineError::ProcessExited`]. If the
    /// build fails the bridge is left `Terminated`; calling this again may
    /// recover it.
    #[tracing::instrument(level = "info", skip(self))]
    pub async fn rebuild_and_restart(&self) -> Result<(), EngineError> {
        let mut slot = self.process.lock().await;
        self.state.send_replace(BridgeState::Restarting);

        if let Some(old) = slot.take() {
            old.terminate().await;
        }

        if let Some(build) = &self.config.build {
            if let Err(e) = run_build(build).await {
                self.state.send_replace(BridgeState::Terminated);
                return Err(e);
            }
        } else {
            tracing::info!("No build step configured, relaunching as is");
        }

        *slot = Some(self.launch().await?);
        Ok(())
    }

    /// The process marks the bridge `Running` itself, before its output
    /// reader can observe an early exit.
    async fn launch(&self) -> Result<EngineProcess, EngineError> {
        EngineProcess::spawn(&self.config, Arc::clone(&self.policy), Arc::clone(&self.state))
            .await
            .inspect_err(|_| {
                self.state.send_replace(BridgeState::Terminated);
            })
    }

    /// Send one command and wait for its complete response.
    pub async fn submit(&self, command: &str) -> Result<String, EngineError> {
        let mut responses = self.enqueue(&[command]).await?;
        match responses.pop() {
            Some(response) => self.await_response(response).await,
            None => Err(EngineError::ProcessError("command was not queued".into())),
        }
    }

    /// Tell the engine which position to work on.
    pub async fn set_position(&self, fen: &str) -> Result<String, EngineError> {
        self.submit(&format!("position fen {}", fen)).await
    }

    /// Raw `getmoves` reply for the current engine position.
    pub async fn list_moves(&self) -> Result<String, EngineError> {
        self.submit("getmoves").await
    }

    /// Legal moves for `position`.
    ///
    /// The position and move-list commands are queued back to back so that no
    /// other caller's position can land between them. An `error` reply to the
    /// position fails with [`EngineError::PositionRejected`]; the move list
    /// would describe the engine's previous board.
    pub async fn legal_moves(&self, position: &Position) -> Result<Vec<Move>, EngineError> {
        let set_position = format!("position fen {}", format_fen(position));
        let mut responses = self.enqueue(&[set_position.as_str(), "getmoves"]).await?.into_iter();
        let (Some(position_reply), Some(moves_reply)) = (responses.next(), responses.next()) else {
            return Err(EngineError::ProcessError("commands were not queued".into()));
        };

        let accepted = self.await_response(position_reply).await?;
        if let Some(reason) = accepted.strip_prefix("error") {
            tracing::warn!("Engine rejected position: {}", reason.trim());
            return Err(EngineError::PositionRejected(reason.trim().to_string()));
        }
        let moves = self.await_response(moves_reply).await?;
        Ok(parse_move_list(&moves)?)
    }

    /// Kill the engine. Queued commands fail with `ProcessExited`.
    pub async fn shutdown(&self) {
        let mut slot = self.process.lock().await;
        if let Some(process) = slot.take() {
            tracing::info!("Shutting down engine");
            process.terminate().await;
        }
        self.state.send_replace(BridgeState::Terminated);
    }

    async fn enqueue(&self, commands: &[&str]) -> Result<Vec<Response>, EngineError> {
        let mut slot = self.process.lock().await;
        let state = self.state();
        let process = match slot.as_mut() {
            Some(process) if state == BridgeState::Running => process,
            _ => {
                return Err(EngineError::ProcessUnavailable(format!(
                    "engine is {:?}",
                    state
                )))
            }
        };

        let requests: Vec<(u64, String)> = commands
            .iter()
            .map(|command| {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                (id, command.to_string())
            })
            .collect();
        process.send(&requests).await
    }

    async fn await_response(&self, response: Response) -> Result<String, EngineError> {
        let outcome = match self.config.response_timeout {
            Some(limit) => match tokio::time::timeout(limit, response).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    tracing::warn!("No engine response within {:?}", limit);
                    return Err(EngineError::Timeout(limit));
                }
            },
            None => response.await,
        };
        outcome.map_err(|_| EngineError::ProcessExited)?
    }
}
