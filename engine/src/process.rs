//! One running instance of the external move-generation process.

use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

use crate::bridge::BridgeState;
use crate::completion::CompletionPolicy;
use crate::config::BridgeConfig;
use crate::error::EngineError;
use crate::queue::{CommandQueue, LineOutcome};

pub(crate) type Response = oneshot::Receiver<Result<String, EngineError>>;
type SharedQueue = Arc<Mutex<CommandQueue>>;

pub(crate) struct EngineProcess {
    child: Child,
    stdin: ChildStdin,
    queue: SharedQueue,
    reader: JoinHandle<()>,
    stderr_reader: Option<JoinHandle<()>>,
}

impl EngineProcess {
    /// Launch the engine and start routing its output into a fresh queue.
    #[tracing::instrument(level = "info", skip_all, fields(path = %config.engine_path.display()))]
    pub(crate) async fn spawn(
        config: &BridgeConfig,
        policy: Arc<dyn CompletionPolicy>,
        state: Arc<watch::Sender<BridgeState>>,
    ) -> Result<Self, EngineError> {
        tracing::debug!("Spawning engine process");
        let mut child = tokio::process::Command::new(&config.engine_path)
            .args(&config.engine_args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                tracing::error!("Failed to spawn engine: {}", e);
                EngineError::ProcessUnavailable(format!(
                    "failed to spawn {}: {}",
                    config.engine_path.display(),
                    e
                ))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::ProcessUnavailable("engine has no stdin".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::ProcessUnavailable("engine has no stdout".into()))?;

        let stderr_reader = child.stderr.take().map(|stderr| {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    tracing::warn!("Engine stderr: {}", line);
                }
            })
        });

        let queue: SharedQueue = Arc::new(Mutex::new(CommandQueue::new()));
        state.send_replace(BridgeState::Running);
        let reader = tokio::spawn(read_output(stdout, Arc::clone(&queue), policy, state));

        tracing::info!("Engine process started (pid {:?})", child.id());
        Ok(Self {
            child,
            stdin,
            queue,
            reader,
            stderr_reader,
        })
    }

    /// Queue each request and write it to the engine, in order.
    ///
    /// A request is queued before it is written so that a fast reply always
    /// finds its command.
    pub(crate) async fn send(
        &mut self,
        requests: &[(u64, String)],
    ) -> Result<Vec<Response>, EngineError> {
        let mut responses = Vec::with_capacity(requests.len());
        for (id, request) in requests {
            let (tx, rx) = oneshot::channel();
            lock(&self.queue).push(*id, request.clone(), tx);

            tracing::trace!(">> {}", request);
            if let Err(e) = self.write_line(request).await {
                tracing::error!("Failed to write command #{} to engine: {}", id, e);
                let error = EngineError::ProcessError(format!("failed to write to engine: {}", e));
                let failed = lock(&self.queue).fail_all(&error);
                tracing::warn!("Failed {} pending command(s): {}", failed, error);
                return Err(error);
            }
            tracing::debug!("Queued command #{}: {}", id, request);
            responses.push(rx);
        }
        Ok(responses)
    }

    async fn write_line(&mut self, request: &str) -> std::io::Result<()> {
        let mut line = String::with_capacity(request.len() + 1);
        line.push_str(request);
        line.push('\n');
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await
    }

    /// Stop the process. Commands still waiting fail with `ProcessExited`.
    pub(crate) async fn terminate(mut self) {
        self.reader.abort();
        let _ = self.reader.await;
        if let Some(stderr_reader) = self.stderr_reader.take() {
            stderr_reader.abort();
        }

        if let Err(e) = self.child.kill().await {
            tracing::warn!("Failed to kill engine process: {}", e);
        }
        let failed = lock(&self.queue).fail_all(&EngineError::ProcessExited);
        if failed > 0 {
            tracing::info!("Abandoned {} in-flight command(s)", failed);
        }
        tracing::info!("Engine process terminated");
    }
}

/// Route every output line to the head of the queue until the stream ends.
async fn read_output(
    stdout: ChildStdout,
    queue: SharedQueue,
    policy: Arc<dyn CompletionPolicy>,
    state: Arc<watch::Sender<BridgeState>>,
) {
    let mut reader = BufReader::new(stdout);
    let mut line = Vec::new();

    let failure = loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) => {
                tracing::warn!("Engine stdout EOF - engine closed");
                break EngineError::ProcessExited;
            }
            Ok(_) => {
                let text = String::from_utf8_lossy(&line)
                    .trim_end_matches(['\n', '\r'])
                    .to_string();
                tracing::trace!("<< {}", text);
                let outcome = lock(&queue).on_line(text.clone(), policy.as_ref());
                match outcome {
                    LineOutcome::Unsolicited => {
                        tracing::warn!("Received output but no pending commands: {}", text);
                    }
                    LineOutcome::Collected(id) => {
                        tracing::trace!("Command #{} awaiting more output", id);
                    }
                    LineOutcome::Resolved(id) => {
                        tracing::debug!("Command #{} resolved", id);
                    }
                }
            }
            Err(e) => {
                tracing::error!("Error reading from engine stdout: {}", e);
                break EngineError::ProcessError(e.to_string());
            }
        }
    };

    let failed = lock(&queue).fail_all(&failure);
    if failed > 0 {
        tracing::warn!("Failed {} pending command(s): {}", failed, failure);
    }
    state.send_replace(BridgeState::Terminated);
    tracing::info!("Output reader task exiting");
}

fn lock(queue: &SharedQueue) -> std::sync::MutexGuard<'_, CommandQueue> {
    queue.lock().unwrap_or_else(PoisonError::into_inner)
}
