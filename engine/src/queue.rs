//! FIFO of commands awaiting output from the engine process.

use std::collections::VecDeque;

use tokio::sync::oneshot;

use crate::completion::CompletionPolicy;
use crate::error::EngineError;

pub type Reply = oneshot::Sender<Result<String, EngineError>>;

/// A request written to the engine whose response is still being collected.
#[derive(Debug)]
pub struct PendingCommand {
    pub id: u64,
    pub request: String,
    lines: Vec<String>,
    reply: Reply,
}

/// What happened to a line of engine output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// No command was waiting; the line was dropped.
    Unsolicited,
    /// Appended to the head command, which still wants more.
    Collected(u64),
    /// Completed and removed the head command.
    Resolved(u64),
}

/// Commands in submission order. Output always belongs to the head.
#[derive(Debug, Default)]
pub struct CommandQueue {
    pending: VecDeque<PendingCommand>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn push(&mut self, id: u64, request: String, reply: Reply) {
        self.pending.push_back(PendingCommand {
            id,
            request,
            lines: Vec::new(),
            reply,
        });
    }

    /// Drop a command that never reached the engine.
    pub fn remove(&mut self, id: u64) -> Option<PendingCommand> {
        let index = self.pending.iter().position(|cmd| cmd.id == id)?;
        self.pending.remove(index)
    }

    /// Route one output line to the head command.
    pub fn on_line(&mut self, line: String, policy: &dyn CompletionPolicy) -> LineOutcome {
        let Some(head) = self.pending.front_mut() else {
            return LineOutcome::Unsolicited;
        };
        head.lines.push(line);
        if !policy.is_complete(&head.request, &head.lines) {
            return LineOutcome::Collected(head.id);
        }

        let Some(cmd) = self.pending.pop_front() else {
            return LineOutcome::Unsolicited;
        };
        let id = cmd.id;
        let response = policy.finish(cmd.lines);
        if cmd.reply.send(Ok(response)).is_err() {
            tracing::debug!("Command #{} resolved after its caller stopped waiting", id);
        }
        LineOutcome::Resolved(id)
    }

    /// Fail and remove every queued command. Returns how many were failed.
    pub fn fail_all(&mut self, error: &EngineError) -> usize {
        let count = self.pending.len();
        for cmd in self.pending.drain(..) {
            tracing::debug!("Failing command #{} ({}): {}", cmd.id, cmd.request, error);
            let _ = cmd.reply.send(Err(error.clone()));
        }
        count
    }
}
