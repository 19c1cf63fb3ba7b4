//! Response framing policies.
//!
//! The engine's output is an unframed line stream. A policy decides, for the
//! command at the head of the queue, when the lines collected so far make up
//! its whole reply.

/// Decides when a command's response is complete.
pub trait CompletionPolicy: Send + Sync {
    /// `lines` holds every line received for `request` so far, latest last.
    fn is_complete(&self, request: &str, lines: &[String]) -> bool;

    /// Turn the collected lines into the response handed to the caller.
    fn finish(&self, lines: Vec<String>) -> String {
        lines.join("\n")
    }
}

/// One line per command. This is the framing the movegen process uses.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleLine;

impl CompletionPolicy for SingleLine {
    fn is_complete(&self, _request: &str, lines: &[String]) -> bool {
        !lines.is_empty()
    }
}

/// Complete once a fixed number of lines has arrived.
#[derive(Debug, Clone, Copy)]
pub struct LineCount(pub usize);

impl CompletionPolicy for LineCount {
    fn is_complete(&self, _request: &str, lines: &[String]) -> bool {
        lines.len() >= self.0.max(1)
    }
}

/// Complete when a line equal to the sentinel arrives. The sentinel itself is
/// not part of the response.
#[derive(Debug, Clone)]
pub struct Terminator(pub String);

impl CompletionPolicy for Terminator {
    fn is_complete(&self, _request: &str, lines: &[String]) -> bool {
        lines.last().is_some_and(|line| *line == self.0)
    }

    fn finish(&self, mut lines: Vec<String>) -> String {
        if lines.last().is_some_and(|line| *line == self.0) {
            lines.pop();
        }
        lines.join("\n")
    }
}
