//! Bridge configuration.

use std::path::PathBuf;
use std::time::Duration;

/// How to launch the engine and, optionally, how to rebuild it.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub engine_path: PathBuf,
    pub engine_args: Vec<String>,
    pub build: Option<BuildCommand>,
    /// `None` waits forever for a response.
    pub response_timeout: Option<Duration>,
}

impl BridgeConfig {
    pub fn new(engine_path: impl Into<PathBuf>) -> Self {
        Self {
            engine_path: engine_path.into(),
            engine_args: Vec::new(),
            build: None,
            response_timeout: None,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.engine_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_build(mut self, build: BuildCommand) -> Self {
        self.build = Some(build);
        self
    }

    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = Some(timeout);
        self
    }
}

/// External compiler invocation that produces the engine executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCommand {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl BuildCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            working_dir: None,
        }
    }

    /// Split a command line on whitespace. `None` for an empty line.
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace();
        let program = parts.next()?;
        Some(Self::new(program, parts))
    }

    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

impl std::fmt::Display for BuildCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
