//! chessbridge: drive a move-generation engine from the command line.
//!
//! The binary closes the loop between the chess core and the engine
//! process: it serializes a position, asks the engine for the legal moves,
//! and applies the chosen one locally.
//!
//! - `chessbridge moves [FEN]` prints the legal moves of a position.
//! - `chessbridge apply <FEN> <MOVE>` prints the position after a move.
//! - `chessbridge play [--fen FEN]` starts an interactive game (see
//!   [`session::HELP`]).
//!
//! Engine location, build command and response timeout come from
//! [`config`] and can be overridden by flags.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use chess::{apply_move, format_fen, parse_fen, BoardDiagram, Move, Position, STARTING_FEN};
use clap::{Parser, Subcommand};
use engine::{BridgeConfig, BuildCommand, EngineBridge};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod session;

use session::{Outcome, ReplCommand, Session};

#[derive(Parser)]
#[command(name = "chessbridge", about = "Query and play moves through an external move generator")]
struct Cli {
    /// Engine executable (overrides CHESSBRIDGE_ENGINE_PATH).
    #[arg(long, global = true)]
    engine: Option<PathBuf>,

    /// Command that rebuilds the engine (overrides CHESSBRIDGE_BUILD_CMD).
    #[arg(long, global = true)]
    build_cmd: Option<String>,

    /// Per-response timeout in milliseconds, 0 to wait forever
    /// (overrides CHESSBRIDGE_RESPONSE_TIMEOUT_MS).
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Run the build step before starting the engine.
    #[arg(long, global = true)]
    rebuild: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the legal moves of a position.
    Moves {
        /// Position in FEN; the starting position when omitted.
        fen: Option<String>,
    },
    /// Apply a move and print the resulting FEN.
    Apply {
        fen: String,
        /// Move in from/to form, e.g. e2e4.
        #[arg(value_name = "MOVE")]
        mv: String,
    },
    /// Play interactively.
    Play {
        #[arg(long)]
        fen: Option<String>,
    },
}

impl Cli {
    fn bridge_config(&self) -> BridgeConfig {
        let engine_path = self.engine.clone().unwrap_or_else(config::get_engine_path);
        let mut bridge_config = BridgeConfig::new(engine_path);

        let build_line = self.build_cmd.clone().unwrap_or_else(config::get_build_command);
        if let Some(build) = BuildCommand::parse(&build_line) {
            bridge_config = bridge_config.with_build(build);
        }

        let timeout_ms = self.timeout_ms.unwrap_or_else(config::get_response_timeout_ms);
        if timeout_ms > 0 {
            bridge_config = bridge_config.with_response_timeout(Duration::from_millis(timeout_ms));
        }
        bridge_config
    }
}

/// Log to stderr, or to a daily file when a log directory is configured.
///
/// The returned guard flushes the file writer and must be held until exit.
fn init_tracing() -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match config::get_log_dir().and_then(|dir| log_file_appender(&dir).ok()) {
        Some(file_appender) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false)
                        .with_target(true)
                        .with_line_number(true),
                )
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(filter)
                .init();
            None
        }
    }
}

fn log_file_appender(log_dir: &Path) -> std::io::Result<RollingFileAppender> {
    std::fs::create_dir_all(log_dir)?;
    Ok(tracing_appender::rolling::daily(log_dir, "chessbridge"))
}

fn parse_position(fen: Option<&str>) -> anyhow::Result<Position> {
    let fen = fen.unwrap_or(STARTING_FEN);
    parse_fen(fen).with_context(|| format!("invalid FEN: {}", fen))
}

async fn start_engine(bridge: &EngineBridge, rebuild: bool) -> anyhow::Result<()> {
    let engine_path = bridge.config().engine_path.display().to_string();
    if rebuild {
        bridge
            .rebuild_and_restart()
            .await
            .with_context(|| format!("failed to rebuild and start {}", engine_path))
    } else {
        bridge
            .start()
            .await
            .with_context(|| format!("failed to start {}", engine_path))
    }
}

async fn run_moves(bridge: &EngineBridge, fen: Option<&str>) -> anyhow::Result<()> {
    let position = parse_position(fen)?;
    let moves = bridge.legal_moves(&position).await?;
    println!("{}", session::join_moves(&moves));
    Ok(())
}

async fn run_apply(bridge: &EngineBridge, fen: &str, mv: &str) -> anyhow::Result<()> {
    let position = parse_position(Some(fen))?;
    let mv: Move = mv.parse()?;
    let legal = bridge.legal_moves(&position).await?;
    let next = apply_move(&position, mv, &legal)?.with_turn_advanced();
    println!("{}", format_fen(&next));
    Ok(())
}

async fn run_play(bridge: &EngineBridge, fen: Option<&str>) -> anyhow::Result<()> {
    let mut session = Session::new(parse_position(fen)?);
    println!("{}", BoardDiagram(session.current()));
    println!("Type `help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let outcome = match line.parse::<ReplCommand>() {
            Ok(command) => session.execute(bridge, command).await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok(Outcome::Print(text)) => println!("{}", text),
            Ok(Outcome::Quit) => break,
            Err(e) => println!("{}", e),
        }
    }

    tracing::info!("Session ended after {} move(s)", session.moves_played());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _guard = init_tracing();
    let cli = Cli::parse();

    let bridge = EngineBridge::new(cli.bridge_config());
    start_engine(&bridge, cli.rebuild).await?;

    let result = match &cli.command {
        Commands::Moves { fen } => run_moves(&bridge, fen.as_deref()).await,
        Commands::Apply { fen, mv } => run_apply(&bridge, fen, mv).await,
        Commands::Play { fen } => run_play(&bridge, fen.as_deref()).await,
    };

    bridge.shutdown().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_environment() {
        let cli = Cli::parse_from([
            "chessbridge",
            "--engine",
            "/opt/movegen",
            "--build-cmd",
            "make engine",
            "--timeout-ms",
            "0",
            "moves",
        ]);
        let config = cli.bridge_config();
        assert_eq!(config.engine_path, PathBuf::from("/opt/movegen"));
        assert_eq!(config.build, Some(BuildCommand::new("make", ["engine"])));
        assert!(config.response_timeout.is_none());
    }

    #[test]
    fn test_empty_build_command_disables_build() {
        let cli = Cli::parse_from(["chessbridge", "--build-cmd", "", "--timeout-ms", "250", "play"]);
        let config = cli.bridge_config();
        assert!(config.build.is_none());
        assert_eq!(config.response_timeout, Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_subcommands() {
        let cli = Cli::parse_from(["chessbridge", "apply", STARTING_FEN, "e2e4", "--rebuild"]);
        assert!(cli.rebuild);
        assert!(matches!(cli.command, Commands::Apply { ref mv, .. } if mv == "e2e4"));
    }

    #[test]
    fn test_parse_position_defaults_to_start() {
        assert_eq!(parse_position(None).unwrap(), Position::starting());
        assert!(parse_position(Some("not a fen")).is_err());
    }

    #[test]
    fn test_log_dir_is_created_on_demand() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs").join("nested");
        assert!(!log_dir.exists());
        log_file_appender(&log_dir).unwrap();
        assert!(log_dir.is_dir());
    }
}
