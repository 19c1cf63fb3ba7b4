//! Runtime configuration for the chessbridge CLI.
//!
//! Every value has a compile-time default and can be overridden through a
//! dedicated environment variable. Command-line flags, when given, take
//! precedence over both (see `main.rs`).

use std::path::PathBuf;

/// Default location of the compiled move-generation engine.
const DEFAULT_ENGINE_PATH: &str = "../engine/engine";

/// Default command that recompiles the engine.
const DEFAULT_BUILD_CMD: &str = "g++ -o ../engine/engine ../engine/main.cpp";

/// Default time to wait for one engine reply (in milliseconds).
const DEFAULT_RESPONSE_TIMEOUT_MS: u64 = 5000;

/// Get the engine executable path.
///
/// Priority:
/// 1. `CHESSBRIDGE_ENGINE_PATH` env variable if set
/// 2. `../engine/engine` as fallback
pub fn get_engine_path() -> PathBuf {
    if let Ok(path) = std::env::var("CHESSBRIDGE_ENGINE_PATH") {
        return PathBuf::from(path);
    }

    PathBuf::from(DEFAULT_ENGINE_PATH)
}

/// Get the build command line, split on whitespace by the caller.
///
/// Priority:
/// 1. `CHESSBRIDGE_BUILD_CMD` env variable if set
/// 2. `g++ -o ../engine/engine ../engine/main.cpp` as fallback
pub fn get_build_command() -> String {
    if let Ok(command) = std::env::var("CHESSBRIDGE_BUILD_CMD") {
        return command;
    }

    DEFAULT_BUILD_CMD.to_string()
}

/// Get the per-response timeout in milliseconds. `0` disables the timeout.
///
/// Priority:
/// 1. `CHESSBRIDGE_RESPONSE_TIMEOUT_MS` env variable if set (falls back to
///    the default if the value cannot be parsed as a `u64`)
/// 2. `5000` as fallback
pub fn get_response_timeout_ms() -> u64 {
    if let Ok(timeout) = std::env::var("CHESSBRIDGE_RESPONSE_TIMEOUT_MS") {
        return timeout.parse().unwrap_or(DEFAULT_RESPONSE_TIMEOUT_MS);
    }

    DEFAULT_RESPONSE_TIMEOUT_MS
}

/// Get the directory for rolling log files, if file logging is wanted.
///
/// `None` unless `CHESSBRIDGE_LOG_DIR` is set; logs then go to stderr.
pub fn get_log_dir() -> Option<PathBuf> {
    std::env::var_os("CHESSBRIDGE_LOG_DIR").map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_engine_path() {
        let path = get_engine_path();
        match std::env::var("CHESSBRIDGE_ENGINE_PATH") {
            Ok(val) => assert_eq!(path, PathBuf::from(val)),
            Err(_) => assert_eq!(path, PathBuf::from(DEFAULT_ENGINE_PATH)),
        }
    }

    #[test]
    fn test_get_build_command() {
        let command = get_build_command();
        match std::env::var("CHESSBRIDGE_BUILD_CMD") {
            Ok(val) => assert_eq!(command, val),
            Err(_) => assert_eq!(command, DEFAULT_BUILD_CMD),
        }
    }

    #[test]
    fn test_get_response_timeout_ms_default() {
        if std::env::var("CHESSBRIDGE_RESPONSE_TIMEOUT_MS").is_err() {
            assert_eq!(get_response_timeout_ms(), DEFAULT_RESPONSE_TIMEOUT_MS);
        }
    }

    #[test]
    fn test_get_log_dir() {
        match std::env::var_os("CHESSBRIDGE_LOG_DIR") {
            Some(val) => assert_eq!(get_log_dir(), Some(PathBuf::from(val))),
            None => assert!(get_log_dir().is_none()),
        }
    }
}
