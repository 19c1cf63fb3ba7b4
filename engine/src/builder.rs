use std::process::Stdio;

use crate::config::BuildCommand;
use crate::error::EngineError;

/// Run the build step to completion.
///
/// A nonzero exit status, or a build tool that cannot be launched at all,
/// fails with [`EngineError::BuildFailed`] carrying the tool's diagnostics.
#[tracing::instrument(level = "info", skip_all, fields(command = %build))]
pub async fn run_build(build: &BuildCommand) -> Result<(), EngineError> {
    tracing::info!("Building engine");
    let mut command = tokio::process::Command::new(&build.program);
    command
        .args(&build.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = &build.working_dir {
        command.current_dir(dir);
    }

    let output = command.output().await.map_err(|e| {
        tracing::error!("Failed to launch build tool: {}", e);
        EngineError::BuildFailed {
            status: "not started".to_string(),
            output: e.to_string(),
        }
    })?;

    if output.status.success() {
        tracing::info!("Engine built successfully");
        return Ok(());
    }

    let mut diagnostics = String::from_utf8_lossy(&output.stderr).into_owned();
    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.trim().is_empty() {
        if !diagnostics.is_empty() && !diagnostics.ends_with('\n') {
            diagnostics.push('\n');
        }
        diagnostics.push_str(&stdout);
    }
    tracing::error!("Engine build failed ({}): {}", output.status, diagnostics.trim());
    Err(EngineError::BuildFailed {
        status: output.status.to_string(),
        output: diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_successful_build() {
        let build = BuildCommand::new("sh", ["-c", "exit 0"]);
        assert!(run_build(&build).await.is_ok());
    }

    #[tokio::test]
    async fn test_nonzero_status_carries_diagnostics() {
        let build = BuildCommand::new("sh", ["-c", "echo 'main.cpp:1: error' >&2; exit 3"]);
        match run_build(&build).await {
            Err(EngineError::BuildFailed { output, .. }) => {
                assert!(output.contains("main.cpp:1: error"));
            }
            other => panic!("expected BuildFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_build_tool() {
        let build = BuildCommand::new("definitely-not-a-compiler-7f3a", Vec::<String>::new());
        assert!(matches!(
            run_build(&build).await,
            Err(EngineError::BuildFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_runs_in_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        let build = BuildCommand::new("sh", ["-c", "touch built.marker"]).in_dir(dir.path());
        run_build(&build).await.unwrap();
        assert!(dir.path().join("built.marker").exists());
    }
}
