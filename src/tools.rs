use log::debug;
use std::process::Output;
use tokio::process::Command;

use crate::errors::ToolError;

// @module: Shared external-tool invocation

/// Run an external tool with captured output and a timeout
pub async fn run_tool(tool: &str, args: &[String], timeout_secs: u64) -> Result<Output, ToolError> {
    debug!("Running {} {}", tool, args.join(" "));

    let future = Command::new(tool).args(args).output();

    let timeout = std::time::Duration::from_secs(timeout_secs);
    tokio::select! {
        result = future => {
            result.map_err(|e| ToolError::LaunchFailed {
                tool: tool.to_string(),
                message: e.to_string(),
            })
        },
        _ = tokio::time::sleep(timeout) => {
            Err(ToolError::TimedOut { tool: tool.to_string(), seconds: timeout_secs })
        }
    }
}

/// Build a non-zero-exit error carrying the tail of the captured diagnostics
pub fn non_zero_exit(tool: &str, output: &Output) -> ToolError {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let tail: Vec<&str> = stderr.lines().rev().take(15).collect();
    let tail: Vec<&str> = tail.into_iter().rev().collect();

    ToolError::NonZeroExit {
        tool: tool.to_string(),
        status: output.status.to_string(),
        stderr: tail.join("\n"),
    }
}
