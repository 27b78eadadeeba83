/*!
 * Error types for the boardcast application.
 *
 * This module contains custom error types for different parts of the pipeline,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors raised when invoking an external tool as a subprocess
#[derive(Error, Debug)]
pub enum ToolError {
    /// The tool binary could not be launched at all
    #[error("failed to launch {tool}: {message}")]
    LaunchFailed {
        /// Tool binary name
        tool: String,
        /// Underlying launch error
        message: String,
    },

    /// The tool ran but exited with a non-zero status
    #[error("{tool} exited with {status}: {stderr}")]
    NonZeroExit {
        /// Tool binary name
        tool: String,
        /// Exit status description
        status: String,
        /// Captured diagnostic output
        stderr: String,
    },

    /// The tool did not finish within the allowed time
    #[error("{tool} timed out after {seconds}s")]
    TimedOut {
        /// Tool binary name
        tool: String,
        /// Timeout that was exceeded
        seconds: u64,
    },

    /// A manifest or intermediate work file could not be prepared
    #[error("work file error: {0}")]
    WorkFile(String),
}

/// Errors returned by pipeline stage operations
///
/// Every variant that relates to a specific session carries the session
/// identifier so callers can report which workflow failed.
#[derive(Error, Debug)]
pub enum StageError {
    /// A required upload or field is missing or invalid - caller's fault, no retry
    #[error("session {session_id}: {message}")]
    Validation {
        /// Session the operation was issued for
        session_id: String,
        /// What is missing or invalid
        message: String,
    },

    /// The session identifier is unknown
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// A produced artifact (project file, rendered video) does not exist
    #[error("session {session_id}: {artifact} not found")]
    ArtifactNotFound {
        /// Session the artifact belongs to
        session_id: String,
        /// Which artifact was requested
        artifact: String,
    },

    /// A stage was invoked before its prerequisite stage completed
    #[error("session {session_id}: cannot {stage}, missing prerequisite: {missing}")]
    Precondition {
        /// Session the operation was issued for
        session_id: String,
        /// The stage that was attempted
        stage: String,
        /// The prerequisite that has not been satisfied
        missing: String,
    },

    /// An external collaborator (extractor, synthesizer, render tool) failed
    #[error("external tool error: {0}")]
    Tool(#[from] ToolError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a pipeline stage
    #[error("Stage error: {0}")]
    Stage(#[from] StageError),

    /// Error from an external tool
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
