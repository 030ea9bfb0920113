//! Error types for the AudioSwitch agent.

use thiserror::Error;

/// Main error type for the agent.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Controller error: {0}")]
    Controller(#[from] ControllerError),

    #[error("Preferences error: {0}")]
    Preferences(#[from] PreferencesError),
}

/// Failures talking to the external endpoint controller.
///
/// A missing preferred device is not represented here: that is an
/// expected condition and surfaces as `Selection::NotFound` instead.
#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("Controller executable could not be launched ({program}): {source}")]
    Unavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed controller output (line {line:?}): {reason}")]
    MalformedOutput { line: String, reason: String },
}

#[derive(Error, Debug)]
pub enum PreferencesError {
    #[error("Preferences file operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Preferences parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type alias for agent operations.
pub type AgentResult<T> = Result<T, AgentError>;
