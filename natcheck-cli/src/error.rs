//! CLI-specific error types and exit code mapping

use natcheck_core::error::NatcheckError;
use natcheck_verifier::VerifierError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to standard Unix exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// Cannot reach the manager endpoint (e.g., for `ping`).
    #[error("manager not reachable: {0}")]
    ManagerUnavailable(String),

    /// A lifecycle scenario ran but did not pass.
    #[error("scenario failed: {0}")]
    ScenarioFailed(String),

    /// A one-shot check ran but did not pass.
    #[error("check failed: {0}")]
    CheckFailed(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from natcheck-core.
    #[error("{0}")]
    Core(#[from] NatcheckError),

    /// Verification error from natcheck-verifier.
    #[error("{0}")]
    Verify(String),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                              |
    /// |------|--------------------------------------|
    /// | 0    | Success                              |
    /// | 1    | General / command error              |
    /// | 2    | Configuration error                  |
    /// | 3    | Manager unreachable                  |
    /// | 4    | Scenario or check failed             |
    /// | 10   | IO error                             |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::ManagerUnavailable(_) => 3,
            Self::ScenarioFailed(_) | Self::CheckFailed(_) => 4,
            Self::Io(_) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) | Self::Verify(_) => 1,
        }
    }
}

impl From<VerifierError> for CliError {
    fn from(e: VerifierError) -> Self {
        match e {
            VerifierError::Config { .. } => Self::Config(e.to_string()),
            VerifierError::Transport(_) => Self::ManagerUnavailable(e.to_string()),
            other => Self::Verify(other.to_string()),
        }
    }
}
