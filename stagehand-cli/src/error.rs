//! CLI-specific error types and exit code mapping

use stagehand_core::error::{ProvisionError, StagehandError};
use stagehand_runner::RegistryError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// A suite hit a fatal error and the run was stopped.
    #[error("{0}")]
    Aborted(String),

    /// Target or suite registration conflict.
    #[error("registration error: {0}")]
    Registry(#[from] RegistryError),

    /// The tracing subscriber could not be installed.
    #[error("logging error: {0}")]
    Logging(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from stagehand-core.
    #[error("{0}")]
    Core(#[from] StagehandError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                                  |
    /// |------|------------------------------------------|
    /// | 0    | Success (failed tests included)          |
    /// | 1    | Run aborted / general command error      |
    /// | 2    | Configuration error                      |
    /// | 3    | Provisioning or naming error             |
    /// | 4    | Teardown error                           |
    /// | 10   | IO error                                 |
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::Core(StagehandError::Config(_)) => 2,
            Self::Core(StagehandError::Provision(ProvisionError::TeardownFailed { .. })) => 4,
            Self::Core(StagehandError::Provision(_)) => 3,
            Self::Io(_) | Self::Core(StagehandError::Io(_)) => 10,
            Self::Command(_)
            | Self::Aborted(_)
            | Self::Registry(_)
            | Self::Logging(_)
            | Self::JsonSerialize(_)
            | Self::Core(StagehandError::Service(_)) => 1,
        }
    }

    /// 에러가 발생한 작업 컨텍스트 라벨 (stderr 첫 줄)
    pub fn location(&self) -> &str {
        match self {
            Self::Core(e) => e.location(),
            Self::Config(_) => "Loading configuration:",
            Self::Aborted(_) => "Running suites:",
            Self::Registry(_) => "Registering suites:",
            Self::Logging(_) => "Initializing logging:",
            Self::Io(_) | Self::JsonSerialize(_) => "Writing output:",
            Self::Command(_) => "Running command:",
        }
    }
}
