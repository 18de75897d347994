//! Error types for the conductor CLI.
//!
//! Uses thiserror for derive macros. These errors only exist at the
//! application edge: agent execution failures are carried on
//! [`AgentResult`](crate::agent::AgentResult) instead.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for conductor operations.
#[derive(Error, Debug)]
pub enum ConductorError {
    /// User provided invalid arguments or input files.
    #[error("{0}")]
    UserError(String),

    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Orchestration completed but one or more agents failed.
    #[error("Agent failure: {0}")]
    AgentFailure(String),
}

impl ConductorError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ConductorError::UserError(_) => exit_codes::USER_ERROR,
            ConductorError::ConfigError(_) => exit_codes::CONFIG_ERROR,
            ConductorError::AgentFailure(_) => exit_codes::AGENT_FAILURE,
        }
    }
}

/// Result type alias for conductor operations.
pub type Result<T> = std::result::Result<T, ConductorError>;
