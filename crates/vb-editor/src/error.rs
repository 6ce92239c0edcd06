//! Error types for command registration and dispatch.

use thiserror::Error;
use vb_core::ModelError;

pub type CommandResult<T> = Result<T, CommandError>;

#[derive(Debug, Error)]
pub enum CommandError {
    /// No command registered under this name.
    #[error("unknown command: {0}")]
    Unknown(String),

    /// A command with this name is already registered.
    #[error("command already registered: {0}")]
    Duplicate(String),

    /// A keyboard binding string could not be parsed.
    #[error("invalid keyboard binding {binding:?} for command {command}")]
    InvalidBinding { command: String, binding: String },

    /// The arguments passed to a command do not fit it.
    #[error("invalid arguments for {command}: {reason}")]
    InvalidArgs { command: String, reason: String },

    /// Block data crossing the JSON boundary was malformed.
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl CommandError {
    pub fn invalid_args(command: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArgs {
            command: command.to_string(),
            reason: reason.into(),
        }
    }
}
