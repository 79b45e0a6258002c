//! Error types for the contract binding facade

use tact_abi::{AbiError, CellError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BindingError {
    #[error(transparent)]
    Abi(#[from] AbiError),

    #[error("Invalid message type: {0}")]
    InvalidMessageType(String),

    #[error("Unknown get-method: {0}")]
    UnknownMethod(String),

    /// The contract exited with a non-success code
    #[error("{}", execution_message(.code, .description))]
    Execution {
        code: u32,
        /// Entry of the binding's error table, if the code is known
        description: Option<String>,
        debug_logs: Vec<String>,
    },

    #[error("Dependency {0} is already registered")]
    DuplicateDependency(u16),

    #[error("Malformed dependency dictionary: {0}")]
    MalformedDependencies(&'static str),

    /// Anything the executor failed with that is not an exit code
    #[error(transparent)]
    Executor(anyhow::Error),
}

impl BindingError {
    /// Exit code of a failed execution
    pub fn exit_code(&self) -> Option<u32> {
        match self {
            BindingError::Execution { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<CellError> for BindingError {
    fn from(err: CellError) -> Self {
        BindingError::Abi(err.into())
    }
}

fn execution_message(code: &u32, description: &Option<String>) -> String {
    match description {
        Some(description) => format!("{description} (exit code {code})"),
        None => format!("Execution failed with exit code {code}"),
    }
}

/// Convenient Result type
pub type Result<T> = std::result::Result<T, BindingError>;
