use crate::security::{ArgumentKind, ValidationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("invalid {kind}: {source}")]
    Validation {
        kind: ArgumentKind,
        #[source]
        source: ValidationError,
    },
    #[error("interpreter timed out after {seconds}s")]
    Timeout { seconds: u64 },
    #[error("interpreter failed: {message}")]
    Interpreter {
        message: String,
        exit_code: Option<i32>,
    },
    #[error("failed to launch interpreter: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    pub fn code(&self) -> &'static str {
        match self {
            BridgeError::Validation { .. } => "ValidationFailure",
            BridgeError::Timeout { .. } => "ExecutionTimeout",
            BridgeError::Interpreter { .. } => "InterpreterFailure",
            BridgeError::Spawn(_) => "SpawnFailure",
            BridgeError::Io(_) => "Io",
        }
    }

    /// True when the interpreter was never reached.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, BridgeError::Validation { .. })
    }
}

pub type BridgeResult<T> = Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_taxonomy() {
        let err = BridgeError::Validation {
            kind: ArgumentKind::Username,
            source: ValidationError::ReservedName,
        };
        assert_eq!(err.code(), "ValidationFailure");
        assert!(err.is_caller_error());
        assert_eq!(BridgeError::Timeout { seconds: 1 }.code(), "ExecutionTimeout");
        let err = BridgeError::Interpreter { message: "boom".into(), exit_code: Some(1) };
        assert_eq!(err.code(), "InterpreterFailure");
        assert!(!err.is_caller_error());
        assert_eq!(err.to_string(), "interpreter failed: boom");
    }
}
