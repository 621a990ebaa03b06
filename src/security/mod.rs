//! Everything standing between caller arguments and the interpreter.

pub mod confirm;
pub mod escape;
pub mod validate;

pub use confirm::{ConfirmationGate, DangerousOperation};
pub use escape::{escape, EscapedArgument};
pub use validate::{validate, ArgumentKind, ValidationError, ValidationResult};

use crate::errors::BridgeError;

/// Validates `raw` as `kind` and escapes it for a double-quoted literal.
pub fn checked(raw: &str, kind: ArgumentKind) -> Result<EscapedArgument, BridgeError> {
    validate(raw, kind).map_err(|source| BridgeError::Validation { kind, source })?;
    Ok(escape(raw))
}
