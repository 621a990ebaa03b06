//! Closed option sets for the domain operations exposed by the CLI.
//!
//! Each operation only picks a command template and routes every caller
//! string through `security::checked` before interpolation. Flags that an
//! operation does not declare are rejected by the argument parser instead of
//! reaching a command string.

pub mod app;
pub mod disk;
pub mod file;
pub mod process;
pub mod registry;
pub mod script;
pub mod service;
pub mod system;
pub mod user;

use crate::{bridge::ExecutionRequest, errors::BridgeResult, security::DangerousOperation};
use std::{fmt, str::FromStr};

pub trait Operation: Send + Sync {
    /// Identifier used in audit lines, e.g. `registry.delete`.
    fn action(&self) -> &'static str;

    /// What the operation targets. Never includes secrets.
    fn detail(&self) -> String;

    /// Validates and escapes every argument, then renders the command.
    fn request(&self) -> BridgeResult<ExecutionRequest>;

    fn danger(&self) -> Option<DangerousOperation> {
        None
    }

    /// Read-only operations are not audited.
    fn mutating(&self) -> bool {
        true
    }

    fn prompt(&self) -> String {
        format!("{} {}", self.action(), self.detail()).trim_end().to_string()
    }
}

/// A single drive letter, stored uppercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriveLetter(char);

impl FromStr for DriveLetter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.strip_suffix(':').unwrap_or(s);
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => Ok(DriveLetter(c.to_ascii_uppercase())),
            _ => Err(format!("{s:?} is not a drive letter")),
        }
    }
}

impl fmt::Display for DriveLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drive_letters() {
        assert_eq!("d".parse::<DriveLetter>().unwrap().to_string(), "D");
        assert_eq!("E:".parse::<DriveLetter>().unwrap().to_string(), "E");
        assert!("DE".parse::<DriveLetter>().is_err());
        assert!("1".parse::<DriveLetter>().is_err());
        assert!("".parse::<DriveLetter>().is_err());
        assert!("D;rm".parse::<DriveLetter>().is_err());
    }
}
