//! Guarded bridge from a WSL process to Windows PowerShell.
//!
//! Caller strings are validated ([`security::validate`]), escaped
//! ([`security::escape`]), optionally announced by the
//! [`security::ConfirmationGate`], run by the [`bridge::ExecutionBridge`]
//! under a timeout, and recorded by the [`audit::AuditLogger`].

pub mod audit;
pub mod bridge;
pub mod config;
pub mod context;
pub mod errors;
pub mod logging;
pub mod ops;
pub mod security;


pub use context::BridgeContext;
pub use errors::{BridgeError, BridgeResult};
