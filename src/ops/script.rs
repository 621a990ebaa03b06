use super::Operation;
use crate::{
    bridge::ExecutionRequest,
    errors::{BridgeError, BridgeResult},
    security::{checked, validate, ArgumentKind},
};
use clap::Subcommand;

#[derive(Debug, Clone, Subcommand)]
pub enum ScriptOp {
    /// Run PowerShell source as-is
    Run {
        script: String,
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Run a .ps1 file on the Windows side
    File {
        path: String,
        #[arg(long)]
        timeout: Option<u64>,
    },
}

impl Operation for ScriptOp {
    fn action(&self) -> &'static str {
        match self {
            ScriptOp::Run { .. } => "ps.run",
            ScriptOp::File { .. } => "ps.file",
        }
    }

    fn detail(&self) -> String {
        match self {
            ScriptOp::Run { script, .. } => script.lines().next().unwrap_or_default().to_string(),
            ScriptOp::File { path, .. } => path.clone(),
        }
    }

    fn request(&self) -> BridgeResult<ExecutionRequest> {
        let (request, timeout) = match self {
            ScriptOp::Run { script, timeout } => {
                // the caller's own script: validated for shape, never escaped
                validate(script, ArgumentKind::FreeformScript)
                    .map_err(|source| BridgeError::Validation { kind: ArgumentKind::FreeformScript, source })?;
                (ExecutionRequest::new(script.clone()), timeout)
            }
            ScriptOp::File { path, timeout } => {
                let path = checked(path, ArgumentKind::FilesystemPath)?;
                (ExecutionRequest::new(format!("& \"{path}\"")), timeout)
            }
        };
        Ok(match timeout {
            Some(t) => request.with_timeout(*t),
            None => request,
        })
    }
}
