use super::Operation;
use crate::{
    bridge::ExecutionRequest,
    errors::BridgeResult,
    security::{checked, ArgumentKind},
};
use clap::Subcommand;

#[derive(Debug, Clone, Subcommand)]
pub enum ServiceOp {
    /// List services
    List {
        /// Only running services
        #[arg(long)]
        running: bool,
    },
    Start { name: String },
    Stop { name: String },
    Restart { name: String },
    /// Show one service
    Status { name: String },
}

impl Operation for ServiceOp {
    fn action(&self) -> &'static str {
        match self {
            ServiceOp::List { .. } => "service.list",
            ServiceOp::Start { .. } => "service.start",
            ServiceOp::Stop { .. } => "service.stop",
            ServiceOp::Restart { .. } => "service.restart",
            ServiceOp::Status { .. } => "service.status",
        }
    }

    fn detail(&self) -> String {
        match self {
            ServiceOp::List { .. } => String::new(),
            ServiceOp::Start { name }
            | ServiceOp::Stop { name }
            | ServiceOp::Restart { name }
            | ServiceOp::Status { name } => name.clone(),
        }
    }

    fn mutating(&self) -> bool {
        !matches!(self, ServiceOp::List { .. } | ServiceOp::Status { .. })
    }

    fn request(&self) -> BridgeResult<ExecutionRequest> {
        let command = match self {
            ServiceOp::List { running } => {
                let filter = if *running { " | Where-Object { $_.Status -eq 'Running' }" } else { "" };
                format!("Get-Service{filter} | Select-Object Name, DisplayName, Status | Format-Table -AutoSize")
            }
            ServiceOp::Start { name } => {
                format!("Start-Service -Name \"{}\"", checked(name, ArgumentKind::SearchPattern)?)
            }
            ServiceOp::Stop { name } => {
                format!("Stop-Service -Name \"{}\" -Force", checked(name, ArgumentKind::SearchPattern)?)
            }
            ServiceOp::Restart { name } => {
                format!("Restart-Service -Name \"{}\" -Force", checked(name, ArgumentKind::SearchPattern)?)
            }
            ServiceOp::Status { name } => format!(
                "Get-Service -Name \"{}\" | Select-Object Name, DisplayName, Status, StartType | Format-List",
                checked(name, ArgumentKind::SearchPattern)?
            ),
        };
        Ok(ExecutionRequest::new(command))
    }
}
