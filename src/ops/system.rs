use super::Operation;
use crate::{bridge::ExecutionRequest, errors::BridgeResult, security::DangerousOperation};
use clap::Subcommand;

const SUSPEND: &str = "Add-Type -AssemblyName System.Windows.Forms; \
    [System.Windows.Forms.Application]::SetSuspendState(\"Suspend\", $false, $false)";
const HIBERNATE: &str = "powercfg /hibernate on; Add-Type -AssemblyName System.Windows.Forms; \
    [System.Windows.Forms.Application]::SetSuspendState(\"Hibernate\", $false, $false)";

#[derive(Debug, Clone, Subcommand)]
pub enum SystemOp {
    /// Power off the machine
    Shutdown {
        /// Close applications without warning
        #[arg(long)]
        force: bool,
        /// Seconds to wait before shutting down
        #[arg(long, default_value_t = 0)]
        delay: u32,
    },
    /// Reboot the machine
    Restart {
        #[arg(long)]
        force: bool,
        #[arg(long, default_value_t = 0)]
        delay: u32,
    },
    /// Suspend to RAM
    Sleep,
    /// Suspend to disk
    Hibernate,
    /// Show OS and hardware summary
    Info,
}

fn shutdown_command(mode: char, force: bool, delay: u32) -> String {
    let force = if force { " /f" } else { "" };
    format!("shutdown.exe /{mode} /t {delay}{force}")
}

impl Operation for SystemOp {
    fn action(&self) -> &'static str {
        match self {
            SystemOp::Shutdown { .. } => "system.shutdown",
            SystemOp::Restart { .. } => "system.restart",
            SystemOp::Sleep => "system.sleep",
            SystemOp::Hibernate => "system.hibernate",
            SystemOp::Info => "system.info",
        }
    }

    fn detail(&self) -> String {
        match self {
            SystemOp::Shutdown { force, delay } | SystemOp::Restart { force, delay } => {
                format!("delay={delay}s force={force}")
            }
            _ => String::new(),
        }
    }

    fn danger(&self) -> Option<DangerousOperation> {
        match self {
            SystemOp::Shutdown { force: false, .. } => Some(DangerousOperation::Shutdown),
            SystemOp::Shutdown { force: true, .. } => Some(DangerousOperation::ForceShutdown),
            SystemOp::Restart { force: false, .. } => Some(DangerousOperation::Restart),
            SystemOp::Restart { force: true, .. } => Some(DangerousOperation::ForceRestart),
            _ => None,
        }
    }

    fn mutating(&self) -> bool {
        !matches!(self, SystemOp::Info)
    }

    fn request(&self) -> BridgeResult<ExecutionRequest> {
        let command = match self {
            SystemOp::Shutdown { force, delay } => shutdown_command('s', *force, *delay),
            SystemOp::Restart { force, delay } => shutdown_command('r', *force, *delay),
            SystemOp::Sleep => SUSPEND.to_string(),
            SystemOp::Hibernate => HIBERNATE.to_string(),
            SystemOp::Info => "Get-ComputerInfo | Select-Object CsName, WindowsProductName, OsVersion, \
                OsArchitecture, CsTotalPhysicalMemory, OsLastBootUpTime | Format-List"
                .to_string(),
        };
        Ok(ExecutionRequest::new(command))
    }
}
