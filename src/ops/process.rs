use super::Operation;
use crate::{
    bridge::ExecutionRequest,
    errors::BridgeResult,
    security::{checked, ArgumentKind},
};
use clap::Subcommand;

#[derive(Debug, Clone, Subcommand)]
pub enum ProcessOp {
    /// Top processes by CPU
    List {
        /// Only processes matching this name pattern
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value_t = 30)]
        limit: u32,
    },
    /// Stop a process by id
    Stop {
        pid: u32,
        #[arg(long)]
        force: bool,
    },
    /// Stop every process with a name
    Kill {
        name: String,
        #[arg(long)]
        force: bool,
    },
    /// Print CPU and memory of a process until the timeout expires
    Monitor {
        name: String,
        #[arg(long, default_value_t = 5)]
        interval: u32,
        #[arg(long, default_value_t = 3600)]
        timeout: u64,
    },
    /// Show details for a process id
    Info { pid: u32 },
}

impl Operation for ProcessOp {
    fn action(&self) -> &'static str {
        match self {
            ProcessOp::List { .. } => "process.list",
            ProcessOp::Stop { .. } => "process.stop",
            ProcessOp::Kill { .. } => "process.kill",
            ProcessOp::Monitor { .. } => "process.monitor",
            ProcessOp::Info { .. } => "process.info",
        }
    }

    fn detail(&self) -> String {
        match self {
            ProcessOp::List { name, .. } => name.clone().unwrap_or_default(),
            ProcessOp::Stop { pid, .. } | ProcessOp::Info { pid } => format!("pid {pid}"),
            ProcessOp::Kill { name, .. } | ProcessOp::Monitor { name, .. } => name.clone(),
        }
    }

    fn mutating(&self) -> bool {
        matches!(self, ProcessOp::Stop { .. } | ProcessOp::Kill { .. })
    }

    fn request(&self) -> BridgeResult<ExecutionRequest> {
        let request = match self {
            ProcessOp::List { name, limit } => {
                let filter = match name {
                    Some(n) => format!(" -Name \"{}\"", checked(n, ArgumentKind::SearchPattern)?),
                    None => String::new(),
                };
                ExecutionRequest::new(format!(
                    "Get-Process{filter} -ErrorAction SilentlyContinue | Sort-Object CPU -Descending | \
                     Select-Object -First {limit} Id, ProcessName, CPU, \
                     @{{Name='MemMB';Expression={{[math]::Round($_.WorkingSet64/1MB, 1)}}}} | Format-Table -AutoSize"
                ))
            }
            ProcessOp::Stop { pid, force } => {
                let force = if *force { " -Force" } else { "" };
                ExecutionRequest::new(format!("Stop-Process -Id {pid}{force}"))
            }
            ProcessOp::Kill { name, force } => {
                let name = checked(name, ArgumentKind::SearchPattern)?;
                let force = if *force { " -Force" } else { "" };
                ExecutionRequest::new(format!("Stop-Process -Name \"{name}\"{force}"))
            }
            ProcessOp::Monitor { name, interval, timeout } => {
                let name = checked(name, ArgumentKind::SearchPattern)?;
                let interval = (*interval).max(1);
                ExecutionRequest::new(format!(
                    "while ($true) {{ \
                     $p = Get-Process -Name \"{name}\" -ErrorAction SilentlyContinue | Select-Object -First 1; \
                     $t = Get-Date -Format 'HH:mm:ss'; \
                     if ($p) {{ Write-Output \"[$t] PID $($p.Id) CPU $([math]::Round($p.CPU, 2))s MEM $([math]::Round($p.WorkingSet64/1MB, 2))MB\" }} \
                     else {{ Write-Output \"[$t] not running\" }}; \
                     Start-Sleep -Seconds {interval} }}"
                ))
                .with_timeout(*timeout)
            }
            ProcessOp::Info { pid } => ExecutionRequest::new(format!(
                "Get-Process -Id {pid} | Select-Object Id, ProcessName, Path, StartTime, CPU, WorkingSet64 | Format-List"
            )),
        };
        Ok(request)
    }
}
