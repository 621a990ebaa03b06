use super::{DriveLetter, Operation};
use crate::{
    bridge::ExecutionRequest,
    errors::BridgeResult,
    security::{checked, ArgumentKind, DangerousOperation},
};
use clap::Subcommand;

/// chkdsk on a large volume easily outlives the default timeout.
const CHECK_TIMEOUT_S: u64 = 3600;
const FORMAT_TIMEOUT_S: u64 = 3600;

#[derive(Debug, Clone, Subcommand)]
pub enum DiskOp {
    /// List physical disks
    List,
    /// List volumes and free space
    Volumes,
    /// Run chkdsk on a volume
    Check {
        drive: DriveLetter,
        /// Fix errors (/F)
        #[arg(long)]
        fix: bool,
        /// Locate bad sectors (/R)
        #[arg(long)]
        scan: bool,
    },
    /// Format a volume as NTFS
    Format {
        drive: DriveLetter,
        #[arg(long)]
        label: Option<String>,
        /// Skip the full surface pass
        #[arg(long)]
        quick: bool,
    },
}

impl Operation for DiskOp {
    fn action(&self) -> &'static str {
        match self {
            DiskOp::List => "disk.list",
            DiskOp::Volumes => "disk.volumes",
            DiskOp::Check { .. } => "disk.check",
            DiskOp::Format { .. } => "disk.format",
        }
    }

    fn detail(&self) -> String {
        match self {
            DiskOp::Check { drive, .. } | DiskOp::Format { drive, .. } => format!("{drive}:"),
            _ => String::new(),
        }
    }

    fn danger(&self) -> Option<DangerousOperation> {
        match self {
            DiskOp::Format { .. } => Some(DangerousOperation::FormatDisk),
            _ => None,
        }
    }

    fn mutating(&self) -> bool {
        matches!(self, DiskOp::Check { fix: true, .. } | DiskOp::Check { scan: true, .. } | DiskOp::Format { .. })
    }

    fn request(&self) -> BridgeResult<ExecutionRequest> {
        let request = match self {
            DiskOp::List => ExecutionRequest::new(
                "Get-Disk | Select-Object Number, FriendlyName, HealthStatus, \
                 @{Name='SizeGB';Expression={[math]::Round($_.Size/1GB, 2)}} | Format-Table -AutoSize",
            ),
            DiskOp::Volumes => ExecutionRequest::new(
                "Get-Volume | Where-Object DriveLetter | Select-Object DriveLetter, FileSystemLabel, FileSystem, \
                 @{Name='FreeGB';Expression={[math]::Round($_.SizeRemaining/1GB, 2)}}, \
                 @{Name='SizeGB';Expression={[math]::Round($_.Size/1GB, 2)}} | Format-Table -AutoSize",
            ),
            DiskOp::Check { drive, fix, scan } => {
                let mut command = format!("chkdsk {drive}:");
                if *fix {
                    command.push_str(" /F");
                }
                if *scan {
                    command.push_str(" /R");
                }
                ExecutionRequest::new(command).with_timeout(CHECK_TIMEOUT_S)
            }
            DiskOp::Format { drive, label, quick } => {
                let label = checked(label.as_deref().unwrap_or("Data"), ArgumentKind::SearchPattern)?;
                let full = if *quick { "" } else { " -Full" };
                ExecutionRequest::new(format!(
                    "Format-Volume -DriveLetter {drive} -FileSystem NTFS -NewFileSystemLabel \"{label}\"{full} -Confirm:$false"
                ))
                .with_timeout(FORMAT_TIMEOUT_S)
            }
        };
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_is_gated_and_bounded() {
        let op = DiskOp::Format { drive: "e".parse().unwrap(), label: Some("Backup".into()), quick: true };
        assert_eq!(op.danger(), Some(DangerousOperation::FormatDisk));
        let req = op.request().unwrap();
        assert_eq!(
            req.command_text,
            "Format-Volume -DriveLetter E -FileSystem NTFS -NewFileSystemLabel \"Backup\" -Confirm:$false"
        );
        assert_eq!(req.timeout_s, Some(FORMAT_TIMEOUT_S));
        assert_eq!(op.detail(), "E:");
    }

    #[test]
    fn format_label_is_validated() {
        let op = DiskOp::Format { drive: "E".parse().unwrap(), label: Some("x\"; Stop-Computer".into()), quick: false };
        assert!(op.request().is_err());
    }

    #[test]
    fn check_flags() {
        let op = DiskOp::Check { drive: "C".parse().unwrap(), fix: true, scan: true };
        assert_eq!(op.request().unwrap().command_text, "chkdsk C: /F /R");
        assert!(op.mutating());
        assert!(!DiskOp::Check { drive: "C".parse().unwrap(), fix: false, scan: false }.mutating());
    }
}
