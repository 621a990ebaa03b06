use super::Operation;
use crate::{
    bridge::ExecutionRequest,
    errors::BridgeResult,
    security::{checked, ArgumentKind},
};
use clap::Subcommand;

#[derive(Debug, Clone, Subcommand)]
pub enum FileOp {
    /// List a directory
    List { path: String },
    /// Copy a file or directory
    Copy {
        source: String,
        dest: String,
        #[arg(long)]
        recursive: bool,
    },
    /// Delete a file or directory
    Delete {
        path: String,
        #[arg(long)]
        recursive: bool,
        #[arg(long)]
        force: bool,
    },
    /// Create a directory
    Mkdir { path: String },
    /// Show file metadata
    Info { path: String },
    /// Find files by name under a directory
    Search { path: String, pattern: String },
    /// Print file system changes under a directory until the timeout expires
    Watch {
        path: String,
        #[arg(long, default_value_t = 300)]
        timeout: u64,
    },
}

impl Operation for FileOp {
    fn action(&self) -> &'static str {
        match self {
            FileOp::List { .. } => "file.list",
            FileOp::Copy { .. } => "file.copy",
            FileOp::Delete { .. } => "file.delete",
            FileOp::Mkdir { .. } => "file.mkdir",
            FileOp::Info { .. } => "file.info",
            FileOp::Search { .. } => "file.search",
            FileOp::Watch { .. } => "file.watch",
        }
    }

    fn detail(&self) -> String {
        match self {
            FileOp::Copy { source, dest, .. } => format!("{source} -> {dest}"),
            FileOp::Search { path, pattern } => format!("{path} {pattern}"),
            FileOp::List { path }
            | FileOp::Delete { path, .. }
            | FileOp::Mkdir { path }
            | FileOp::Info { path }
            | FileOp::Watch { path, .. } => path.clone(),
        }
    }

    fn mutating(&self) -> bool {
        matches!(self, FileOp::Copy { .. } | FileOp::Delete { .. } | FileOp::Mkdir { .. })
    }

    fn request(&self) -> BridgeResult<ExecutionRequest> {
        let request = match self {
            FileOp::List { path } => {
                let path = checked(path, ArgumentKind::FilesystemPath)?;
                ExecutionRequest::new(format!(
                    "Get-ChildItem -Path \"{path}\" | Select-Object Mode, LastWriteTime, Length, Name | Format-Table -AutoSize"
                ))
            }
            FileOp::Copy { source, dest, recursive } => {
                let source = checked(source, ArgumentKind::FilesystemPath)?;
                let dest = checked(dest, ArgumentKind::FilesystemPath)?;
                let recurse = if *recursive { " -Recurse" } else { "" };
                ExecutionRequest::new(format!("Copy-Item -Path \"{source}\" -Destination \"{dest}\"{recurse} -Force"))
            }
            FileOp::Delete { path, recursive, force } => {
                let path = checked(path, ArgumentKind::FilesystemPath)?;
                let mut command = format!("Remove-Item -Path \"{path}\"");
                if *recursive {
                    command.push_str(" -Recurse");
                }
                if *force {
                    command.push_str(" -Force");
                }
                ExecutionRequest::new(command)
            }
            FileOp::Mkdir { path } => {
                let path = checked(path, ArgumentKind::FilesystemPath)?;
                ExecutionRequest::new(format!("New-Item -ItemType Directory -Path \"{path}\" -Force"))
            }
            FileOp::Info { path } => {
                let path = checked(path, ArgumentKind::FilesystemPath)?;
                ExecutionRequest::new(format!("Get-Item -Path \"{path}\" | Format-List *"))
            }
            FileOp::Search { path, pattern } => {
                let path = checked(path, ArgumentKind::FilesystemPath)?;
                let pattern = checked(pattern, ArgumentKind::SearchPattern)?;
                ExecutionRequest::new(format!(
                    "Get-ChildItem -Path \"{path}\" -Filter \"{pattern}\" -Recurse -ErrorAction SilentlyContinue | \
                     Select-Object -First 50 FullName, Length, LastWriteTime | Format-Table -AutoSize"
                ))
            }
            FileOp::Watch { path, timeout } => {
                let path = checked(path, ArgumentKind::FilesystemPath)?;
                ExecutionRequest::new(format!(
                    "$w = New-Object System.IO.FileSystemWatcher \"{path}\"; \
                     $w.IncludeSubdirectories = $true; \
                     while ($true) {{ \
                     $c = $w.WaitForChanged([System.IO.WatcherChangeTypes]::All, 1000); \
                     if (-not $c.TimedOut) {{ Write-Output \"[$(Get-Date -Format 'HH:mm:ss')] $($c.ChangeType) $($c.Name)\" }} }}"
                ))
                .with_timeout(*timeout)
            }
        };
        Ok(request)
    }
}
