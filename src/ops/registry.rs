use super::Operation;
use crate::{
    bridge::ExecutionRequest,
    errors::{BridgeError, BridgeResult},
    security::{checked, escape, validate, ArgumentKind, DangerousOperation},
};
use clap::{Subcommand, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RegistryValueKind {
    String,
    ExpandString,
    Dword,
    Qword,
}

impl RegistryValueKind {
    fn as_ps(&self) -> &'static str {
        match self {
            RegistryValueKind::String => "String",
            RegistryValueKind::ExpandString => "ExpandString",
            RegistryValueKind::Dword => "DWord",
            RegistryValueKind::Qword => "QWord",
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum RegistryOp {
    /// Show the values of a key
    Read { path: String },
    /// Set a value under a key
    Write {
        path: String,
        name: String,
        value: String,
        #[arg(long, value_enum, default_value_t = RegistryValueKind::String)]
        kind: RegistryValueKind,
    },
    /// Create a key
    Create { path: String },
    /// Delete a key
    Delete {
        path: String,
        #[arg(long)]
        recursive: bool,
    },
    /// List subkeys
    List { path: String },
    /// Export a key to a .reg file
    Export { path: String, file: String },
    /// Import a .reg file
    Import { file: String },
    /// Find subkeys whose name contains a pattern
    Search {
        path: String,
        pattern: String,
        #[arg(long)]
        recursive: bool,
    },
}

/// `reg.exe` wants `HKCU\Software`, PowerShell wants `HKCU:\Software`.
fn reg_exe_path(path: &str) -> BridgeResult<String> {
    validate(path, ArgumentKind::RegistryPath)
        .map_err(|source| BridgeError::Validation { kind: ArgumentKind::RegistryPath, source })?;
    Ok(escape(&path.replacen(':', "", 1)).to_string())
}

impl Operation for RegistryOp {
    fn action(&self) -> &'static str {
        match self {
            RegistryOp::Read { .. } => "registry.read",
            RegistryOp::Write { .. } => "registry.write",
            RegistryOp::Create { .. } => "registry.create",
            RegistryOp::Delete { .. } => "registry.delete",
            RegistryOp::List { .. } => "registry.list",
            RegistryOp::Export { .. } => "registry.export",
            RegistryOp::Import { .. } => "registry.import",
            RegistryOp::Search { .. } => "registry.search",
        }
    }

    fn detail(&self) -> String {
        match self {
            RegistryOp::Read { path }
            | RegistryOp::Create { path }
            | RegistryOp::Delete { path, .. }
            | RegistryOp::List { path } => path.clone(),
            RegistryOp::Write { path, name, .. } => format!("{path} {name}"),
            RegistryOp::Export { path, file } => format!("{path} -> {file}"),
            RegistryOp::Import { file } => file.clone(),
            RegistryOp::Search { path, pattern, .. } => format!("{path} {pattern}"),
        }
    }

    fn danger(&self) -> Option<DangerousOperation> {
        match self {
            RegistryOp::Delete { .. } => Some(DangerousOperation::RegistryDelete),
            RegistryOp::Import { .. } => Some(DangerousOperation::RegistryImport),
            _ => None,
        }
    }

    fn mutating(&self) -> bool {
        !matches!(self, RegistryOp::Read { .. } | RegistryOp::List { .. } | RegistryOp::Search { .. })
    }

    fn request(&self) -> BridgeResult<ExecutionRequest> {
        let command = match self {
            RegistryOp::Read { path } => {
                let path = checked(path, ArgumentKind::RegistryPath)?;
                format!("Get-ItemProperty -Path \"{path}\" | Format-List")
            }
            RegistryOp::Write { path, name, value, kind } => {
                let path = checked(path, ArgumentKind::RegistryPath)?;
                let name = checked(name, ArgumentKind::SearchPattern)?;
                // value data is opaque; escaping alone keeps it inside the literal
                let value = escape(value);
                format!(
                    "Set-ItemProperty -Path \"{path}\" -Name \"{name}\" -Value \"{value}\" -Type {}",
                    kind.as_ps()
                )
            }
            RegistryOp::Create { path } => {
                let path = checked(path, ArgumentKind::RegistryPath)?;
                format!("New-Item -Path \"{path}\" -Force")
            }
            RegistryOp::Delete { path, recursive } => {
                let path = checked(path, ArgumentKind::RegistryPath)?;
                let recurse = if *recursive { " -Recurse" } else { "" };
                format!("Remove-Item -Path \"{path}\"{recurse} -Force")
            }
            RegistryOp::List { path } => {
                let path = checked(path, ArgumentKind::RegistryPath)?;
                format!("Get-ChildItem -Path \"{path}\" | Select-Object Name, Property | Format-Table -AutoSize")
            }
            RegistryOp::Export { path, file } => {
                let path = reg_exe_path(path)?;
                let file = checked(file, ArgumentKind::FilesystemPath)?;
                format!("reg export \"{path}\" \"{file}\" /y")
            }
            RegistryOp::Import { file } => {
                let file = checked(file, ArgumentKind::FilesystemPath)?;
                format!("reg import \"{file}\"")
            }
            RegistryOp::Search { path, pattern, recursive } => {
                let path = checked(path, ArgumentKind::RegistryPath)?;
                let pattern = checked(pattern, ArgumentKind::SearchPattern)?;
                let recurse = if *recursive { " -Recurse" } else { "" };
                format!(
                    "Get-ChildItem -Path \"{path}\"{recurse} -ErrorAction SilentlyContinue | \
                     Where-Object {{ $_.Name -like \"*{pattern}*\" }} | Select-Object -First 20 | Format-List"
                )
            }
        };
        Ok(ExecutionRequest::new(command))
    }
}
