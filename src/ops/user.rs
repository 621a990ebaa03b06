use super::Operation;
use crate::{
    bridge::ExecutionRequest,
    errors::BridgeResult,
    security::{checked, escape, ArgumentKind, DangerousOperation},
};
use clap::Subcommand;

#[derive(Debug, Clone, Subcommand)]
pub enum UserOp {
    /// List local accounts
    List,
    /// Create a local account
    Create {
        username: String,
        password: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a local account
    Delete { username: String },
    /// Set an account password
    Password { username: String, password: String },
    /// Enable an account
    Enable { username: String },
    /// Disable an account
    Disable { username: String },
    /// Show account details
    Info { username: String },
}

fn secure_string(password: &str) -> BridgeResult<String> {
    let password = checked(password, ArgumentKind::Password)?;
    Ok(format!("(ConvertTo-SecureString \"{password}\" -AsPlainText -Force)"))
}

impl Operation for UserOp {
    fn action(&self) -> &'static str {
        match self {
            UserOp::List => "user.list",
            UserOp::Create { .. } => "user.create",
            UserOp::Delete { .. } => "user.delete",
            UserOp::Password { .. } => "user.password",
            UserOp::Enable { .. } => "user.enable",
            UserOp::Disable { .. } => "user.disable",
            UserOp::Info { .. } => "user.info",
        }
    }

    fn detail(&self) -> String {
        match self {
            UserOp::List => String::new(),
            UserOp::Create { username, .. }
            | UserOp::Delete { username }
            | UserOp::Password { username, .. }
            | UserOp::Enable { username }
            | UserOp::Disable { username }
            | UserOp::Info { username } => username.clone(),
        }
    }

    fn danger(&self) -> Option<DangerousOperation> {
        match self {
            UserOp::Delete { .. } => Some(DangerousOperation::DeleteUser),
            _ => None,
        }
    }

    fn mutating(&self) -> bool {
        !matches!(self, UserOp::List | UserOp::Info { .. })
    }

    fn request(&self) -> BridgeResult<ExecutionRequest> {
        let command = match self {
            UserOp::List => {
                "Get-LocalUser | Select-Object Name, Enabled, LastLogon, Description | Format-Table -AutoSize".to_string()
            }
            UserOp::Create { username, password, description } => {
                let username = checked(username, ArgumentKind::Username)?;
                let password = secure_string(password)?;
                let description = escape(description.as_deref().unwrap_or_default());
                format!("New-LocalUser -Name \"{username}\" -Password {password} -Description \"{description}\"")
            }
            UserOp::Delete { username } => {
                let username = checked(username, ArgumentKind::Username)?;
                format!("Remove-LocalUser -Name \"{username}\"")
            }
            UserOp::Password { username, password } => {
                let username = checked(username, ArgumentKind::Username)?;
                let password = secure_string(password)?;
                format!("Set-LocalUser -Name \"{username}\" -Password {password}")
            }
            UserOp::Enable { username } => {
                format!("Enable-LocalUser -Name \"{}\"", checked(username, ArgumentKind::Username)?)
            }
            UserOp::Disable { username } => {
                format!("Disable-LocalUser -Name \"{}\"", checked(username, ArgumentKind::Username)?)
            }
            UserOp::Info { username } => {
                format!("Get-LocalUser -Name \"{}\" | Format-List", checked(username, ArgumentKind::Username)?)
            }
        };
        Ok(ExecutionRequest::new(command))
    }
}
