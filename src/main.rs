use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use winbridge::{
    bridge::running_under_wsl,
    config::Config,
    logging,
    ops::{
        app::AppOp, disk::DiskOp, file::FileOp, process::ProcessOp, registry::RegistryOp, script::ScriptOp,
        service::ServiceOp, system::SystemOp, user::UserOp, Operation,
    },
    BridgeContext,
};

#[derive(Parser, Debug)]
#[command(name = "winbridge", version, about = "Control Windows from WSL through PowerShell")]
struct Cli {
    #[arg(long, global = true, default_value = "winbridge.toml", help = "Config file (TOML or JSON)")]
    config: PathBuf,
    #[arg(short, long, global = true, help = "Debug logging on stderr")]
    verbose: bool,
    #[arg(long, global = true, help = "Log as JSON")]
    json_logs: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run PowerShell source or script files
    Ps {
        #[command(subcommand)]
        op: ScriptOp,
    },
    Process {
        #[command(subcommand)]
        op: ProcessOp,
    },
    /// Windows applications, windows and input
    App {
        #[command(subcommand)]
        op: AppOp,
    },
    Service {
        #[command(subcommand)]
        op: ServiceOp,
    },
    #[command(alias = "reg")]
    Registry {
        #[command(subcommand)]
        op: RegistryOp,
    },
    User {
        #[command(subcommand)]
        op: UserOp,
    },
    Disk {
        #[command(subcommand)]
        op: DiskOp,
    },
    File {
        #[command(subcommand)]
        op: FileOp,
    },
    /// Power state and system information
    System {
        #[command(subcommand)]
        op: SystemOp,
    },
}

impl Commands {
    fn operation(&self) -> &dyn Operation {
        match self {
            Commands::Ps { op } => op,
            Commands::Process { op } => op,
            Commands::App { op } => op,
            Commands::Service { op } => op,
            Commands::Registry { op } => op,
            Commands::User { op } => op,
            Commands::Disk { op } => op,
            Commands::File { op } => op,
            Commands::System { op } => op,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cfg = Config::load_or_default(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;
    logging::init(cli.json_logs || cfg.logging.json, cli.verbose);

    if !running_under_wsl() {
        warn!("not running under WSL; {} may not reach Windows", cfg.interpreter.program);
    }

    let ctx = BridgeContext::new(&cfg)?;
    let op = cli.command.operation();
    info!(action = op.action(), "dispatching");

    match ctx.run(op).await {
        Ok(exec) => {
            if !exec.output.is_empty() {
                println!("{}", exec.output);
            }
            Ok(())
        }
        Err(e) => {
            error!(code = e.code(), "{e}");
            Err(e.into())
        }
    }
}
