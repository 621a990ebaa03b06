use crate::{
    audit::redact,
    config::Config,
    errors::{BridgeError, BridgeResult},
};
use anyhow::Context;
use std::{
    io,
    path::PathBuf,
    process::Stdio,
    sync::atomic::{AtomicU64, Ordering},
    time::Instant,
};
use tokio::{
    io::AsyncReadExt,
    process::Command,
    time::{timeout, Duration},
};
use tracing::{debug, warn, Instrument};
use uuid::Uuid;

/// One command for the interpreter. `None` uses the configured default timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub command_text: String,
    pub timeout_s: Option<u64>,
}

impl ExecutionRequest {
    pub fn new(command_text: impl Into<String>) -> Self {
        Self { command_text: command_text.into(), timeout_s: None }
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_s = Some(seconds);
        self
    }
}

#[derive(Debug, Clone)]
pub struct Execution {
    /// Trimmed stdout.
    pub output: String,
    /// The interpreter failed or was killed but had already written output.
    pub partial: bool,
    /// The interpreter was killed at the deadline.
    pub timed_out: bool,
    pub exit_code: Option<i32>,
    pub duration_ms: u64,
}

/// Runs command text in the external interpreter, one child process per call.
#[derive(Debug)]
pub struct ExecutionBridge {
    program: PathBuf,
    args: Vec<String>,
    default_timeout_s: u64,
    max_timeout_s: u64,
    runs: AtomicU64,
}

impl ExecutionBridge {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        cfg.validate().context("invalid bridge configuration")?;
        let program = resolve_program(&cfg.interpreter.program)
            .with_context(|| format!("resolving interpreter {}", cfg.interpreter.program))?;
        Ok(Self {
            program,
            args: cfg.interpreter.args.clone(),
            default_timeout_s: cfg.limits.default_timeout_s,
            max_timeout_s: cfg.limits.max_timeout_s,
            runs: AtomicU64::new(0),
        })
    }

    pub fn default_timeout_s(&self) -> u64 {
        self.default_timeout_s
    }

    /// Number of interpreter launches so far.
    pub fn runs(&self) -> u64 {
        self.runs.load(Ordering::Relaxed)
    }

    pub async fn run(&self, request: &ExecutionRequest) -> BridgeResult<Execution> {
        let timeout_s = request.timeout_s.unwrap_or(self.default_timeout_s);
        self.execute(&request.command_text, timeout_s).await
    }

    /// Runs `command_text` and waits at most `timeout_s` seconds, clamped to
    /// `1..=max_timeout_s`.
    ///
    /// A non-zero exit that already produced stdout is returned as a partial
    /// success: many commands print results and then fail on a later line.
    /// The same holds for a command killed at the deadline, so monitors that
    /// loop until they are stopped still hand back what they printed.
    pub async fn execute(&self, command_text: &str, timeout_s: u64) -> BridgeResult<Execution> {
        let timeout_s = timeout_s.clamp(1, self.max_timeout_s);
        let span = tracing::info_span!("execute", run_id = %Uuid::new_v4(), timeout_s);
        self.execute_inner(command_text, timeout_s).instrument(span).await
    }

    /// The interpreter invocation: configured args, then the command text as
    /// one argument, unmodified.
    fn command(&self, command_text: &str) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command.arg(command_text);
        command.stdin(Stdio::null());
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());
        command.kill_on_drop(true);
        command
    }

    async fn execute_inner(&self, command_text: &str, timeout_s: u64) -> BridgeResult<Execution> {
        self.runs.fetch_add(1, Ordering::Relaxed);
        debug!(command = %redact(command_text), "launching interpreter");

        let start = Instant::now();
        let mut child = self.command(command_text).spawn().map_err(BridgeError::Spawn)?;
        let mut out_pipe = child.stdout.take().ok_or_else(|| io::Error::other("stdout not captured"))?;
        let mut err_pipe = child.stderr.take().ok_or_else(|| io::Error::other("stderr not captured"))?;

        let mut out = Vec::new();
        let mut err = Vec::new();
        let collect = async {
            let mut buf_out = [0u8; 8192];
            let mut buf_err = [0u8; 8192];
            let (mut out_done, mut err_done) = (false, false);
            while !(out_done && err_done) {
                tokio::select! {
                    r = out_pipe.read(&mut buf_out), if !out_done => match r? {
                        0 => out_done = true,
                        n => out.extend_from_slice(&buf_out[..n]),
                    },
                    r = err_pipe.read(&mut buf_err), if !err_done => match r? {
                        0 => err_done = true,
                        n => err.extend_from_slice(&buf_err[..n]),
                    },
                }
            }
            child.wait().await
        };
        let finished = timeout(Duration::from_secs(timeout_s), collect).await;
        let duration_ms = start.elapsed().as_millis() as u64;
        let stdout = String::from_utf8_lossy(&out).trim().to_string();

        let status = match finished {
            Ok(status) => status?,
            Err(_) => {
                if let Err(e) = child.kill().await {
                    warn!("failed to kill interpreter: {e}");
                }
                if stdout.is_empty() {
                    warn!("interpreter killed after {timeout_s}s");
                    return Err(BridgeError::Timeout { seconds: timeout_s });
                }
                warn!(duration_ms, "interpreter killed after {timeout_s}s; keeping its output");
                return Ok(Execution { output: stdout, partial: true, timed_out: true, exit_code: None, duration_ms });
            }
        };
        let exit_code = status.code();

        if status.success() {
            debug!(duration_ms, "interpreter succeeded");
            return Ok(Execution { output: stdout, partial: false, timed_out: false, exit_code, duration_ms });
        }
        if !stdout.is_empty() {
            warn!(?exit_code, duration_ms, "interpreter failed after producing output; keeping it");
            return Ok(Execution { output: stdout, partial: true, timed_out: false, exit_code, duration_ms });
        }
        let stderr = String::from_utf8_lossy(&err).trim().to_string();
        let message = if stderr.is_empty() {
            format!("interpreter exited with {status}")
        } else {
            stderr
        };
        warn!(?exit_code, duration_ms, "interpreter failed");
        Err(BridgeError::Interpreter { message, exit_code })
    }
}

/// True when the kernel release names Microsoft, i.e. we are inside WSL.
pub fn running_under_wsl() -> bool {
    std::fs::read_to_string("/proc/sys/kernel/osrelease")
        .map(|release| is_wsl_release(&release))
        .unwrap_or(false)
}

fn is_wsl_release(release: &str) -> bool {
    release.to_ascii_lowercase().contains("microsoft")
}

fn resolve_program(program: &str) -> anyhow::Result<PathBuf> {
    let path = if program.contains('/') {
        PathBuf::from(program)
    } else {
        which::which(program)?
    };
    Ok(dunce::canonicalize(path)?)
}
