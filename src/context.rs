use crate::{
    audit::AuditLogger,
    bridge::{Execution, ExecutionBridge},
    config::Config,
    errors::BridgeResult,
    ops::Operation,
    security::ConfirmationGate,
};
use tracing::info;

/// Process-wide state: one bridge, one confirmation gate, one audit sink.
///
/// Running an operation goes validate → escape → confirm → execute → audit.
/// A validation failure is audited and returned before the gate or the
/// interpreter is touched.
#[derive(Debug)]
pub struct BridgeContext {
    bridge: ExecutionBridge,
    gate: ConfirmationGate,
    audit: AuditLogger,
}

impl BridgeContext {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        Self::with_audit(cfg, AuditLogger::stdout(cfg.audit.format))
    }

    pub fn with_audit(cfg: &Config, audit: AuditLogger) -> anyhow::Result<Self> {
        Ok(Self {
            bridge: ExecutionBridge::new(cfg)?,
            gate: ConfirmationGate::new(audit.clone()),
            audit,
        })
    }

    pub fn bridge(&self) -> &ExecutionBridge {
        &self.bridge
    }

    pub fn gate(&self) -> &ConfirmationGate {
        &self.gate
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    pub async fn run(&self, op: &dyn Operation) -> BridgeResult<Execution> {
        let action = op.action();
        let detail = op.detail();

        let request = match op.request() {
            Ok(r) => r,
            Err(e) => {
                self.audit.audit(action, &format!("{detail}: {e}"), false);
                return Err(e);
            }
        };

        if let Some(class) = op.danger() {
            let prompt = op.prompt();
            self.gate.confirm(class, Some(prompt.as_str()));
        }

        info!(action, "running operation");
        match self.bridge.run(&request).await {
            Ok(exec) => {
                if op.mutating() {
                    let note = match (exec.timed_out, exec.partial) {
                        (true, _) => " (timed out)",
                        (false, true) => " (partial)",
                        _ => "",
                    };
                    self.audit.audit(action, &format!("{detail}{note}"), true);
                }
                Ok(exec)
            }
            Err(e) => {
                self.audit.audit(action, &format!("{detail}: {e}"), false);
                Err(e)
            }
        }
    }
}
