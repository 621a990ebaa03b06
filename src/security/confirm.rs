use crate::audit::AuditLogger;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DangerousOperation {
    Shutdown,
    Restart,
    ForceShutdown,
    ForceRestart,
    DeleteUser,
    RegistryDelete,
    RegistryImport,
    FormatDisk,
}

impl DangerousOperation {
    pub const ALL: [DangerousOperation; 8] = [
        DangerousOperation::Shutdown,
        DangerousOperation::Restart,
        DangerousOperation::ForceShutdown,
        DangerousOperation::ForceRestart,
        DangerousOperation::DeleteUser,
        DangerousOperation::RegistryDelete,
        DangerousOperation::RegistryImport,
        DangerousOperation::FormatDisk,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DangerousOperation::Shutdown => "shutdown",
            DangerousOperation::Restart => "restart",
            DangerousOperation::ForceShutdown => "force_shutdown",
            DangerousOperation::ForceRestart => "force_restart",
            DangerousOperation::DeleteUser => "delete_user",
            DangerousOperation::RegistryDelete => "registry_delete",
            DangerousOperation::RegistryImport => "registry_import",
            DangerousOperation::FormatDisk => "format_disk",
        }
    }
}

impl fmt::Display for DangerousOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remembers which dangerous operation classes have been announced.
///
/// The gate warns the first time a class is used and lets every call through.
/// It is not an interactive prompt: `confirm` always returns `true`. One gate
/// lives in the process context, so its memory lasts as long as the process.
#[derive(Debug)]
pub struct ConfirmationGate {
    confirmed: Mutex<HashSet<DangerousOperation>>,
    audit: AuditLogger,
}

impl ConfirmationGate {
    pub fn new(audit: AuditLogger) -> Self {
        Self { confirmed: Mutex::new(HashSet::new()), audit }
    }

    pub fn confirm(&self, class: DangerousOperation, prompt: Option<&str>) -> bool {
        let first = match self.confirmed.lock() {
            Ok(mut set) => set.insert(class),
            // a poisoned set only risks a repeated warning
            Err(poisoned) => poisoned.into_inner().insert(class),
        };
        if first {
            let prompt = prompt.unwrap_or(class.as_str());
            self.audit.notice(&format!("⚠  dangerous operation: {prompt} (this action is recorded)"));
            tracing::warn!(target: "audit", class = %class, prompt, "dangerous operation confirmed for this session");
        }
        true
    }

    pub fn is_confirmed(&self, class: DangerousOperation) -> bool {
        match self.confirmed.lock() {
            Ok(set) => set.contains(&class),
            Err(poisoned) => poisoned.into_inner().contains(&class),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditFormat;
    use std::sync::Arc;

    #[test]
    fn warns_once_per_class() {
        let audit = AuditLogger::in_memory(AuditFormat::Text);
        let gate = ConfirmationGate::new(audit.clone());
        assert!(gate.confirm(DangerousOperation::DeleteUser, Some("delete user bob")));
        assert_eq!(audit.lines().len(), 1);
        assert!(audit.lines()[0].contains("delete user bob"));
        assert!(gate.confirm(DangerousOperation::DeleteUser, Some("delete user alice")));
        assert_eq!(audit.lines().len(), 1);
        assert!(gate.confirm(DangerousOperation::FormatDisk, None));
        assert_eq!(audit.lines().len(), 2);
        assert!(audit.lines()[1].contains("format_disk"));
    }

    #[test]
    fn independent_gates_do_not_share_state() {
        let a = ConfirmationGate::new(AuditLogger::in_memory(AuditFormat::Text));
        let b = ConfirmationGate::new(AuditLogger::in_memory(AuditFormat::Text));
        a.confirm(DangerousOperation::Shutdown, None);
        assert!(a.is_confirmed(DangerousOperation::Shutdown));
        assert!(!b.is_confirmed(DangerousOperation::Shutdown));
    }

    #[test]
    fn concurrent_first_use_warns_once() {
        let audit = AuditLogger::in_memory(AuditFormat::Text);
        let gate = Arc::new(ConfirmationGate::new(audit.clone()));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gate = Arc::clone(&gate);
                std::thread::spawn(move || gate.confirm(DangerousOperation::RegistryDelete, None))
            })
            .collect();
        for h in handles {
            assert!(h.join().unwrap());
        }
        assert_eq!(audit.lines().len(), 1);
    }

    #[test]
    fn class_names_are_snake_case() {
        for class in DangerousOperation::ALL {
            let json = serde_json::to_string(&class).unwrap();
            assert_eq!(json, format!("\"{}\"", class.as_str()));
        }
    }
}
