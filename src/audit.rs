use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::{Arc, Mutex, OnceLock};

const REDACTED: &str = "********";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    pub action: String,
    pub detail: String,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

impl AuditRecord {
    pub fn new(action: &str, detail: &str, success: bool) -> Self {
        Self {
            action: action.to_owned(),
            detail: redact(detail),
            success,
            timestamp: Utc::now(),
        }
    }

    fn to_line(&self, format: AuditFormat) -> Option<String> {
        match format {
            AuditFormat::Text => {
                let glyph = if self.success { '✓' } else { '✗' };
                Some(format!("[audit] {glyph} {}: {}", self.action, self.detail))
            }
            AuditFormat::Json => serde_json::to_string(self).ok(),
        }
    }
}

#[derive(Debug, Clone)]
enum AuditSink {
    Stdout,
    Memory(Arc<Mutex<Vec<String>>>),
}

/// Emits audit lines. Records are written and forgotten; nothing here keeps
/// history except the in-memory sink used by tests and embedders.
#[derive(Debug, Clone)]
pub struct AuditLogger {
    sink: AuditSink,
    format: AuditFormat,
}

impl AuditLogger {
    pub fn stdout(format: AuditFormat) -> Self {
        Self { sink: AuditSink::Stdout, format }
    }

    pub fn in_memory(format: AuditFormat) -> Self {
        Self { sink: AuditSink::Memory(Arc::new(Mutex::new(Vec::new()))), format }
    }

    /// Lines captured by an in-memory logger. Always empty for stdout.
    pub fn lines(&self) -> Vec<String> {
        match &self.sink {
            AuditSink::Stdout => Vec::new(),
            AuditSink::Memory(buf) => buf.lock().map(|b| b.clone()).unwrap_or_default(),
        }
    }

    pub fn audit(&self, action: &str, detail: &str, success: bool) {
        let record = AuditRecord::new(action, detail, success);
        tracing::info!(target: "audit", action = %record.action, success, detail = %record.detail);
        match record.to_line(self.format) {
            Some(line) => self.write_line(&line),
            None => tracing::error!("failed to serialize audit record for {action}"),
        }
    }

    /// Writes a free-form human-readable line through the same sink.
    pub fn notice(&self, text: &str) {
        self.write_line(&redact(text));
    }

    fn write_line(&self, line: &str) {
        match &self.sink {
            AuditSink::Stdout => {
                let mut out = std::io::stdout().lock();
                if let Err(e) = writeln!(out, "{line}") {
                    tracing::error!("failed to write audit line: {e}");
                }
            }
            AuditSink::Memory(buf) => match buf.lock() {
                Ok(mut b) => b.push(line.to_owned()),
                Err(_) => tracing::error!("audit buffer poisoned, dropping line"),
            },
        }
    }
}

fn secret_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [r"(?i)ConvertTo-SecureString.*", r"(?i)-AsPlainText -Force", r"(?i)Password.*"]
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect()
    })
}

/// Masks password material before text reaches a log or audit line.
pub fn redact(text: &str) -> String {
    secret_patterns()
        .iter()
        .fold(text.to_owned(), |acc, re| re.replace_all(&acc, REDACTED).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_line_has_glyph_action_detail() {
        let log = AuditLogger::in_memory(AuditFormat::Text);
        log.audit("user.create", "bob", true);
        log.audit("user.delete", "alice", false);
        assert_eq!(log.lines(), vec!["[audit] ✓ user.create: bob", "[audit] ✗ user.delete: alice"]);
    }

    #[test]
    fn json_line_carries_record_fields() {
        let log = AuditLogger::in_memory(AuditFormat::Json);
        log.audit("registry.delete", "HKCU:\\Software\\Foo", true);
        let lines = log.lines();
        assert_eq!(lines.len(), 1);
        let v: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(v["action"], "registry.delete");
        assert_eq!(v["detail"], "HKCU:\\Software\\Foo");
        assert_eq!(v["success"], true);
        assert!(v["timestamp"].is_string());
    }

    #[test]
    fn secrets_are_masked() {
        let cmd = "New-LocalUser -Name \"bob\" -Password (ConvertTo-SecureString \"hunter22\" -AsPlainText -Force)";
        let out = redact(cmd);
        assert!(!out.contains("hunter22"));
        assert!(out.starts_with("New-LocalUser -Name \"bob\" -"));
        assert_eq!(redact("list users"), "list users");
    }

    #[test]
    fn clones_share_a_memory_sink() {
        let log = AuditLogger::in_memory(AuditFormat::Text);
        let other = log.clone();
        other.notice("hello");
        assert_eq!(log.lines(), vec!["hello"]);
    }
}
