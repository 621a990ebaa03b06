use crate::audit::AuditFormat;
use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub interpreter: Interpreter,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub audit: Audit,
    #[serde(default)]
    pub logging: Logging,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Interpreter {
    #[serde(default = "default_program")]
    pub program: String,
    /// Passed before the command text, which always goes last as one argument.
    #[serde(default = "default_args")]
    pub args: Vec<String>,
}
fn default_program() -> String { "powershell.exe".to_string() }
fn default_args() -> Vec<String> {
    ["-NoProfile", "-NonInteractive", "-ExecutionPolicy", "Bypass", "-WindowStyle", "Hidden", "-Command"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for Interpreter {
    fn default() -> Self {
        Self { program: default_program(), args: default_args() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Limits {
    #[serde(default = "default_timeout_s")]
    pub default_timeout_s: u64,
    #[serde(default = "default_max_timeout_s")]
    pub max_timeout_s: u64,
}
fn default_timeout_s() -> u64 { 30 }
fn default_max_timeout_s() -> u64 { 7200 }

impl Default for Limits {
    fn default() -> Self {
        Self { default_timeout_s: default_timeout_s(), max_timeout_s: default_max_timeout_s() }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Audit {
    #[serde(default)]
    pub format: AuditFormat,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Logging {
    #[serde(default)]
    pub json: bool,
}

impl Config {
    /// Reads a bridge config, JSON when the file ends in `.json` and TOML
    /// otherwise. The result has already passed [`Config::validate`].
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let cfg: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&raw).context("parsing JSON bridge config")?,
            _ => toml::from_str(&raw).context("parsing TOML bridge config")?,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Loads `path` if it exists, otherwise falls back to defaults.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.interpreter.program.trim().is_empty() { anyhow::bail!("interpreter.program must not be empty"); }
        if self.limits.default_timeout_s == 0 { anyhow::bail!("default_timeout_s must be > 0"); }
        if self.limits.max_timeout_s == 0 { anyhow::bail!("max_timeout_s must be > 0"); }
        if self.limits.default_timeout_s > self.limits.max_timeout_s {
            anyhow::bail!(
                "default_timeout_s ({}) exceeds max_timeout_s ({})",
                self.limits.default_timeout_s,
                self.limits.max_timeout_s
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_powershell() {
        let cfg = Config::default();
        assert_eq!(cfg.interpreter.program, "powershell.exe");
        assert_eq!(cfg.interpreter.args.last().map(String::as_str), Some("-Command"));
        assert!(cfg.interpreter.args.iter().any(|a| a == "-NoProfile"));
        assert_eq!(cfg.limits.default_timeout_s, 30);
        assert_eq!(cfg.limits.max_timeout_s, 7200);
        assert_eq!(cfg.audit.format, AuditFormat::Text);
        cfg.validate().unwrap();
    }

    #[test]
    fn loads_partial_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("winbridge.toml");
        fs::write(&path, "[limits]\ndefault_timeout_s = 10\n\n[audit]\nformat = \"json\"\n").unwrap();
        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.limits.default_timeout_s, 10);
        assert_eq!(cfg.limits.max_timeout_s, 7200);
        assert_eq!(cfg.audit.format, AuditFormat::Json);
        assert_eq!(cfg.interpreter.program, "powershell.exe");
    }

    #[test]
    fn loads_json_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("winbridge.json");
        fs::write(&path, r#"{"interpreter": {"program": "pwsh"}}"#).unwrap();
        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.interpreter.program, "pwsh");
        assert_eq!(cfg.interpreter.args, Interpreter::default().args);
    }

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.limits.default_timeout_s, 30);
    }

    #[test]
    fn load_rejects_zero_max_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("winbridge.toml");
        fs::write(&path, "[limits]\nmax_timeout_s = 0\n").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("max_timeout_s"));
    }

    #[test]
    fn rejects_inverted_limits() {
        let mut cfg = Config::default();
        cfg.limits.default_timeout_s = 9000;
        assert!(cfg.validate().is_err());
        cfg.limits.default_timeout_s = 0;
        assert!(cfg.validate().is_err());
    }
}
