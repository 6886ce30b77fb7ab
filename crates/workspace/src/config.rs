use crate::error::{Result, WorkspaceError};
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory (under the workspace root) holding codeprep state
pub const STATE_DIR: &str = ".codeprep";

/// Config file name inside [`STATE_DIR`]
pub const CONFIG_FILE: &str = "config.toml";

/// Workspace-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Session file, relative to the workspace root unless absolute
    pub session_file: PathBuf,

    /// Attempts for each write + format step
    pub retry_attempts: u32,

    /// Fixed delay between attempts
    pub retry_delay_ms: u64,

    /// Formatter command run after each write (`{path}` is substituted,
    /// otherwise the path is appended)
    pub format_command: Option<String>,

    /// Directory enumeration options for `add`
    pub scan: ScanOptions,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            session_file: Path::new(STATE_DIR).join("session.json"),
            retry_attempts: 5,
            retry_delay_ms: 100,
            format_command: None,
            scan: ScanOptions::default(),
        }
    }
}

/// Options for recursive directory enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Include dot-files and dot-directories
    pub include_hidden: bool,

    /// Honour .gitignore / .ignore files
    pub respect_gitignore: bool,

    /// Maximum recursion depth (None = unlimited)
    pub max_depth: Option<usize>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            include_hidden: false,
            respect_gitignore: true,
            max_depth: None,
        }
    }
}

impl WorkspaceConfig {
    /// Load `<root>/.codeprep/config.toml` (if present), then apply
    /// `CODEPREP_*` environment overrides.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(STATE_DIR).join(CONFIG_FILE);
        let mut config = match std::fs::read_to_string(&path) {
            Ok(raw) => Self::from_toml(&raw)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(err) => return Err(WorkspaceError::io(&path, err)),
        };
        config.apply_env_from(|key| std::env::var(key).ok())?;
        config.validate()?;
        log::debug!("Loaded workspace config: {config:?}");
        Ok(config)
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| WorkspaceError::InvalidConfig(e.to_string()))
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production)
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(raw) = lookup("CODEPREP_RETRY_ATTEMPTS") {
            self.retry_attempts = parse_env("CODEPREP_RETRY_ATTEMPTS", &raw)?;
        }
        if let Some(raw) = lookup("CODEPREP_RETRY_DELAY_MS") {
            self.retry_delay_ms = parse_env("CODEPREP_RETRY_DELAY_MS", &raw)?;
        }
        if let Some(raw) = lookup("CODEPREP_FORMAT_CMD") {
            let raw = raw.trim();
            self.format_command = (!raw.is_empty()).then(|| raw.to_string());
        }
        if let Some(raw) = lookup("CODEPREP_INCLUDE_HIDDEN") {
            self.scan.include_hidden = parse_flag("CODEPREP_INCLUDE_HIDDEN", &raw)?;
        }
        if let Some(raw) = lookup("CODEPREP_RESPECT_GITIGNORE") {
            self.scan.respect_gitignore = parse_flag("CODEPREP_RESPECT_GITIGNORE", &raw)?;
        }
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.retry_attempts == 0 {
            return Err(WorkspaceError::InvalidConfig(
                "retry_attempts must be > 0".to_string(),
            ));
        }
        if self.session_file.as_os_str().is_empty() {
            return Err(WorkspaceError::InvalidConfig(
                "session_file must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Retry policy for write + format
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_attempts,
            Duration::from_millis(self.retry_delay_ms),
        )
    }

    /// Absolute session file location for a workspace root
    #[must_use]
    pub fn session_path(&self, root: &Path) -> PathBuf {
        if self.session_file.is_absolute() {
            self.session_file.clone()
        } else {
            root.join(&self.session_file)
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| WorkspaceError::InvalidConfig(format!("{key}={raw:?} is not a number")))
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(WorkspaceError::InvalidConfig(format!(
            "{key}={raw:?} is not a boolean"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_valid() {
        let config = WorkspaceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.retry_policy().attempts, 5);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = WorkspaceConfig::from_toml(
            r#"
retry_attempts = 2
format_command = "prettier --write"

[scan]
include_hidden = true
"#,
        )
        .unwrap();
        assert_eq!(config.retry_attempts, 2);
        assert_eq!(config.retry_delay_ms, 100);
        assert_eq!(config.format_command.as_deref(), Some("prettier --write"));
        assert!(config.scan.include_hidden);
        assert!(config.scan.respect_gitignore);
    }

    #[test]
    fn test_bad_toml_is_invalid_config() {
        let err = WorkspaceConfig::from_toml("retry_attempts = \"many\"").unwrap_err();
        assert!(matches!(err, WorkspaceError::InvalidConfig(_)));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("CODEPREP_RETRY_ATTEMPTS", "3"),
            ("CODEPREP_RETRY_DELAY_MS", "10"),
            ("CODEPREP_FORMAT_CMD", "  "),
            ("CODEPREP_RESPECT_GITIGNORE", "off"),
        ]
        .into_iter()
        .collect();
        let mut config = WorkspaceConfig {
            format_command: Some("rustfmt".to_string()),
            ..Default::default()
        };
        config
            .apply_env_from(|key| vars.get(key).map(|v| (*v).to_string()))
            .unwrap();
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.retry_delay_ms, 10);
        assert_eq!(config.format_command, None);
        assert!(!config.scan.respect_gitignore);
    }

    #[test]
    fn test_config_validation() {
        let config = WorkspaceConfig {
            retry_attempts: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let mut bad_env = WorkspaceConfig::default();
        let result = bad_env.apply_env_from(|key| {
            (key == "CODEPREP_INCLUDE_HIDDEN").then(|| "maybe".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_session_path_resolution() {
        let config = WorkspaceConfig::default();
        assert_eq!(
            config.session_path(Path::new("/work")),
            PathBuf::from("/work/.codeprep/session.json")
        );
    }
}
