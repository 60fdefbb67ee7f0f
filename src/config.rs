//! Configuration schema for repo-scout.
//!
//! Every section and field has a default, so an empty YAML file is a valid
//! configuration and produces the built-in behavior.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::classify::{default_rules, KeywordRule};
use crate::detect::{
    PatternSpec, Scanner, DEFAULT_SECRET_PATTERNS, DEFAULT_SUSPICIOUS_PATTERNS,
};
use crate::error::ConfigError;
use crate::walk::Walker;

/// File names checked by [`ScoutConfig::discover`], in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["repo-scout.yaml", ".repo-scout.yaml", "scout.yaml"];

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct ScoutConfig {
    #[serde(default)]
    pub walker: WalkerConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    /// Worker count; absent means the global rayon pool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,
}

impl ScoutConfig {
    /// Parse a configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: ScoutConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load the first known configuration file in `dir`, or the defaults.
    pub fn discover<P: AsRef<Path>>(dir: P) -> anyhow::Result<(Self, Option<PathBuf>)> {
        for name in CONFIG_FILE_NAMES {
            let candidate = dir.as_ref().join(name);
            if candidate.is_file() {
                let config = Self::load(&candidate)?;
                return Ok((config, Some(candidate)));
            }
        }
        Ok((Self::default(), None))
    }

    /// Check that every regex and glob compiles.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Walker::new(&self.walker)?;
        Scanner::new(
            &self.security.active_secret_patterns(),
            &self.security.active_suspicious_patterns(),
        )?;
        Ok(())
    }

    /// Render as YAML, as written by `repo-scout init`.
    pub fn to_yaml(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Which files the walker yields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WalkerConfig {
    /// Directory names pruned wherever they appear below the root.
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,
    /// Glob patterns matched against repo-relative paths (e.g. "docs/**").
    #[serde(default)]
    pub exclude_paths: Vec<String>,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Files larger than this many bytes are skipped.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            exclude_dirs: default_exclude_dirs(),
            exclude_paths: Vec::new(),
            extensions: default_extensions(),
            max_file_size: default_max_file_size(),
        }
    }
}

impl WalkerConfig {
    /// Extensions with a leading dot, empty entries dropped.
    pub fn normalized_extensions(&self) -> Vec<String> {
        self.extensions
            .iter()
            .map(|e| e.trim())
            .filter(|e| !e.is_empty())
            .map(|e| {
                if e.starts_with('.') {
                    e.to_string()
                } else {
                    format!(".{}", e)
                }
            })
            .collect()
    }
}

fn default_exclude_dirs() -> Vec<String> {
    [
        ".git",
        ".hg",
        ".svn",
        "__pycache__",
        "node_modules",
        "venv",
        ".venv",
        "env",
        ".tox",
        ".mypy_cache",
        ".pytest_cache",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_extensions() -> Vec<String> {
    vec![".py".to_string()]
}

fn default_max_file_size() -> u64 {
    1_048_576
}

/// Keyword rule table for the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_rules")]
    pub rules: Vec<KeywordRule>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            rules: default_rules(),
        }
    }
}

/// Pattern scanning settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SecurityConfig {
    #[serde(default = "default_true")]
    pub scan_secrets: bool,
    #[serde(default = "default_true")]
    pub scan_patterns: bool,
    #[serde(default = "default_secret_patterns")]
    pub secret_patterns: Vec<PatternSpec>,
    #[serde(default = "default_suspicious_patterns")]
    pub suspicious_patterns: Vec<PatternSpec>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            scan_secrets: true,
            scan_patterns: true,
            secret_patterns: default_secret_patterns(),
            suspicious_patterns: default_suspicious_patterns(),
        }
    }
}

impl SecurityConfig {
    /// Secret patterns to run; empty when secret scanning is off.
    pub fn active_secret_patterns(&self) -> Vec<PatternSpec> {
        if self.scan_secrets {
            self.secret_patterns.clone()
        } else {
            Vec::new()
        }
    }

    /// Suspicious patterns to run; empty when pattern scanning is off.
    pub fn active_suspicious_patterns(&self) -> Vec<PatternSpec> {
        if self.scan_patterns {
            self.suspicious_patterns.clone()
        } else {
            Vec::new()
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_secret_patterns() -> Vec<PatternSpec> {
    PatternSpec::plain_list(DEFAULT_SECRET_PATTERNS)
}

fn default_suspicious_patterns() -> Vec<PatternSpec> {
    PatternSpec::plain_list(DEFAULT_SUSPICIOUS_PATTERNS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Category;
    use tempfile::TempDir;

    #[test]
    fn test_empty_config_is_default() {
        let config: ScoutConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, ScoutConfig::default());
        assert_eq!(config.walker.max_file_size, 1_048_576);
        assert!(config.walker.exclude_dirs.contains(&"node_modules".to_string()));
        assert_eq!(config.classifier.rules.len(), 3);
        assert!(config.threads.is_none());
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
walker:
  extensions: [py, ".js"]
  max_file_size: 2048
classifier:
  rules:
    - category: execution
      keywords: [fill, slippage]
security:
  scan_patterns: false
  secret_patterns:
    - id: stripe
      pattern: 'sk_live_\w+'
threads: 4
"#;
        let config: ScoutConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.walker.normalized_extensions(), vec![".py", ".js"]);
        assert_eq!(config.walker.max_file_size, 2048);
        assert_eq!(
            config.walker.exclude_dirs,
            default_exclude_dirs(),
            "unspecified fields keep their defaults"
        );
        assert_eq!(
            config.classifier.rules[0].category,
            Category::Custom("execution".to_string())
        );
        assert!(config.security.scan_secrets);
        assert!(config.security.active_suspicious_patterns().is_empty());
        assert_eq!(config.security.active_secret_patterns()[0].id(), "stripe");
        assert_eq!(config.threads, Some(4));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_regex() {
        let mut config = ScoutConfig::default();
        config
            .security
            .suspicious_patterns
            .push(PatternSpec::Plain("eval(".to_string()));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPattern { .. })
        ));

        // Disabled pattern lists are not compiled.
        config.security.scan_patterns = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_roundtrip_of_defaults() {
        let yaml = ScoutConfig::default().to_yaml().unwrap();
        let parsed: ScoutConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, ScoutConfig::default());
    }

    #[test]
    fn test_discover() {
        let temp = TempDir::new().unwrap();
        let (config, path) = ScoutConfig::discover(temp.path()).unwrap();
        assert!(path.is_none());
        assert_eq!(config, ScoutConfig::default());

        fs::write(temp.path().join(".repo-scout.yaml"), "threads: 2\n").unwrap();
        let (config, path) = ScoutConfig::discover(temp.path()).unwrap();
        assert_eq!(config.threads, Some(2));
        assert!(path.unwrap().ends_with(".repo-scout.yaml"));
    }
}
