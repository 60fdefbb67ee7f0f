//! Core types for pattern findings.

use serde::{Deserialize, Serialize};

/// Which pattern set produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingKind {
    Secret,
    Suspicious,
}

impl FindingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingKind::Secret => "secret",
            FindingKind::Suspicious => "suspicious",
        }
    }
}

impl std::fmt::Display for FindingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single pattern match in a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub file: String,
    /// Line number (1-indexed).
    pub line: usize,
    /// Identifies the configured pattern that matched.
    pub pattern_id: String,
    /// The matched source line, trimmed.
    pub context: String,
}

impl Finding {
    /// Create a unique key for this finding (for deduplication/comparison).
    pub fn key(&self) -> String {
        format!("{}|{}|{}|{}", self.kind, self.file, self.line, self.pattern_id)
    }
}
