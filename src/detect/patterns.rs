//! Regular-expression scanning for secrets and suspicious code.
//!
//! Every configured pattern is run over the whole file text independently.
//! Each non-overlapping match yields one [`Finding`]; the same line can
//! collect findings from several patterns. Matched text is never interpreted.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

use super::{Finding, FindingKind};

/// Default secret patterns.
pub const DEFAULT_SECRET_PATTERNS: &[&str] = &[
    r#"(?i)(api[_-]?key|apikey)\s*[:=]\s*['"][a-zA-Z0-9_\-]{20,}['"]"#,
    r#"(?i)(secret|password|passwd|pwd)\s*[:=]\s*['"][^'"]{8,}['"]"#,
    r#"(?i)(token|auth)\s*[:=]\s*['"][a-zA-Z0-9_\-]{20,}['"]"#,
    r"(?i)(private[_-]?key)\s*[:=]",
    r"(?i)(aws[_-]?access[_-]?key|aws[_-]?secret)",
    r"(?i)(github[_-]?token|gh[_-]?token)",
];

/// Default suspicious-code patterns: dynamic execution, shell invocation,
/// and unsafe deserialization.
pub const DEFAULT_SUSPICIOUS_PATTERNS: &[&str] = &[
    r"eval\s*\(",
    r"exec\s*\(",
    r"__import__\s*\(",
    r"subprocess\.",
    r"os\.system\s*\(",
    r"os\.popen\s*\(",
    r"commands\.getoutput",
    r"pickle\.loads",
    r"marshal\.loads",
];

/// A configured pattern: either a bare regex, identified by its own source,
/// or a regex with an explicit id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatternSpec {
    Plain(String),
    Named { id: String, pattern: String },
}

impl PatternSpec {
    pub fn pattern(&self) -> &str {
        match self {
            PatternSpec::Plain(pattern) => pattern,
            PatternSpec::Named { pattern, .. } => pattern,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            PatternSpec::Plain(pattern) => pattern,
            PatternSpec::Named { id, .. } => id,
        }
    }

    /// Wrap a list of bare regex strings.
    pub fn plain_list(patterns: &[&str]) -> Vec<PatternSpec> {
        patterns
            .iter()
            .map(|p| PatternSpec::Plain(p.to_string()))
            .collect()
    }
}

/// Pre-compiled pattern with metadata.
#[derive(Debug, Clone)]
struct CompiledPattern {
    id: String,
    regex: Regex,
}

/// An ordered list of compiled patterns sharing one finding kind.
#[derive(Debug, Clone)]
pub struct PatternSet {
    kind: FindingKind,
    patterns: Vec<CompiledPattern>,
}

impl PatternSet {
    /// Compile every pattern; the first invalid one is reported.
    pub fn compile(kind: FindingKind, specs: &[PatternSpec]) -> Result<Self, ConfigError> {
        let patterns = specs
            .iter()
            .map(|spec| {
                let regex =
                    Regex::new(spec.pattern()).map_err(|source| ConfigError::InvalidPattern {
                        pattern: spec.pattern().to_string(),
                        source,
                    })?;
                Ok(CompiledPattern {
                    id: spec.id().to_string(),
                    regex,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self { kind, patterns })
    }

    pub fn kind(&self) -> FindingKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Run every pattern over `text`, appending findings for `file` to `out`.
    pub fn scan_into(&self, text: &str, lines: &LineIndex, file: &str, out: &mut Vec<Finding>) {
        for p in &self.patterns {
            for mat in p.regex.find_iter(text) {
                let line = lines.line_of(mat.start());
                out.push(Finding {
                    kind: self.kind,
                    file: file.to_string(),
                    line,
                    pattern_id: p.id.clone(),
                    context: lines.line_text(text, line).trim().to_string(),
                });
            }
        }
    }
}

/// Byte offsets of line starts, for mapping match offsets to lines.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    /// 1-indexed line containing byte `offset`: the number of newlines
    /// strictly before it, plus one.
    pub fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset)
    }

    /// Text of 1-indexed `line`, without its newline.
    pub fn line_text<'a>(&self, text: &'a str, line: usize) -> &'a str {
        let start = self.starts[line - 1];
        let end = self
            .starts
            .get(line)
            .map(|next| next - 1)
            .unwrap_or(text.len());
        &text[start..end]
    }
}

/// Scans file text with the secret and suspicious pattern sets.
#[derive(Debug, Clone)]
pub struct Scanner {
    sets: Vec<PatternSet>,
}

impl Scanner {
    /// Build a scanner from the two pattern lists.
    pub fn new(secret: &[PatternSpec], suspicious: &[PatternSpec]) -> Result<Self, ConfigError> {
        Ok(Self {
            sets: vec![
                PatternSet::compile(FindingKind::Secret, secret)?,
                PatternSet::compile(FindingKind::Suspicious, suspicious)?,
            ],
        })
    }

    /// Scan one file's text. Findings are grouped by kind, then by pattern,
    /// then by position.
    pub fn scan(&self, text: &str, file: &str) -> Vec<Finding> {
        let mut findings = Vec::new();
        if self.sets.iter().all(|s| s.is_empty()) {
            return findings;
        }

        let lines = LineIndex::new(text);
        for set in &self.sets {
            set.scan_into(text, &lines, file, &mut findings);
        }
        findings
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(
            &PatternSpec::plain_list(DEFAULT_SECRET_PATTERNS),
            &PatternSpec::plain_list(DEFAULT_SUSPICIOUS_PATTERNS),
        )
        .expect("default patterns compile")
    }
}
