//! Error taxonomy for the analysis pipeline.
//!
//! Only [`AnalysisError`] ever aborts a run. Extraction failures are folded
//! into the result as parse-error records, and oversize files are not errors
//! at all.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors that stop a repository walk before any result is produced.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("cannot read repository root {}: {source}", path.display())]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("repository root {} is not a directory", path.display())]
    RootNotDirectory { path: PathBuf },
}

/// Errors produced while extracting definitions from a single file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// The source text is malformed.
    #[error("syntax error: {0}")]
    Syntax(String),
    /// The parser could not run at all.
    #[error("parser failure: {0}")]
    Parser(String),
    /// No analyzer is registered for this file's extension.
    #[error("no analyzer registered for extension {0:?}")]
    UnsupportedLanguage(String),
}

/// Configuration rejected before a run starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("invalid exclude_paths pattern {pattern:?}: {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ExtractError::Syntax("invalid syntax at line 3".to_string());
        assert_eq!(err.to_string(), "syntax error: invalid syntax at line 3");

        let err = AnalysisError::RootNotDirectory {
            path: PathBuf::from("/tmp/missing"),
        };
        assert!(err.to_string().contains("/tmp/missing"));
    }
}
