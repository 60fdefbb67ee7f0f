//! repo-scout - static analysis of source repositories.
//!
//! Walks a repository, extracts function and class definitions from each
//! source file, classifies them by keyword, scans the raw text for
//! hardcoded secrets and suspicious code, and aggregates everything into a
//! single [`RepositoryAnalysis`].
//!
//! # Architecture
//!
//! - `walk`: source file discovery with directory pruning and size limits
//! - `analysis`: tree-sitter backed definition extraction per language
//! - `classify`: keyword rule table mapping names to categories
//! - `detect`: regex scanning for secret and suspicious findings
//! - `runner`: parallel per-file pipeline and ordered merge
//! - `config`: YAML configuration schema
//! - `report`: output formatting (pretty, JSON)
//!
//! # Example
//!
//! ```no_run
//! use repo_scout::{Runner, ScoutConfig};
//!
//! let runner = Runner::from_config(&ScoutConfig::default())?;
//! let analysis = runner.run(std::path::Path::new("."))?;
//! println!("{} files scanned", analysis.files_scanned);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod analysis;
pub mod classify;
pub mod cli;
pub mod config;
pub mod detect;
pub mod error;
pub mod record;
pub mod report;
pub mod runner;
pub mod walk;

pub use analysis::{Definition, DefinitionKind, LanguageAnalyzer};
pub use classify::{Category, Classification, Classifier, KeywordRule};
pub use config::ScoutConfig;
pub use detect::{Finding, FindingKind, Scanner};
pub use error::{AnalysisError, ConfigError, ExtractError};
pub use record::{ParseError, RepositoryAnalysis, Summary};
pub use runner::{FileAnalysis, Runner};
pub use walk::{SourceFile, Walker};

/// Analyze `root` with the default configuration.
pub fn analyze<P: AsRef<std::path::Path>>(root: P) -> anyhow::Result<RepositoryAnalysis> {
    let runner = Runner::from_config(&ScoutConfig::default())?;
    Ok(runner.run(root.as_ref())?)
}
