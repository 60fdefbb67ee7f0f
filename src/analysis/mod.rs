//! AST-backed definition extraction.
//!
//! Source text is parsed with tree-sitter, lowered into a small
//! language-neutral [`SyntaxNode`] tree, and walked once to produce the
//! file's [`Definition`]s:
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌────────────┐     ┌─────────────┐
//! │ Source text │────▶│ Analyzer     │────▶│ SyntaxNode │────▶│ Definitions │
//! └─────────────┘     │ (parse+lower)│     │ tree       │     │ (visitor)   │
//!                     └──────────────┘     └────────────┘     └─────────────┘
//! ```
//!
//! Extraction is pure and file-local: nothing is carried across files.
//!
//! # Adding a New Language
//!
//! 1. Create a new module in `src/analysis/languages/`
//! 2. Implement `LanguageAnalyzer` (parse + lower)
//! 3. Register it by extension in `languages/mod.rs`

mod facts;
mod languages;
mod syntax;
mod traits;

pub use facts::{Definition, DefinitionKind};
#[cfg(feature = "javascript")]
pub use languages::JavaScriptAnalyzer;
#[cfg(feature = "python")]
pub use languages::PythonAnalyzer;
pub use languages::{get_analyzer, registered_languages};
pub use syntax::{clean_docstring, collect_definitions, SyntaxNode};
pub use traits::{LanguageAnalyzer, ParsedFile};
