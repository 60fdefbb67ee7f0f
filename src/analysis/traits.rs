//! Core traits for language analysis.

use crate::error::ExtractError;

use super::{collect_definitions, Definition, SyntaxNode};

/// Holds a parsed tree-sitter tree and associated metadata.
pub struct ParsedFile {
    /// The tree-sitter parse tree.
    pub tree: tree_sitter::Tree,
    /// The source bytes (kept for node text extraction).
    pub source: Vec<u8>,
    /// The repo-relative file path.
    pub path: String,
}

impl ParsedFile {
    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: tree_sitter::Node) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }

    /// Describe the first malformed region of the tree, if any.
    ///
    /// Tree-sitter recovers from bad input by inserting `ERROR` and
    /// `MISSING` nodes; either one means the file is not valid source.
    pub fn syntax_error(&self) -> Option<String> {
        let root = self.tree.root_node();
        if !root.has_error() {
            return None;
        }

        let mut cursor = root.walk();
        loop {
            let node = cursor.node();
            if node.is_error() {
                let text = self.node_text(node).lines().next().unwrap_or("").trim();
                return Some(format!(
                    "invalid syntax at line {} near {:?}",
                    node.start_position().row + 1,
                    text
                ));
            }
            if node.is_missing() {
                return Some(format!(
                    "missing {:?} at line {}",
                    node.kind(),
                    node.start_position().row + 1
                ));
            }

            // Only descend into subtrees that contain the error.
            if node.has_error() && cursor.goto_first_child() {
                continue;
            }
            loop {
                if cursor.goto_next_sibling() {
                    break;
                }
                if !cursor.goto_parent() {
                    return Some(format!(
                        "invalid syntax at line {}",
                        root.start_position().row + 1
                    ));
                }
            }
        }
    }

    /// The first node in document order that satisfies `pred`.
    pub fn find_node<F>(&self, pred: F) -> Option<tree_sitter::Node<'_>>
    where
        F: Fn(tree_sitter::Node) -> bool,
    {
        let mut cursor = self.tree.root_node().walk();
        loop {
            let node = cursor.node();
            if pred(node) {
                return Some(node);
            }
            if cursor.goto_first_child() {
                continue;
            }
            loop {
                if cursor.goto_next_sibling() {
                    break;
                }
                if !cursor.goto_parent() {
                    return None;
                }
            }
        }
    }
}

/// Language-specific analyzer trait.
///
/// Each language implements parsing and lowering into [`SyntaxNode`]s; the
/// shared [`LanguageAnalyzer::extract`] turns that into definitions.
///
/// # Thread Safety
///
/// Note: tree_sitter::Parser is not Sync, so implementations should
/// create parsers as needed.
pub trait LanguageAnalyzer: Send + Sync {
    /// Returns the language identifier (e.g., "python").
    fn language_id(&self) -> &'static str;

    /// Returns file extensions this analyzer handles (without dot).
    fn file_extensions(&self) -> &'static [&'static str];

    /// Parse a source file into a tree-sitter tree.
    ///
    /// Malformed input still yields a tree with ERROR nodes; only a parser
    /// that cannot run returns an error here.
    fn parse(&self, path: &str, source: &[u8]) -> Result<ParsedFile, ExtractError>;

    /// Lower a parsed file into the language-neutral syntax tree.
    fn lower(&self, parsed: &ParsedFile) -> Vec<SyntaxNode>;

    /// Reason the parsed file is not valid source, if it is not.
    ///
    /// Grammars that accept constructs the language itself rejects override
    /// this to reject them as well.
    fn check_syntax(&self, parsed: &ParsedFile) -> Option<String> {
        parsed.syntax_error()
    }

    /// Parse `source` and extract its definitions.
    ///
    /// Fails with [`ExtractError::Syntax`] if the file is malformed.
    fn extract(&self, path: &str, source: &[u8]) -> Result<Vec<Definition>, ExtractError> {
        let parsed = self.parse(path, source)?;
        if let Some(reason) = self.check_syntax(&parsed) {
            return Err(ExtractError::Syntax(reason));
        }
        let tree = self.lower(&parsed);
        Ok(collect_definitions(&tree, path))
    }

    /// Check if this analyzer handles the given file extension.
    fn handles_extension(&self, ext: &str) -> bool {
        self.file_extensions().contains(&ext)
    }
}
