//! Language-neutral syntax tree and the definition visitor.
//!
//! Each language analyzer lowers its tree-sitter tree into [`SyntaxNode`]s,
//! keeping only what definition extraction needs. [`collect_definitions`]
//! then walks that tree once and produces the flat definition list for a
//! file.

use std::collections::HashSet;

use super::{Definition, DefinitionKind};

/// A node of the lowered syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxNode {
    /// A class or other aggregate-type declaration.
    Aggregate {
        name: String,
        line: usize,
        bases: Vec<String>,
        docstring: Option<String>,
        /// Statements of the type body, in source order.
        body: Vec<SyntaxNode>,
    },
    /// A function or method declaration.
    Callable {
        name: String,
        line: usize,
        parameters: Vec<String>,
        docstring: Option<String>,
        returns: Option<String>,
        body: Vec<SyntaxNode>,
    },
    /// Any other construct that contains declarations (blocks, conditionals,
    /// exported statements, ...).
    Other(Vec<SyntaxNode>),
}

/// Walk the lowered tree depth-first and collect definitions for `file`.
///
/// Callables declared directly in an aggregate body are recorded as that
/// aggregate's members and are not repeated at the top level. Everything
/// nested deeper, including declarations inside member bodies, is recorded
/// in the flat list.
///
/// `(line, name)` is unique across the file, members included: a later
/// declaration reusing both (`function f(){} function f(){}` on one line)
/// is dropped, though its body is still visited.
pub fn collect_definitions(nodes: &[SyntaxNode], file: &str) -> Vec<Definition> {
    let mut visitor = DefinitionVisitor {
        file,
        definitions: Vec::new(),
        seen: HashSet::new(),
    };
    visitor.visit_all(nodes);
    visitor.definitions
}

struct DefinitionVisitor<'a> {
    file: &'a str,
    definitions: Vec<Definition>,
    seen: HashSet<(usize, String)>,
}

impl DefinitionVisitor<'_> {
    fn visit_all(&mut self, nodes: &[SyntaxNode]) {
        for node in nodes {
            self.visit(node);
        }
    }

    /// Record `(line, name)`; false if it was already taken.
    fn claim(&mut self, line: usize, name: &str) -> bool {
        self.seen.insert((line, name.to_string()))
    }

    fn visit(&mut self, node: &SyntaxNode) {
        match node {
            SyntaxNode::Aggregate {
                name,
                line,
                bases,
                docstring,
                body,
            } => {
                if self.claim(*line, name) {
                    let mut members = Vec::new();
                    for child in body {
                        if let Some(member) = self.callable(child) {
                            if self.claim(member.line, &member.name) {
                                members.push(member);
                            }
                        }
                    }

                    self.definitions.push(Definition {
                        name: name.clone(),
                        kind: DefinitionKind::AggregateType,
                        file: self.file.to_string(),
                        line: *line,
                        parameters: Vec::new(),
                        docstring: docstring.clone(),
                        returns: None,
                        bases: bases.clone(),
                        members,
                    });
                }

                for child in body {
                    match child {
                        // Already recorded as a member; only its body remains.
                        SyntaxNode::Callable { body, .. } => self.visit_all(body),
                        other => self.visit(other),
                    }
                }
            }
            SyntaxNode::Callable { body, .. } => {
                if let Some(definition) = self.callable(node) {
                    if self.claim(definition.line, &definition.name) {
                        self.definitions.push(definition);
                    }
                }
                self.visit_all(body);
            }
            SyntaxNode::Other(children) => self.visit_all(children),
        }
    }

    fn callable(&self, node: &SyntaxNode) -> Option<Definition> {
        match node {
            SyntaxNode::Callable {
                name,
                line,
                parameters,
                docstring,
                returns,
                ..
            } => Some(Definition {
                name: name.clone(),
                kind: DefinitionKind::Callable,
                file: self.file.to_string(),
                line: *line,
                parameters: parameters.clone(),
                docstring: docstring.clone(),
                returns: returns.clone(),
                bases: Vec::new(),
                members: Vec::new(),
            }),
            _ => None,
        }
    }
}

/// Clean a documentation string the way Python's `inspect.cleandoc` does.
///
/// The first line loses its leading whitespace, the common indentation of
/// the remaining lines is removed, and leading and trailing blank lines are
/// dropped.
pub fn clean_docstring(raw: &str) -> String {
    let expanded: Vec<String> = raw.lines().map(expand_tabs).collect();
    let mut lines: Vec<&str> = expanded.iter().map(String::as_str).collect();
    if lines.is_empty() {
        return String::new();
    }

    let margin = lines[1..]
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut cleaned: Vec<String> = Vec::with_capacity(lines.len());
    cleaned.push(lines.remove(0).trim_start().to_string());
    for line in lines {
        if line.trim().is_empty() {
            cleaned.push(String::new());
        } else {
            cleaned.push(line.get(margin..).unwrap_or(line.trim_start()).to_string());
        }
    }

    while cleaned.first().is_some_and(|l| l.trim().is_empty()) {
        cleaned.remove(0);
    }
    while cleaned.last().is_some_and(|l| l.trim().is_empty()) {
        cleaned.pop();
    }

    cleaned.join("\n")
}

/// Replace tabs with spaces up to the next multiple-of-eight column.
fn expand_tabs(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut column = 0;
    for c in line.chars() {
        if c == '\t' {
            let pad = 8 - column % 8;
            out.extend(std::iter::repeat(' ').take(pad));
            column += pad;
        } else {
            out.push(c);
            column += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn func(name: &str, line: usize, body: Vec<SyntaxNode>) -> SyntaxNode {
        SyntaxNode::Callable {
            name: name.to_string(),
            line,
            parameters: vec![],
            docstring: None,
            returns: None,
            body,
        }
    }

    #[test]
    fn test_members_not_duplicated() {
        let tree = vec![SyntaxNode::Aggregate {
            name: "MomentumStrategy".to_string(),
            line: 1,
            bases: vec![],
            docstring: None,
            body: vec![func("generate_signal", 2, vec![])],
        }];

        let defs = collect_definitions(&tree, "a.py");
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].members.len(), 1);
        assert_eq!(defs[0].members[0].name, "generate_signal");
        assert_eq!(defs[0].members[0].file, "a.py");
    }

    #[test]
    fn test_nested_callables_are_captured() {
        let tree = vec![
            func("outer", 1, vec![func("inner", 2, vec![])]),
            SyntaxNode::Aggregate {
                name: "Bot".to_string(),
                line: 5,
                bases: vec![],
                docstring: None,
                body: vec![func("run", 6, vec![func("helper", 7, vec![])])],
            },
            SyntaxNode::Other(vec![func("conditional", 10, vec![])]),
        ];

        let names: Vec<_> = collect_definitions(&tree, "bot.py")
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["outer", "inner", "Bot", "helper", "conditional"]);
    }

    #[test]
    fn test_conditional_method_is_not_member() {
        // A def under an `if` in the class body is not a direct member.
        let tree = vec![SyntaxNode::Aggregate {
            name: "Bot".to_string(),
            line: 1,
            bases: vec![],
            docstring: None,
            body: vec![SyntaxNode::Other(vec![func("maybe", 3, vec![])])],
        }];

        let defs = collect_definitions(&tree, "bot.py");
        assert_eq!(defs.len(), 2);
        assert!(defs[0].members.is_empty());
        assert_eq!(defs[1].name, "maybe");
    }

    #[test]
    fn test_repeated_name_on_one_line_kept_once() {
        let tree = vec![
            func("sma", 1, vec![func("inner", 1, vec![])]),
            func("sma", 1, vec![]),
            func("sma", 2, vec![]),
            SyntaxNode::Aggregate {
                name: "Bot".to_string(),
                line: 3,
                bases: vec![],
                docstring: None,
                body: vec![func("run", 3, vec![]), func("run", 3, vec![])],
            },
        ];

        let defs = collect_definitions(&tree, "m.js");
        let keys: Vec<_> = defs.iter().map(|d| d.key()).collect();
        assert_eq!(
            keys,
            vec![
                ("m.js", 1, "sma"),
                ("m.js", 1, "inner"),
                ("m.js", 2, "sma"),
                ("m.js", 3, "Bot"),
            ]
        );
        assert_eq!(defs[3].members.len(), 1);
    }

    #[test]
    fn test_clean_docstring() {
        let raw = "Generate signal.\n\n        Args:\n            prices: history\n        ";
        assert_eq!(
            clean_docstring(raw),
            "Generate signal.\n\nArgs:\n    prices: history"
        );
        assert_eq!(clean_docstring("  one line"), "one line");
        assert_eq!(clean_docstring("Don't\tstop"), "Don't   stop");
        assert_eq!(clean_docstring("a\n\tb\n\t  c"), "a\nb\n  c");
        assert_eq!(clean_docstring("\n   indented\n   body\n"), "indented\nbody");
    }
}
