//! JavaScript language analyzer using tree-sitter.

use tree_sitter::{Language, Node, Parser};

use crate::analysis::{clean_docstring, LanguageAnalyzer, ParsedFile, SyntaxNode};
use crate::error::ExtractError;

/// Statement kinds whose children may hold further declarations.
const CONTAINER_KINDS: &[&str] = &[
    "program",
    "statement_block",
    "export_statement",
    "if_statement",
    "else_clause",
    "for_statement",
    "for_in_statement",
    "while_statement",
    "do_statement",
    "try_statement",
    "catch_clause",
    "finally_clause",
    "switch_statement",
    "switch_body",
    "switch_case",
    "switch_default",
    "labeled_statement",
];

pub struct JavaScriptAnalyzer {
    language: Language,
}

impl JavaScriptAnalyzer {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_javascript::LANGUAGE.into(),
        }
    }

    fn create_parser(&self) -> Result<Parser, ExtractError> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| ExtractError::Parser(e.to_string()))?;
        Ok(parser)
    }

    fn lower_children(&self, parsed: &ParsedFile, node: Node) -> Vec<SyntaxNode> {
        let mut cursor = node.walk();
        let children: Vec<Node> = node.named_children(&mut cursor).collect();
        children
            .into_iter()
            .flat_map(|child| self.lower_node(parsed, child))
            .collect()
    }

    /// Lower one node. Variable declarations can bind several functions, so
    /// this returns a list.
    fn lower_node(&self, parsed: &ParsedFile, node: Node) -> Vec<SyntaxNode> {
        match node.kind() {
            "function_declaration" | "generator_function_declaration" => {
                self.lower_function(parsed, node, node).into_iter().collect()
            }
            "class_declaration" => self.lower_class(parsed, node).into_iter().collect(),
            "lexical_declaration" | "variable_declaration" => {
                self.lower_declarators(parsed, node)
            }
            kind if CONTAINER_KINDS.contains(&kind) => {
                let children = self.lower_children(parsed, node);
                if children.is_empty() {
                    vec![]
                } else {
                    vec![SyntaxNode::Other(children)]
                }
            }
            _ => vec![],
        }
    }

    /// Lower a function-like node. `anchor` is the node a doc comment would
    /// precede, which differs from `func` for `const f = () => {}`.
    fn lower_function(&self, parsed: &ParsedFile, func: Node, anchor: Node) -> Option<SyntaxNode> {
        let name_node = match func.child_by_field_name("name") {
            Some(n) => n,
            None => anchor.child_by_field_name("name")?,
        };
        let body = func.child_by_field_name("body");

        let parameters = match func.child_by_field_name("parameters") {
            Some(params) => self.parameters(parsed, params),
            // Single-parameter arrow functions: `x => x * 2`
            None => func
                .child_by_field_name("parameter")
                .map(|p| vec![parsed.node_text(p).to_string()])
                .unwrap_or_default(),
        };

        Some(SyntaxNode::Callable {
            name: parsed.node_text(name_node).to_string(),
            line: anchor.start_position().row + 1,
            parameters,
            docstring: self.doc_comment(parsed, anchor),
            returns: None,
            body: body
                .filter(|b| b.kind() == "statement_block")
                .map(|b| self.lower_children(parsed, b))
                .unwrap_or_default(),
        })
    }

    fn lower_class(&self, parsed: &ParsedFile, node: Node) -> Option<SyntaxNode> {
        let name = parsed.node_text(node.child_by_field_name("name")?).to_string();

        let bases = node
            .named_children(&mut node.walk())
            .filter(|c| c.kind() == "class_heritage")
            .filter_map(|heritage| heritage.named_child(0))
            .map(|expr| parsed.node_text(expr).to_string())
            .collect();

        let body = node
            .child_by_field_name("body")
            .map(|class_body| {
                let mut cursor = class_body.walk();
                let members: Vec<Node> = class_body
                    .named_children(&mut cursor)
                    .filter(|m| m.kind() == "method_definition")
                    .collect();
                members
                    .into_iter()
                    .filter_map(|m| self.lower_function(parsed, m, m))
                    .collect()
            })
            .unwrap_or_default();

        Some(SyntaxNode::Aggregate {
            name,
            line: node.start_position().row + 1,
            bases,
            docstring: self.doc_comment(parsed, node),
            body,
        })
    }

    /// `const name = function () {}` and `let name = () => {}` bindings.
    fn lower_declarators(&self, parsed: &ParsedFile, decl: Node) -> Vec<SyntaxNode> {
        let mut cursor = decl.walk();
        let declarators: Vec<Node> = decl
            .named_children(&mut cursor)
            .filter(|d| d.kind() == "variable_declarator")
            .collect();

        let mut nodes = Vec::new();
        for declarator in declarators {
            let Some(value) = declarator.child_by_field_name("value") else {
                continue;
            };
            if !matches!(
                value.kind(),
                "arrow_function" | "function_expression" | "function" | "generator_function"
            ) {
                continue;
            }
            // The doc comment precedes the whole declaration.
            if let Some(mut callable) = self.lower_function(parsed, value, declarator) {
                if let SyntaxNode::Callable {
                    ref mut name,
                    ref mut line,
                    ref mut docstring,
                    ..
                } = callable
                {
                    if let Some(binding) = declarator.child_by_field_name("name") {
                        *name = parsed.node_text(binding).to_string();
                    }
                    *line = decl.start_position().row + 1;
                    *docstring = self.doc_comment(parsed, decl);
                }
                nodes.push(callable);
            }
        }
        nodes
    }

    fn parameters(&self, parsed: &ParsedFile, params: Node) -> Vec<String> {
        params
            .named_children(&mut params.walk())
            .filter_map(|param| match param.kind() {
                "identifier" => Some(param),
                "assignment_pattern" => param
                    .child_by_field_name("left")
                    .filter(|left| left.kind() == "identifier"),
                _ => None,
            })
            .map(|node| parsed.node_text(node).to_string())
            .collect()
    }

    /// A `/** ... */` comment ending on the line directly above `node`
    /// (or above its `export` wrapper).
    fn doc_comment(&self, parsed: &ParsedFile, node: Node) -> Option<String> {
        let target = match node.parent() {
            Some(parent) if parent.kind() == "export_statement" => parent,
            _ => node,
        };

        let prev = target.prev_named_sibling()?;
        if prev.kind() != "comment" || prev.end_position().row + 1 < target.start_position().row {
            return None;
        }

        let text = parsed.node_text(prev);
        let inner = text.strip_prefix("/**")?.strip_suffix("*/")?;
        let stripped: Vec<&str> = inner
            .lines()
            .map(|line| {
                let trimmed = line.trim_start();
                match trimmed.strip_prefix('*') {
                    Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
                    None => trimmed,
                }
                .trim_end()
            })
            .collect();

        let doc = clean_docstring(&stripped.join("\n"));
        if doc.is_empty() {
            None
        } else {
            Some(doc)
        }
    }
}

impl Default for JavaScriptAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAnalyzer for JavaScriptAnalyzer {
    fn language_id(&self) -> &'static str {
        "javascript"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["js", "jsx", "mjs", "cjs"]
    }

    fn parse(&self, path: &str, source: &[u8]) -> Result<ParsedFile, ExtractError> {
        let mut parser = self.create_parser()?;
        let tree = parser.parse(source, None).ok_or_else(|| {
            ExtractError::Parser(format!("failed to parse JavaScript source: {}", path))
        })?;

        Ok(ParsedFile {
            tree,
            source: source.to_vec(),
            path: path.to_string(),
        })
    }

    fn lower(&self, parsed: &ParsedFile) -> Vec<SyntaxNode> {
        self.lower_children(parsed, parsed.tree.root_node())
    }
}
