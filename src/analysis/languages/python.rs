//! Python language analyzer using tree-sitter.

use lazy_static::lazy_static;
use regex::Regex;
use tree_sitter::{Language, Node, Parser};

use crate::analysis::{clean_docstring, LanguageAnalyzer, ParsedFile, SyntaxNode};
use crate::error::ExtractError;

lazy_static! {
    /// String prefix and opening quote of a Python string literal.
    static ref STRING_OPEN: Regex = Regex::new(r#"^([A-Za-z]*)("""|'''|"|')"#).unwrap();
}

/// Statement kinds whose children may hold further definitions.
const CONTAINER_KINDS: &[&str] = &[
    "module",
    "block",
    "if_statement",
    "elif_clause",
    "else_clause",
    "for_statement",
    "while_statement",
    "try_statement",
    "except_clause",
    "except_group_clause",
    "finally_clause",
    "with_statement",
    "match_statement",
    "case_clause",
];

/// Python 2 constructs the grammar still accepts, with how to report them.
const PYTHON2_KINDS: &[(&str, &str)] = &[
    ("print_statement", "Python 2 print statement"),
    ("exec_statement", "Python 2 exec statement"),
    ("tuple_parameter", "Python 2 tuple parameter"),
];

pub struct PythonAnalyzer {
    language: Language,
}

impl PythonAnalyzer {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_python::LANGUAGE.into(),
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
            .filter_map(|child| self.lower_node(parsed, child))
            .collect()
    }

    fn lower_node(&self, parsed: &ParsedFile, node: Node) -> Option<SyntaxNode> {
        match node.kind() {
            "function_definition" => self.lower_function(parsed, node),
            "class_definition" => self.lower_class(parsed, node),
            "decorated_definition" => node
                .child_by_field_name("definition")
                .and_then(|def| self.lower_node(parsed, def)),
            kind if CONTAINER_KINDS.contains(&kind) => {
                let children = self.lower_children(parsed, node);
                if children.is_empty() {
                    None
                } else {
                    Some(SyntaxNode::Other(children))
                }
            }
            _ => None,
        }
    }

    fn lower_function(&self, parsed: &ParsedFile, node: Node) -> Option<SyntaxNode> {
        let name = parsed.node_text(node.child_by_field_name("name")?).to_string();
        let body = node.child_by_field_name("body");

        Some(SyntaxNode::Callable {
            name,
            line: node.start_position().row + 1,
            parameters: node
                .child_by_field_name("parameters")
                .map(|params| self.parameters(parsed, params))
                .unwrap_or_default(),
            docstring: body.and_then(|b| self.docstring(parsed, b)),
            returns: node
                .child_by_field_name("return_type")
                .map(|t| parsed.node_text(t).to_string()),
            body: body
                .map(|b| self.lower_children(parsed, b))
                .unwrap_or_default(),
        })
    }

    fn lower_class(&self, parsed: &ParsedFile, node: Node) -> Option<SyntaxNode> {
        let name = parsed.node_text(node.child_by_field_name("name")?).to_string();
        let body = node.child_by_field_name("body");

        Some(SyntaxNode::Aggregate {
            name,
            line: node.start_position().row + 1,
            bases: node
                .child_by_field_name("superclasses")
                .map(|args| self.bases(parsed, args))
                .unwrap_or_default(),
            docstring: body.and_then(|b| self.docstring(parsed, b)),
            body: body
                .map(|b| self.lower_children(parsed, b))
                .unwrap_or_default(),
        })
    }

    /// Positional-or-keyword parameter names.
    ///
    /// Positional-only parameters (before `/`) are dropped, and collection
    /// stops at `*`, `*args`, or `**kwargs`.
    fn parameters(&self, parsed: &ParsedFile, params: Node) -> Vec<String> {
        let mut names = Vec::new();

        for param in params.named_children(&mut params.walk()) {
            let name = match param.kind() {
                "identifier" => Some(param),
                "default_parameter" | "typed_default_parameter" => {
                    param.child_by_field_name("name")
                }
                "typed_parameter" => match param.named_child(0) {
                    Some(inner) if inner.kind() == "identifier" => Some(inner),
                    _ => break,
                },
                "positional_separator" => {
                    names.clear();
                    None
                }
                "keyword_separator" | "list_splat_pattern" | "dictionary_splat_pattern" => break,
                _ => None,
            };

            if let Some(node) = name {
                names.push(parsed.node_text(node).to_string());
            }
        }

        names
    }

    fn bases(&self, parsed: &ParsedFile, args: Node) -> Vec<String> {
        args.named_children(&mut args.walk())
            .filter(|arg| {
                !matches!(
                    arg.kind(),
                    "keyword_argument" | "list_splat" | "dictionary_splat" | "comment"
                )
            })
            .map(|arg| parsed.node_text(arg).to_string())
            .collect()
    }

    /// The docstring of a body: its first statement, if that is a plain string.
    fn docstring(&self, parsed: &ParsedFile, body: Node) -> Option<String> {
        let first = body
            .named_children(&mut body.walk())
            .find(|n| n.kind() != "comment")?;
        if first.kind() != "expression_statement" || first.named_child_count() != 1 {
            return None;
        }

        let expr = first.named_child(0)?;
        match expr.kind() {
            "string" => string_value(parsed.node_text(expr)).map(|s| clean_docstring(&s)),
            "concatenated_string" => {
                let mut joined = String::new();
                for part in expr.named_children(&mut expr.walk()) {
                    joined.push_str(&string_value(parsed.node_text(part))?);
                }
                Some(clean_docstring(&joined))
            }
            _ => None,
        }
    }
}

/// Kind label for a Python 2-only node, if `node` is one.
fn python2_construct(node: Node) -> Option<&'static str> {
    if node.kind() == "tuple_pattern"
        && node
            .parent()
            .is_some_and(|p| matches!(p.kind(), "parameters" | "lambda_parameters"))
    {
        return Some("Python 2 tuple parameter");
    }
    PYTHON2_KINDS
        .iter()
        .find(|(kind, _)| *kind == node.kind())
        .map(|(_, label)| *label)
}

/// Value of a plain string literal; `None` for f-strings and bytes.
///
/// Escape sequences are decoded unless the literal is raw.
fn string_value(literal: &str) -> Option<String> {
    let caps = STRING_OPEN.captures(literal)?;
    let prefix = caps.get(1).map_or("", |m| m.as_str()).to_lowercase();
    if prefix.contains('f') || prefix.contains('b') {
        return None;
    }

    let quote = caps.get(2)?.as_str();
    let start = caps.get(0)?.end();
    let end = literal.len().checked_sub(quote.len())?;
    if end < start || !literal.ends_with(quote) {
        return None;
    }
    let body = &literal[start..end];
    if prefix.contains('r') {
        Some(body.to_string())
    } else {
        Some(unescape(body))
    }
}

/// Decode the backslash escapes of a non-raw string literal.
///
/// Unrecognized or malformed escapes, and `\N{...}`, are kept as written.
fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(&next) = chars.peek() else {
            out.push(c);
            break;
        };

        let simple = match next {
            '\n' => Some(None),
            '\\' => Some(Some('\\')),
            '\'' => Some(Some('\'')),
            '"' => Some(Some('"')),
            'a' => Some(Some('\u{07}')),
            'b' => Some(Some('\u{08}')),
            'f' => Some(Some('\u{0c}')),
            'n' => Some(Some('\n')),
            'r' => Some(Some('\r')),
            't' => Some(Some('\t')),
            'v' => Some(Some('\u{0b}')),
            _ => None,
        };
        if let Some(decoded) = simple {
            chars.next();
            out.extend(decoded);
            continue;
        }

        let (radix, min, max) = match next {
            '0'..='7' => (8, 1, 3),
            'x' => (16, 2, 2),
            'u' => (16, 4, 4),
            'U' => (16, 8, 8),
            _ => {
                out.push(c);
                continue;
            }
        };
        if radix == 16 {
            chars.next();
        }

        let mut digits = String::new();
        while digits.len() < max {
            match chars.peek() {
                Some(d) if d.is_digit(radix) => {
                    digits.push(*d);
                    chars.next();
                }
                _ => break,
            }
        }

        match u32::from_str_radix(&digits, radix)
            .ok()
            .filter(|_| digits.len() >= min)
            .and_then(char::from_u32)
        {
            Some(decoded) => out.push(decoded),
            None => {
                out.push(c);
                if radix == 16 {
                    out.push(next);
                }
                out.push_str(&digits);
            }
        }
    }

    out
}

impl Default for PythonAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAnalyzer for PythonAnalyzer {
    fn language_id(&self) -> &'static str {
        "python"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["py"]
    }

    fn parse(&self, path: &str, source: &[u8]) -> Result<ParsedFile, ExtractError> {
        let mut parser = self.create_parser()?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ExtractError::Parser(format!("failed to parse Python source: {}", path)))?;

        Ok(ParsedFile {
            tree,
            source: source.to_vec(),
            path: path.to_string(),
        })
    }

    fn lower(&self, parsed: &ParsedFile) -> Vec<SyntaxNode> {
        self.lower_children(parsed, parsed.tree.root_node())
    }

    fn check_syntax(&self, parsed: &ParsedFile) -> Option<String> {
        if let Some(reason) = parsed.syntax_error() {
            return Some(reason);
        }
        let node = parsed.find_node(|n| python2_construct(n).is_some())?;
        Some(format!(
            "{} at line {}",
            python2_construct(node).unwrap_or("invalid syntax"),
            node.start_position().row + 1
        ))
    }
}
