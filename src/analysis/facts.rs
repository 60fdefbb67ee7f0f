//! Fact structures extracted from AST analysis.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionKind {
    /// A function or method.
    Callable,
    /// A class or other aggregate type.
    AggregateType,
}

impl DefinitionKind {
    /// Convert to a string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DefinitionKind::Callable => "callable",
            DefinitionKind::AggregateType => "aggregate_type",
        }
    }

    /// Check if this is a callable.
    pub fn is_callable(&self) -> bool {
        matches!(self, DefinitionKind::Callable)
    }
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named definition extracted from source code.
///
/// `bases` and `members` are only populated for aggregate types. Members are
/// the callables declared directly in the type's body, one level deep; they
/// never appear again in the flat definition list of the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub name: String,
    pub kind: DefinitionKind,
    /// Repo-relative path of the defining file.
    pub file: String,
    /// Line number (1-indexed).
    pub line: usize,
    pub parameters: Vec<String>,
    pub docstring: Option<String>,
    /// Return annotation as source text, for callables that declare one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bases: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<Definition>,
}

impl Definition {
    /// The `(file, line, name)` key that identifies a definition within one analysis.
    pub fn key(&self) -> (&str, usize, &str) {
        (&self.file, self.line, &self.name)
    }

    /// Iterate over this definition followed by its members.
    pub fn with_members(&self) -> impl Iterator<Item = &Definition> {
        std::iter::once(self).chain(self.members.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn callable(name: &str, line: usize) -> Definition {
        Definition {
            name: name.to_string(),
            kind: DefinitionKind::Callable,
            file: "bot.py".to_string(),
            line,
            parameters: vec!["self".to_string()],
            docstring: None,
            returns: None,
            bases: vec![],
            members: vec![],
        }
    }

    #[test]
    fn test_with_members() {
        let class = Definition {
            name: "Bot".to_string(),
            kind: DefinitionKind::AggregateType,
            file: "bot.py".to_string(),
            line: 1,
            parameters: vec![],
            docstring: None,
            returns: None,
            bases: vec!["Base".to_string()],
            members: vec![callable("run", 2), callable("stop", 4)],
        };

        let names: Vec<_> = class.with_members().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Bot", "run", "stop"]);
        assert_eq!(class.key(), ("bot.py", 1, "Bot"));
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&DefinitionKind::AggregateType).unwrap();
        assert_eq!(json, "\"aggregate_type\"");
        assert!(DefinitionKind::Callable.is_callable());
    }
}
