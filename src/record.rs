//! The aggregated result of analyzing one repository.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::{Definition, DefinitionKind};
use crate::classify::{Category, Classification};
use crate::detect::{Finding, FindingKind};

/// A file whose definitions could not be extracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseError {
    pub file: String,
    pub reason: String,
}

/// Everything learned from one walk of a repository.
///
/// Definitions, classifications, and findings are ordered by file discovery
/// order, then by position within the file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RepositoryAnalysis {
    /// Files whose definitions were extracted successfully.
    pub files_scanned: usize,
    pub definitions: Vec<Definition>,
    pub classifications: Vec<Classification>,
    pub findings: Vec<Finding>,
    pub parse_errors: Vec<ParseError>,
}

impl RepositoryAnalysis {
    /// Classifications carrying `category`.
    pub fn classified_as<'a>(
        &'a self,
        category: &'a Category,
    ) -> impl Iterator<Item = &'a Classification> + 'a {
        self.classifications
            .iter()
            .filter(move |c| &c.category == category)
    }

    /// Findings of one kind.
    pub fn findings_of(&self, kind: FindingKind) -> impl Iterator<Item = &Finding> + '_ {
        self.findings.iter().filter(move |f| f.kind == kind)
    }

    /// Whether any secret finding was recorded.
    pub fn has_secrets(&self) -> bool {
        self.findings_of(FindingKind::Secret).next().is_some()
    }

    pub fn summary(&self) -> Summary {
        let mut callables = 0;
        let mut aggregate_types = 0;
        for def in self.definitions.iter().flat_map(|d| d.with_members()) {
            match def.kind {
                DefinitionKind::Callable => callables += 1,
                DefinitionKind::AggregateType => aggregate_types += 1,
            }
        }

        let mut categories = BTreeMap::new();
        for c in &self.classifications {
            *categories.entry(c.category.as_str().to_string()).or_insert(0) += 1;
        }

        Summary {
            files_scanned: self.files_scanned,
            callables,
            aggregate_types,
            categories,
            secrets: self.findings_of(FindingKind::Secret).count(),
            suspicious: self.findings_of(FindingKind::Suspicious).count(),
            parse_errors: self.parse_errors.len(),
        }
    }
}

/// Headline counts for an analysis.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Summary {
    pub files_scanned: usize,
    /// Callables, class members included.
    pub callables: usize,
    pub aggregate_types: usize,
    /// Classification count per category name.
    pub categories: BTreeMap<String, usize>,
    pub secrets: usize,
    pub suspicious: usize,
    pub parse_errors: usize,
}
