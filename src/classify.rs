//! Keyword-based classification of definitions into domain categories.
//!
//! Each rule pairs a category with a set of lowercase keywords. A definition
//! belongs to a category when any keyword of that rule is a substring of its
//! lower-cased name. Matching is plain containment, not word matching, so
//! `riskless_average` is classified as risk logic through `risk`. Categories
//! are evaluated independently; a name may land in several.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analysis::{Definition, DefinitionKind};

/// Default keywords for [`Category::Strategy`].
pub const DEFAULT_STRATEGY_KEYWORDS: &[&str] =
    &["strategy", "trade", "signal", "backtest", "order", "position"];

/// Default keywords for [`Category::Indicator`].
pub const DEFAULT_INDICATOR_KEYWORDS: &[&str] = &[
    "indicator",
    "sma",
    "ema",
    "rsi",
    "macd",
    "bollinger",
    "moving_average",
];

/// Default keywords for [`Category::RiskLogic`].
pub const DEFAULT_RISK_KEYWORDS: &[&str] = &[
    "risk",
    "stop_loss",
    "take_profit",
    "position_size",
    "drawdown",
];

/// A classification label.
///
/// The three trading categories have fixed variants; any other name read
/// from configuration becomes [`Category::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Strategy,
    Indicator,
    RiskLogic,
    Custom(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Category::Strategy => "strategy",
            Category::Indicator => "indicator",
            Category::RiskLogic => "risk_logic",
            Category::Custom(name) => name,
        }
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "strategy" => Category::Strategy,
            "indicator" => Category::Indicator,
            "risk_logic" => Category::RiskLogic,
            _ => Category::Custom(s),
        }
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        c.as_str().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One row of the classification table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub category: Category,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl KeywordRule {
    pub fn new(category: Category, keywords: &[&str]) -> Self {
        Self {
            category,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// The default rule table: strategy, indicator, risk logic.
pub fn default_rules() -> Vec<KeywordRule> {
    vec![
        KeywordRule::new(Category::Strategy, DEFAULT_STRATEGY_KEYWORDS),
        KeywordRule::new(Category::Indicator, DEFAULT_INDICATOR_KEYWORDS),
        KeywordRule::new(Category::RiskLogic, DEFAULT_RISK_KEYWORDS),
    ]
}

/// A definition paired with a category it matched.
///
/// The definition is referenced by value through its file, line, and name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub file: String,
    pub line: usize,
    pub name: String,
    pub kind: DefinitionKind,
    pub category: Category,
}

/// Classifies definitions against a keyword rule table.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<KeywordRule>,
}

impl Classifier {
    /// Build a classifier. Keywords are lower-cased and empty ones dropped,
    /// since an empty keyword would match every name.
    pub fn new(rules: &[KeywordRule]) -> Self {
        let rules = rules
            .iter()
            .map(|rule| KeywordRule {
                category: rule.category.clone(),
                keywords: rule
                    .keywords
                    .iter()
                    .map(|k| k.to_lowercase())
                    .filter(|k| !k.is_empty())
                    .collect(),
            })
            .collect();
        Self { rules }
    }

    /// Categories whose keywords occur in `name`, in rule order, without repeats.
    pub fn classify(&self, name: &str) -> Vec<Category> {
        let lowered = name.to_lowercase();
        let mut categories: Vec<Category> = Vec::new();

        for rule in &self.rules {
            if categories.contains(&rule.category) {
                continue;
            }
            if rule.keywords.iter().any(|k| lowered.contains(k.as_str())) {
                categories.push(rule.category.clone());
            }
        }

        categories
    }

    /// Classify a definition and each of its members.
    pub fn classify_definition(&self, definition: &Definition) -> Vec<Classification> {
        definition
            .with_members()
            .flat_map(|d| {
                self.classify(&d.name)
                    .into_iter()
                    .map(move |category| Classification {
                        file: d.file.clone(),
                        line: d.line,
                        name: d.name.clone(),
                        kind: d.kind,
                        category,
                    })
            })
            .collect()
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&default_rules())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_classification() {
        let classifier = Classifier::default();

        assert_eq!(classifier.classify("compute_sma"), vec![Category::Indicator]);
        assert_eq!(
            classifier.classify("trading_strategy"),
            vec![Category::Strategy]
        );
        assert_eq!(
            classifier.classify("calculate_position_size"),
            vec![Category::Strategy, Category::RiskLogic],
            "position matches strategy, position_size matches risk"
        );
        assert!(classifier.classify("helper").is_empty());
    }

    #[test]
    fn test_substring_false_positives_are_kept() {
        let classifier = Classifier::default();
        assert_eq!(
            classifier.classify("riskless_average"),
            vec![Category::RiskLogic]
        );
        // "ema" inside "schema"
        assert_eq!(classifier.classify("load_schema"), vec![Category::Indicator]);
    }

    #[test]
    fn test_case_insensitive_name() {
        let classifier = Classifier::default();
        assert_eq!(
            classifier.classify("MomentumStrategy"),
            vec![Category::Strategy]
        );
        assert_eq!(classifier.classify("RSIFilter"), vec![Category::Indicator]);
    }

    #[test]
    fn test_custom_rules() {
        let rules = vec![
            KeywordRule::new(Category::from("Execution".to_string()), &["Fill", ""]),
            KeywordRule::new(Category::Strategy, &["alpha"]),
        ];
        let classifier = Classifier::new(&rules);

        assert_eq!(
            classifier.classify("on_fill_alpha"),
            vec![
                Category::Custom("Execution".to_string()),
                Category::Strategy
            ]
        );
        assert!(
            classifier.classify("anything").is_empty(),
            "empty keywords must not match everything"
        );
    }

    #[test]
    fn test_classify_definition_includes_members() {
        let member = Definition {
            name: "generate_signal".to_string(),
            kind: DefinitionKind::Callable,
            file: "a.py".to_string(),
            line: 2,
            parameters: vec!["self".to_string()],
            docstring: None,
            returns: None,
            bases: vec![],
            members: vec![],
        };
        let class = Definition {
            name: "MomentumStrategy".to_string(),
            kind: DefinitionKind::AggregateType,
            file: "a.py".to_string(),
            line: 1,
            parameters: vec![],
            docstring: None,
            returns: None,
            bases: vec![],
            members: vec![member],
        };

        let classifications = Classifier::default().classify_definition(&class);
        assert_eq!(classifications.len(), 2);
        assert_eq!(classifications[0].name, "MomentumStrategy");
        assert_eq!(classifications[0].kind, DefinitionKind::AggregateType);
        assert_eq!(classifications[1].name, "generate_signal");
        assert_eq!(classifications[1].line, 2);
    }

    #[test]
    fn test_category_serde() {
        let yaml = "category: risk_logic\nkeywords: [var]\n";
        let rule: KeywordRule = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(rule.category, Category::RiskLogic);
        assert_eq!(
            serde_json::to_string(&Category::Custom("hedging".to_string())).unwrap(),
            "\"hedging\""
        );
    }
}
