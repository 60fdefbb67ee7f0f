//! Pattern-based detection of secrets and suspicious code.

mod patterns;
mod types;

pub use patterns::{
    LineIndex, PatternSet, PatternSpec, Scanner, DEFAULT_SECRET_PATTERNS,
    DEFAULT_SUSPICIOUS_PATTERNS,
};
pub use types::{Finding, FindingKind};
