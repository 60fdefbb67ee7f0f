//! Language-specific analyzer implementations.

#[cfg(feature = "javascript")]
mod javascript;
#[cfg(feature = "python")]
mod python;

#[cfg(feature = "javascript")]
pub use javascript::JavaScriptAnalyzer;
#[cfg(feature = "python")]
pub use python::PythonAnalyzer;

use super::LanguageAnalyzer;
#[cfg(any(feature = "python", feature = "javascript"))]
use once_cell::sync::OnceCell;

/// Static storage for JavaScript analyzer.
#[cfg(feature = "javascript")]
static JAVASCRIPT_ANALYZER: OnceCell<JavaScriptAnalyzer> = OnceCell::new();

/// Static storage for Python analyzer.
#[cfg(feature = "python")]
static PYTHON_ANALYZER: OnceCell<PythonAnalyzer> = OnceCell::new();

/// Get an analyzer for the given file extension (without dot).
///
/// Returns None if no analyzer is compiled in for the extension.
pub fn get_analyzer(ext: &str) -> Option<&'static dyn LanguageAnalyzer> {
    match ext {
        #[cfg(feature = "javascript")]
        "js" | "jsx" | "mjs" | "cjs" => Some(
            JAVASCRIPT_ANALYZER.get_or_init(JavaScriptAnalyzer::new) as &'static dyn LanguageAnalyzer,
        ),
        #[cfg(feature = "python")]
        "py" => Some(PYTHON_ANALYZER.get_or_init(PythonAnalyzer::new) as &'static dyn LanguageAnalyzer),
        _ => None,
    }
}

/// Get all registered language IDs.
pub fn registered_languages() -> Vec<&'static str> {
    let mut languages = Vec::new();
    #[cfg(feature = "javascript")]
    languages.push("javascript");
    #[cfg(feature = "python")]
    languages.push("python");
    languages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(feature = "python")]
    fn test_python_lookup() {
        let analyzer = get_analyzer("py").expect("python analyzer should be registered");
        assert_eq!(analyzer.language_id(), "python");
        assert!(analyzer.handles_extension("py"));
    }

    #[test]
    fn test_unknown_extension() {
        assert!(get_analyzer("txt").is_none());
        assert!(get_analyzer("").is_none());
    }
}
