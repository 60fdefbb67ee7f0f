//! Aggregation runner that drives the whole pipeline over a repository.
//!
//! Files are processed in parallel using rayon. Each file yields an owned
//! [`FileAnalysis`]; results are merged back in discovery order so the
//! output does not depend on scheduling or worker count.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::analysis::{get_analyzer, Definition};
use crate::classify::{Classification, Classifier};
use crate::config::ScoutConfig;
use crate::detect::{Finding, Scanner};
use crate::error::{AnalysisError, ConfigError, ExtractError};
use crate::record::{ParseError, RepositoryAnalysis};
use crate::walk::{SourceFile, Walker};

/// Per-file contribution to a [`RepositoryAnalysis`].
#[derive(Debug, Default)]
pub struct FileAnalysis {
    /// Whether definitions were extracted successfully.
    pub scanned: bool,
    pub definitions: Vec<Definition>,
    pub classifications: Vec<Classification>,
    pub findings: Vec<Finding>,
    pub parse_error: Option<ParseError>,
}

/// Executes walk, extraction, classification and scanning.
pub struct Runner {
    walker: Walker,
    classifier: Classifier,
    scanner: Scanner,
    threads: Option<usize>,
    stop: Option<Arc<AtomicBool>>,
}

impl Runner {
    /// Build a runner, compiling every pattern and glob up front.
    pub fn from_config(config: &ScoutConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            walker: Walker::new(&config.walker)?,
            classifier: Classifier::new(&config.classifier.rules),
            scanner: Scanner::new(
                &config.security.active_secret_patterns(),
                &config.security.active_suspicious_patterns(),
            )?,
            threads: config.threads,
            stop: None,
        })
    }

    /// Stop starting new files once `flag` is set; the partial result is returned.
    pub fn with_stop_signal(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop = Some(flag);
        self
    }

    /// Analyze every source file under `root`.
    pub fn run(&self, root: &Path) -> Result<RepositoryAnalysis, AnalysisError> {
        let walk = self.walker.walk(root)?;

        let pool = self.threads.and_then(|n| {
            rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| warn!(threads = n, error = %e, "falling back to the global pool"))
                .ok()
        });

        let collect = || {
            let mut results: Vec<(usize, FileAnalysis)> = self
                .until_stopped(walk)
                .enumerate()
                .par_bridge()
                .filter_map(|(index, file)| {
                    if self.stopped() {
                        return None;
                    }
                    self.analyze_file(&file).map(|result| (index, result))
                })
                .collect();
            results.sort_by_key(|(index, _)| *index);
            results
        };

        let results = match &pool {
            Some(pool) => pool.install(collect),
            None => collect(),
        };

        let analysis = merge(results.into_iter().map(|(_, r)| r));
        if self.stopped() {
            info!("analysis stopped early");
        }
        info!(
            files_scanned = analysis.files_scanned,
            definitions = analysis.definitions.len(),
            classifications = analysis.classifications.len(),
            findings = analysis.findings.len(),
            parse_errors = analysis.parse_errors.len(),
            "analysis complete"
        );
        Ok(analysis)
    }

    /// Analyze one file. Returns None when the file cannot be read.
    pub fn analyze_file(&self, file: &SourceFile) -> Option<FileAnalysis> {
        let bytes = match std::fs::read(&file.absolute_path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(file = %file.path, error = %e, "skipping unreadable file");
                return None;
            }
        };
        let text = String::from_utf8_lossy(&bytes);

        let mut result = FileAnalysis {
            findings: self.scanner.scan(&text, &file.path),
            ..Default::default()
        };

        match extract(file, &text) {
            Ok(definitions) => {
                result.scanned = true;
                result.classifications = definitions
                    .iter()
                    .flat_map(|d| self.classifier.classify_definition(d))
                    .collect();
                result.definitions = definitions;
            }
            Err(ExtractError::UnsupportedLanguage(ext)) => {
                debug!(file = %file.path, extension = %ext, "no analyzer, scanning only");
            }
            Err(e) => {
                debug!(file = %file.path, error = %e, "extraction failed");
                result.parse_error = Some(ParseError {
                    file: file.path.clone(),
                    reason: e.to_string(),
                });
            }
        }

        Some(result)
    }

    /// Stop pulling from `items` once the stop flag is set.
    fn until_stopped<'a, I>(&'a self, mut items: I) -> impl Iterator<Item = I::Item> + 'a
    where
        I: Iterator + 'a,
    {
        std::iter::from_fn(move || if self.stopped() { None } else { items.next() })
    }

    fn stopped(&self) -> bool {
        self.stop
            .as_ref()
            .map(|flag| flag.load(Ordering::Relaxed))
            .unwrap_or(false)
    }
}

fn extract(file: &SourceFile, text: &str) -> Result<Vec<Definition>, ExtractError> {
    let ext = file.extension();
    let analyzer =
        get_analyzer(ext).ok_or_else(|| ExtractError::UnsupportedLanguage(ext.to_string()))?;
    analyzer.extract(&file.path, text.as_bytes())
}

/// Concatenate per-file results in order.
pub fn merge<I>(results: I) -> RepositoryAnalysis
where
    I: IntoIterator<Item = FileAnalysis>,
{
    let mut analysis = RepositoryAnalysis::default();
    for result in results {
        if result.scanned {
            analysis.files_scanned += 1;
        }
        analysis.definitions.extend(result.definitions);
        analysis.classifications.extend(result.classifications);
        analysis.findings.extend(result.findings);
        analysis.parse_errors.extend(result.parse_error);
    }
    analysis
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Category;
    use crate::detect::FindingKind;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_merge_preserves_order() {
        let first = FileAnalysis {
            scanned: true,
            parse_error: None,
            ..Default::default()
        };
        let second = FileAnalysis {
            scanned: false,
            parse_error: Some(ParseError {
                file: "b.py".to_string(),
                reason: "bad".to_string(),
            }),
            ..Default::default()
        };
        let analysis = merge(vec![first, second]);
        assert_eq!(analysis.files_scanned, 1);
        assert_eq!(analysis.parse_errors.len(), 1);
    }

    #[test]
    #[cfg(feature = "python")]
    fn test_run_small_repo() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "a.py",
            "class MomentumStrategy:\n    def run(self):\n        pass\n",
        );
        write(temp.path(), "b.py", "API_KEY = \"sk_live_abcdefghij0123456789\"\n");
        write(temp.path(), "c.py", "def broken(:\n");

        let runner = Runner::from_config(&ScoutConfig::default()).unwrap();
        let analysis = runner.run(temp.path()).unwrap();

        assert_eq!(analysis.files_scanned, 2);
        assert_eq!(analysis.definitions.len(), 1);
        assert_eq!(analysis.definitions[0].members.len(), 1);
        assert_eq!(
            analysis.classified_as(&Category::Strategy).count(),
            1,
            "MomentumStrategy is a strategy, run is not"
        );
        assert_eq!(analysis.findings_of(FindingKind::Secret).count(), 1);
        assert_eq!(analysis.parse_errors.len(), 1);
        assert_eq!(analysis.parse_errors[0].file, "c.py");
    }

    #[test]
    fn test_scanning_switches() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "a.py",
            "PASSWORD = \"SuperSecret123\"\nresult = eval(data)\n",
        );

        let mut config = ScoutConfig::default();
        config.security.scan_secrets = false;
        let analysis = Runner::from_config(&config).unwrap().run(temp.path()).unwrap();
        assert_eq!(analysis.findings.len(), 1);
        assert_eq!(analysis.findings[0].kind, FindingKind::Suspicious);
    }

    #[test]
    fn test_stop_signal_before_start() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.py", "def trade():\n    pass\n");

        let flag = Arc::new(AtomicBool::new(true));
        let runner = Runner::from_config(&ScoutConfig::default())
            .unwrap()
            .with_stop_signal(flag);
        let analysis = runner.run(temp.path()).unwrap();
        assert_eq!(analysis, RepositoryAnalysis::default());
    }

    #[test]
    fn test_walk_not_pulled_after_stop() {
        let flag = Arc::new(AtomicBool::new(false));
        let runner = Runner::from_config(&ScoutConfig::default())
            .unwrap()
            .with_stop_signal(flag.clone());

        let mut files = 0..10;
        let seen: Vec<_> = runner
            .until_stopped(files.by_ref().inspect(|i| {
                if *i == 2 {
                    flag.store(true, Ordering::Relaxed);
                }
            }))
            .collect();
        assert_eq!(seen, vec![0, 1, 2]);
        assert_eq!(files.next(), Some(3), "remaining entries are left untouched");
    }

    #[test]
    fn test_unsupported_extension_is_scanned_only() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "deploy.sh", "eval(\"$CMD\")\n");

        let mut config = ScoutConfig::default();
        config.walker.extensions = vec!["sh".to_string()];
        let analysis = Runner::from_config(&config).unwrap().run(temp.path()).unwrap();

        assert_eq!(analysis.files_scanned, 0);
        assert!(analysis.parse_errors.is_empty());
        assert_eq!(analysis.findings.len(), 1);
        assert_eq!(analysis.findings[0].file, "deploy.sh");
    }

    #[test]
    fn test_thread_count_does_not_change_result() {
        let temp = TempDir::new().unwrap();
        for i in 0..12 {
            write(
                temp.path(),
                &format!("pkg{}/mod_{}.py", i % 3, i),
                &format!("def compute_sma_{}(prices):\n    return eval(prices)\n", i),
            );
        }

        let mut config = ScoutConfig::default();
        config.threads = Some(1);
        let single = Runner::from_config(&config).unwrap().run(temp.path()).unwrap();
        config.threads = Some(4);
        let multi = Runner::from_config(&config).unwrap().run(temp.path()).unwrap();
        assert_eq!(single, multi);
    }
}
