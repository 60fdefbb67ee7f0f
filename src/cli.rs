//! Command-line interface for repo-scout.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::{ScoutConfig, CONFIG_FILE_NAMES};
use crate::report;
use crate::runner::Runner;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Static analysis of a source repository.
///
/// Extracts functions and classes, classifies them by keyword into
/// strategy, indicator and risk-logic categories, and scans the source
/// text for hardcoded secrets and suspicious code patterns.
#[derive(Parser)]
#[command(name = "repo-scout")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log debug output to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a repository directory
    #[command(visible_alias = "scan")]
    Analyze(AnalyzeArgs),
    /// Write the default configuration to a file
    Init(InitArgs),
}

/// Arguments for the analyze command.
#[derive(Parser)]
pub struct AnalyzeArgs {
    /// Repository root to analyze
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover in PATH)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Number of worker threads (overrides the config file)
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Exit with status 1 when any secret is found
    #[arg(long)]
    pub fail_on_secrets: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "repo-scout.yaml")]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Load the configuration named on the command line, or discover one.
fn load_config(args: &AnalyzeArgs) -> anyhow::Result<(ScoutConfig, Option<PathBuf>)> {
    match &args.config {
        Some(path) => Ok((ScoutConfig::load(path)?, Some(path.clone()))),
        None => ScoutConfig::discover(&args.path),
    }
}

/// Run the analyze command.
pub fn run_analyze(args: &AnalyzeArgs) -> anyhow::Result<i32> {
    // Validate format
    if args.format != "pretty" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let (mut config, config_path) = match load_config(args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error parsing config: {}", e);
            return Ok(EXIT_ERROR);
        }
    };
    if args.threads.is_some() {
        config.threads = args.threads;
    }

    let runner = match Runner::from_config(&config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: invalid config: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let analysis = match runner.run(&args.path) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let path_str = args.path.to_string_lossy().to_string();
    let config_str = config_path.map(|p| p.to_string_lossy().to_string());

    match args.format.as_str() {
        "json" => report::write_json(&path_str, config_str.as_deref(), &analysis)?,
        _ => report::write_pretty(&path_str, config_str.as_deref(), &analysis),
    }

    if args.fail_on_secrets && analysis.has_secrets() {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() && !args.force {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Use --force to overwrite it");
        return Ok(EXIT_ERROR);
    }

    // Create output directory if needed
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    let yaml = ScoutConfig::default().to_yaml()?;
    if let Err(e) = std::fs::write(&args.output, yaml) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to customize for your project", args.output.display());
    println!(
        "  2. Run: repo-scout analyze . (auto-discovers {})",
        CONFIG_FILE_NAMES.join(", ")
    );

    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn analyze_args(path: &Path) -> AnalyzeArgs {
        AnalyzeArgs {
            path: path.to_path_buf(),
            config: None,
            format: "json".to_string(),
            threads: None,
            fail_on_secrets: true,
        }
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "repo-scout",
            "analyze",
            "/tmp/repo",
            "--format",
            "json",
            "--threads",
            "2",
            "--fail-on-secrets",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Analyze(args) => {
                assert_eq!(args.path, PathBuf::from("/tmp/repo"));
                assert_eq!(args.threads, Some(2));
                assert!(args.fail_on_secrets);
            }
            Commands::Init(_) => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_analyze_exit_codes() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("clean.py"), "def helper():\n    pass\n").unwrap();
        assert_eq!(run_analyze(&analyze_args(temp.path())).unwrap(), EXIT_SUCCESS);

        std::fs::write(
            temp.path().join("keys.py"),
            "PASSWORD = \"SuperSecret123\"\n",
        )
        .unwrap();
        assert_eq!(run_analyze(&analyze_args(temp.path())).unwrap(), EXIT_FAILED);

        let mut args = analyze_args(&temp.path().join("missing"));
        args.fail_on_secrets = false;
        assert_eq!(run_analyze(&args).unwrap(), EXIT_ERROR);

        let mut args = analyze_args(temp.path());
        args.format = "xml".to_string();
        assert_eq!(run_analyze(&args).unwrap(), EXIT_ERROR);
    }

    #[test]
    fn test_init_writes_default_config() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("conf/repo-scout.yaml");
        let args = InitArgs {
            output: output.clone(),
            force: false,
        };

        assert_eq!(run_init(&args).unwrap(), EXIT_SUCCESS);
        assert_eq!(ScoutConfig::load(&output).unwrap(), ScoutConfig::default());

        assert_eq!(run_init(&args).unwrap(), EXIT_ERROR, "refuses to overwrite");
        let forced = InitArgs {
            output,
            force: true,
        };
        assert_eq!(run_init(&forced).unwrap(), EXIT_SUCCESS);
    }
}
