//! Command-line interface for patchlens.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use crate::aggregate::Issue;
use crate::config::{self, EngineConfig, DEFAULT_CONFIG_NAMES};
use crate::diff;
use crate::engine::{Engine, SourceFile};
use crate::grammar::{GrammarRegistry, GrammarStatus, Language};
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Multi-language static analysis for code review.
///
/// Patchlens computes complexity metrics and structural context (function
/// signatures, class hierarchies, dependencies) for source files, and maps
/// source lines to unified-diff coordinates for review comments.
#[derive(Parser)]
#[command(name = "patchlens")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a source file or directory
    Analyze(AnalyzeArgs),
    /// Find the diff position of a source line
    Locate(LocateArgs),
    /// List supported languages and grammar status
    Languages(LanguagesArgs),
}

/// Arguments for the analyze command.
#[derive(Parser)]
pub struct AnalyzeArgs {
    /// Path to analyze (file or directory)
    pub path: PathBuf,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// JSON file with a list of linter issues to attach (single file only)
    #[arg(short, long)]
    pub issues: Option<PathBuf>,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Leave the syntax tree out of pretty output
    #[arg(long)]
    pub no_ast: bool,
}

/// Arguments for the locate command.
#[derive(Parser)]
pub struct LocateArgs {
    /// Unified diff of one file
    #[arg(short, long)]
    pub diff: PathBuf,

    /// Exact text of the source line, without the diff marker
    #[arg(short, long)]
    pub line: String,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "json")]
    pub format: String,

    /// Exit non-zero instead of printing the default coordinate on no match
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the languages command.
#[derive(Parser)]
pub struct LanguagesArgs {
    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the level.
pub fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    // A second init (tests) is harmless.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn check_format(format: &str) -> bool {
    if format != "pretty" && format != "json" {
        eprintln!("Error: invalid format {:?}, must be 'pretty' or 'json'", format);
        return false;
    }
    true
}

/// Load the config from `explicit`, or discover it in the working directory.
fn load_config(explicit: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => EngineConfig::discover(Path::new(".")),
    };

    let config = match path {
        Some(p) => {
            info!(path = %p.display(), "loading config");
            EngineConfig::parse_file(&p)
                .map_err(|e| anyhow::anyhow!("error parsing config {}: {}", p.display(), e))?
        }
        None => {
            debug!(
                "no config file found (looked for {}), using defaults",
                DEFAULT_CONFIG_NAMES.join(", ")
            );
            EngineConfig::default()
        }
    };

    config::validate(&config).map_err(|e| anyhow::anyhow!("invalid config: {}", e))?;
    Ok(config)
}

/// Collect analyzable files under `root`.
fn collect_files(root: &Path, registry: &GrammarRegistry, config: &EngineConfig) -> anyhow::Result<Vec<PathBuf>> {
    let supported = registry.supported_extensions();
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            // Skip hidden directories, vendored code and dependencies
            if e.depth() > 0 && e.file_type().is_dir() {
                return !(name.starts_with('.') || name == "vendor" || name == "node_modules");
            }
            true
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_ascii_lowercase()))
            .unwrap_or_default();
        if !supported.contains(&ext.as_str()) {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        if config.is_path_excluded(relative) {
            debug!(path = %relative.display(), "excluded by config");
            continue;
        }

        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

fn read_issues(path: &Path) -> anyhow::Result<Vec<Issue>> {
    let content = fs::read_to_string(path)?;
    let issues: Vec<Issue> = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("invalid issues file {}: {}", path.display(), e))?;
    Ok(issues)
}

/// Read each path into a `SourceFile`. In a batch, unreadable files are
/// skipped with a warning; a single file that cannot be read is an error.
/// `issues` are attached only to a single file.
fn load_sources(paths: Vec<PathBuf>, batch: bool, issues: Vec<Issue>) -> anyhow::Result<Vec<SourceFile>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        match fs::read_to_string(&path) {
            Ok(source) => files.push(SourceFile::new(path, source)),
            Err(e) if batch => {
                warn!(path = %path.display(), error = %e, "skipping unreadable file");
            }
            Err(e) => anyhow::bail!("cannot read {}: {}", path.display(), e),
        }
    }

    if !batch {
        if let Some(single) = files.first_mut() {
            single.issues = issues;
        }
    }
    Ok(files)
}

/// Run the analyze command.
pub fn run_analyze(args: &AnalyzeArgs) -> anyhow::Result<i32> {
    if !check_format(&args.format) {
        return Ok(EXIT_ERROR);
    }

    let config = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let metadata = match fs::metadata(&args.path) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", args.path, e);
            return Ok(EXIT_ERROR);
        }
    };
    let batch = metadata.is_dir();

    if batch && args.issues.is_some() {
        eprintln!("Error: --issues can only be used when analyzing a single file");
        return Ok(EXIT_ERROR);
    }

    let engine = Engine::from_config(config);

    let paths = if batch {
        collect_files(&args.path, engine.registry(), engine.config())?
    } else {
        vec![args.path.clone()]
    };

    if paths.is_empty() {
        eprintln!("Warning: no files to analyze");
        return Ok(EXIT_SUCCESS);
    }

    let issues = match &args.issues {
        Some(p) => read_issues(p)?,
        None => Vec::new(),
    };

    let files = match load_sources(paths, batch, issues) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    info!(files = files.len(), "analyzing");
    let analyses = engine.analyze_batch(&files);

    let path_str = args.path.to_string_lossy().to_string();
    match args.format.as_str() {
        "json" => report::write_json(&analyses, batch)?,
        _ => report::write_pretty(&path_str, &analyses, !args.no_ast),
    }

    Ok(EXIT_SUCCESS)
}

/// Run the locate command.
pub fn run_locate(args: &LocateArgs) -> anyhow::Result<i32> {
    if !check_format(&args.format) {
        return Ok(EXIT_ERROR);
    }

    let diff_text = match fs::read_to_string(&args.diff) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: cannot read diff {:?}: {}", args.diff, e);
            return Ok(EXIT_ERROR);
        }
    };

    let found = diff::find(&diff_text, &args.line);
    if found.is_none() && args.strict {
        match args.format.as_str() {
            "json" => eprintln!("Error: {}", crate::error::AnalysisError::NoDiffMatch(args.line.clone())),
            _ => report::write_coordinate_pretty(&args.line, None),
        }
        return Ok(EXIT_FAILED);
    }

    let coordinate = found.unwrap_or_else(|| diff::locate(&diff_text, &args.line));
    match args.format.as_str() {
        "json" => report::write_value(&coordinate)?,
        _ => report::write_coordinate_pretty(&args.line, Some(&coordinate)),
    }

    Ok(EXIT_SUCCESS)
}

/// Run the languages command.
pub fn run_languages(args: &LanguagesArgs) -> anyhow::Result<i32> {
    let config = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };
    let registry = GrammarRegistry::load(&config);

    println!("Supported languages:");
    println!();
    for language in Language::ALL {
        let status = match registry.status(language) {
            GrammarStatus::Ready => "ready".to_string(),
            GrammarStatus::Disabled => "disabled".to_string(),
            GrammarStatus::Failed(reason) => format!("failed: {}", reason),
        };
        println!("  {:<8} {:<12} {}", language.extension(), language.id(), status);
    }

    Ok(EXIT_SUCCESS)
}
