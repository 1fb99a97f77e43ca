//! tlint: Testing Library lint CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tlint::analyzer::{all_rules, Linter};
use tlint::config::{
    build_ignore_set, is_ignored, load_config, starter_config, Config, Preset, CONFIG_FILENAME,
};
use tlint::fixer::write_fixed;
use tlint::reporter::{ConsoleReporter, JsonReporter, SarifReporter, Summary};
use tlint::LintResult;
use walkdir::WalkDir;

/// tlint: Testing Library lint rules for TypeScript and JavaScript tests
#[derive(Parser, Debug)]
#[command(name = "tlint")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Test file or directory to lint (omit when using a subcommand)
    path: Option<PathBuf>,

    /// Output format as JSON
    #[arg(long, short, conflicts_with = "sarif")]
    json: bool,

    /// Output in SARIF format (for GitHub Code Scanning)
    #[arg(long)]
    sarif: bool,

    /// Apply auto-fixes and write the files back
    #[arg(long)]
    fix: bool,

    /// Path to config file (default: search .tlintrc.json in the target dir and parents)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Only report errors
    #[arg(long, short)]
    quiet: bool,

    /// Exit 1 when more than N warnings are reported
    #[arg(long, value_name = "N")]
    max_warnings: Option<usize>,

    /// Number of parallel threads (default: number of CPU cores)
    #[arg(long, value_name = "N")]
    jobs: Option<usize>,

    /// Debug logging (same as RUST_LOG=debug)
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create .tlintrc.json for a preset
    Init {
        /// Testing Library flavour the project uses
        #[arg(long, value_enum, default_value_t = Preset::React)]
        preset: Preset,

        /// Directory in which to create config (default: current)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// List every rule
    Rules {
        /// Show which rules this preset enables
        #[arg(long, value_enum, default_value_t = Preset::React)]
        preset: Preset,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn run() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Some(cmd) = args.command {
        return match cmd {
            Commands::Init { preset, dir } => run_init(preset, dir.as_deref()),
            Commands::Rules { preset } => run_rules(preset),
        };
    }

    let Some(path) = args.path.clone() else {
        anyhow::bail!("a path to lint is required");
    };

    // Resolve work directory for config search
    let work_dir = if path.is_file() {
        path.parent().unwrap_or(Path::new("."))
    } else {
        path.as_path()
    };

    let config = load_config(work_dir, args.config.as_deref())?;

    let ignore_set = if config.ignore.is_empty() {
        None
    } else {
        Some(build_ignore_set(&config.ignore)?)
    };

    let test_patterns = config.get_test_patterns();
    let test_files = collect_test_files(&path, ignore_set.as_ref(), &test_patterns)?;

    if test_files.is_empty() {
        eprintln!("{}: No test files found", "Warning".yellow());
        return Ok(ExitCode::SUCCESS);
    }
    debug!("linting {} files", test_files.len());

    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .context("Failed to configure worker threads")?;
    }

    let (results, had_errors) = lint_files_parallel(&test_files, &config, args.fix);

    if args.sarif {
        println!("{}", SarifReporter::new().report(&results));
    } else if args.json {
        println!("{}", JsonReporter::new().pretty().report(&results));
    } else {
        let mut reporter = ConsoleReporter::new();
        if args.quiet {
            reporter = reporter.quiet();
        }
        reporter.report(&results);
    }

    let summary = Summary::from_results(&results);
    if had_errors {
        return Ok(ExitCode::from(2));
    }
    if summary.error_count > 0 {
        return Ok(ExitCode::from(1));
    }
    if let Some(max_warnings) = args.max_warnings {
        if summary.warning_count > max_warnings {
            if !args.json && !args.sarif {
                eprintln!(
                    "\n{}: {} warnings exceed the limit of {}",
                    "Failed".red().bold(),
                    summary.warning_count,
                    max_warnings
                );
            }
            return Ok(ExitCode::from(1));
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn run_init(preset: Preset, dir: Option<&Path>) -> Result<ExitCode> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let dir = dir.unwrap_or(&cwd);
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() {
        eprintln!(
            "{}: {} already exists; use --dir to write elsewhere or remove it first",
            "Warning".yellow(),
            config_path.display()
        );
        return Ok(ExitCode::SUCCESS);
    }

    std::fs::write(&config_path, starter_config(preset))
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    println!(
        "{}: Created {} with preset={}",
        "Done".green().bold(),
        config_path.display(),
        preset
    );
    Ok(ExitCode::SUCCESS)
}

fn run_rules(preset: Preset) -> Result<ExitCode> {
    let width = all_rules()
        .iter()
        .map(|rule| rule.meta().name.len())
        .max()
        .unwrap_or(0);
    for rule in all_rules() {
        let meta = rule.meta();
        let enabled = match meta.recommendation.severity_for(preset) {
            Some(severity) => format!("{:<7}", severity.to_string()).green(),
            None => format!("{:<7}", "off").dimmed(),
        };
        let fixable = if meta.fixable { "fix" } else { "   " };
        println!(
            "{:<width$}  {}  {}  {}",
            meta.name,
            enabled,
            fixable.cyan(),
            meta.description,
            width = width
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn collect_test_files(
    path: &Path,
    ignore_set: Option<&globset::GlobSet>,
    test_patterns: &[&str],
) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        if let Some(set) = ignore_set {
            if is_ignored(path, set) {
                return Ok(vec![]);
            }
        }
        return Ok(vec![path.to_path_buf()]);
    }

    if !path.is_dir() {
        anyhow::bail!("Path does not exist: {}", path.display());
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(path)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let file_path = entry.path();
        if is_test_file(file_path, test_patterns) {
            if let Some(set) = ignore_set {
                if is_ignored(file_path, set) {
                    continue;
                }
            }
            files.push(file_path.to_path_buf());
        }
    }

    // Sort for consistent output
    files.sort();

    Ok(files)
}

fn is_test_file(path: &Path, test_patterns: &[&str]) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };

    if path
        .components()
        .any(|c| c.as_os_str() == "node_modules")
    {
        return false;
    }

    test_patterns.iter().any(|p| name.ends_with(p))
}

/// Lint (or fix) one file with the rules its config path selects
fn lint_one(file: &Path, config: &Config, fix: bool) -> Result<LintResult> {
    let linter = Linter::for_file(config, file)?;
    if !fix {
        return Ok(linter.lint_file(file)?);
    }
    let fixed = linter.fix_file(file)?;
    write_fixed(file, &fixed)
        .with_context(|| format!("Failed to write fixes to {}", file.display()))?;
    if fixed.changed() {
        debug!("applied {} fixes to {}", fixed.fixes_applied, file.display());
    }
    Ok(LintResult {
        file_path: file.to_path_buf(),
        diagnostics: fixed.diagnostics,
    })
}

/// Lint files in parallel; results keep the input order
fn lint_files_parallel(files: &[PathBuf], config: &Config, fix: bool) -> (Vec<LintResult>, bool) {
    use rayon::prelude::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    let had_errors = AtomicBool::new(false);

    let results: Vec<_> = files
        .par_iter()
        .filter_map(|file| match lint_one(file, config, fix) {
            Ok(result) => Some(result),
            Err(e) => {
                had_errors.store(true, Ordering::Relaxed);
                warn!("skipping {}: {:#}", file.display(), e);
                eprintln!(
                    "{}: Failed to lint {}: {:#}",
                    "Error".red(),
                    file.display(),
                    e
                );
                None
            }
        })
        .collect();

    (results, had_errors.load(Ordering::Relaxed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parses_subcommands_and_lint_flags() {
        let args = Args::try_parse_from(["tlint", "rules", "--preset", "vue"]).unwrap();
        assert!(matches!(args.command, Some(Commands::Rules { preset: Preset::Vue })));

        let args = Args::try_parse_from(["tlint", "src", "--json", "--max-warnings", "3"]).unwrap();
        assert_eq!(args.path, Some(PathBuf::from("src")));
        assert!(args.json);
        assert_eq!(args.max_warnings, Some(3));

        let args = Args::try_parse_from(["tlint"]).unwrap();
        assert!(args.path.is_none() && args.command.is_none());
    }

    #[test]
    fn test_is_test_file() {
        let default_patterns = Config::default();
        let default_patterns = default_patterns.get_test_patterns();
        assert!(is_test_file(Path::new("foo.test.ts"), &default_patterns));
        assert!(is_test_file(Path::new("bar.spec.tsx"), &default_patterns));
        assert!(!is_test_file(Path::new("util.ts"), &default_patterns));
        assert!(!is_test_file(Path::new("node_modules/foo.test.ts"), &default_patterns));
    }

    #[test]
    fn test_is_test_file_custom_patterns() {
        let custom_patterns = [".integration.tsx", "_test.ts"];
        assert!(is_test_file(Path::new("auth.integration.tsx"), &custom_patterns));
        assert!(is_test_file(Path::new("user_test.ts"), &custom_patterns));
        assert!(!is_test_file(Path::new("foo.test.ts"), &custom_patterns));
    }
}
