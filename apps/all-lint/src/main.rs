//! all_lint CLI binary entry point.
//! Loads the config, runs the linters and maps the outcome to an exit code.

use all_lint::cli::{Cli, Commands, USAGE};
use all_lint::config;
use all_lint::error::Error;
use all_lint::output::{OutputMode, Reporter};
use all_lint::resolve::{IgnoreRules, TargetResolver};
use all_lint::runner::Runner;
use all_lint::settings::Settings;
use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                eprintln!("{}", USAGE);
                std::process::exit(2);
            }
        },
    };
    let settings = Settings::from_env(cli.cmd.overrides());
    init_logging(settings.verbose);

    let code = match cli.cmd {
        Commands::Run {
            files,
            config,
            output,
            ..
        } => run(&files, config, output, settings),
    };
    std::process::exit(code);
}

/// Execute `all_lint run` and return the process exit code.
fn run(files: &[String], config_path: Option<String>, output: OutputMode, settings: Settings) -> i32 {
    let root = match std::env::current_dir() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Cannot determine working directory: {}", e);
            return 2;
        }
    };
    let cfg_path = PathBuf::from(config_path.as_deref().unwrap_or(config::DEFAULT_PATH));
    let cfg = match config::load(&cfg_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{}", e);
            return 2;
        }
    };

    let ignore = if cfg.options.respect_gitignore {
        Some(IgnoreRules::discover(&root))
    } else {
        None
    };
    let resolver = TargetResolver::new(root, files)
        .with_ignore(ignore)
        .with_fallback(cfg.options.fallback_to_glob);
    let reporter = Reporter::new(settings, output);

    match Runner::new(&cfg, resolver, reporter).run() {
        Ok(report) if report.success() => 0,
        Ok(_) => 1,
        Err(Error::Config(e)) => {
            eprintln!("{}", e);
            2
        }
        Err(e) => {
            eprintln!("{}", e);
            1
        }
    }
}

/// Initialize tracing on stderr. `ALL_LINT_LOG` overrides the level.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = if verbose { "all_lint=debug,warn" } else { "warn" };
    let filter = EnvFilter::try_from_env("ALL_LINT_LOG").unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    tracing::debug!("logging initialized at level: {}", level);
}
