//! CLI argument parsing via `clap`.

use crate::output::OutputMode;
use crate::settings::Overrides;
use clap::{Parser, Subcommand};

/// One-line usage printed for unknown or missing subcommands.
pub const USAGE: &str = "Usage: all_lint run [<file>...]";

#[derive(Parser, Debug)]
#[command(
    name = "all_lint",
    version,
    disable_help_subcommand = true,
    about = "Run every configured linter against the files it applies to",
    long_about = "all_lint reads .all_lint.yml, resolves the files each linter's globs match, substitutes them into the linter's command and runs the linters one after another.\n\nExit codes: 0 = all executed linters passed, 1 = a linter failed or file resolution hit a fatal error (printed on stderr), 2 = usage or config error.",
    after_help = "Examples:\n  all_lint run\n  all_lint run app/models/user.rb lib/tasks/db.rake\n  all_lint run --config ci/all_lint.toml --output json"
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run all configured linters
    #[command(
        about = "Run linters",
        long_about = "Run every linter in declaration order. When files are given, each linter only receives the given files that also match its globs.",
        after_help = "Examples:\n  all_lint run\n  all_lint run a.rb b.rb\n  ALL_LINT_VERBOSE=1 all_lint run"
    )]
    Run {
        /// Restrict targets to these files
        files: Vec<String>,
        #[arg(long, help = "Config file path (default: .all_lint.yml)")]
        config: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputMode::Human, help = "Output mode")]
        output: OutputMode,
        #[arg(short, long, action = clap::ArgAction::SetTrue, help = "Report skipped linters and target counts")]
        verbose: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "List each target file (with --verbose)")]
        list_files: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Disable colored output")]
        no_color: bool,
    },
}

impl Commands {
    /// Flag overrides for `Settings` resolution.
    pub fn overrides(&self) -> Overrides {
        match self {
            Commands::Run {
                verbose,
                list_files,
                no_color,
                ..
            } => Overrides {
                verbose: *verbose,
                list_files: *list_files,
                no_color: *no_color,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    #[test]
    fn test_run_with_files_and_flags() {
        let cli = Cli::try_parse_from([
            "all_lint", "run", "a.rb", "b.rb", "--config", "x.yml", "-v", "--output", "json",
        ])
        .unwrap();
        let Commands::Run {
            files,
            config,
            output,
            ..
        } = &cli.cmd;
        assert_eq!(files, &vec!["a.rb".to_string(), "b.rb".to_string()]);
        assert_eq!(config.as_deref(), Some("x.yml"));
        assert_eq!(*output, OutputMode::Json);
        let ov = cli.cmd.overrides();
        assert!(ov.verbose);
        assert!(!ov.no_color);
    }

    #[test]
    fn test_unknown_subcommand_is_rejected() {
        let err = Cli::try_parse_from(["all_lint", "badcmd"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
        let err = Cli::try_parse_from(["all_lint", "help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
        let err = Cli::try_parse_from(["all_lint"]).unwrap_err();
        assert_ne!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_help_mentions_fatal_resolution_errors() {
        let help = Cli::command().render_long_help().to_string();
        assert!(help.contains("file resolution hit a fatal error"));
    }
}
