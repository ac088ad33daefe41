//! all_lint core library.
//!
//! Runs a set of configured linters against the files their globs match and
//! folds their exit statuses into one result.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Loading and validating `.all_lint.yml`.
//! - `resolve`: Per-linter target sets (globs, CLI files, gitignore).
//! - `shell`: Placeholder expansion and shell quoting.
//! - `runner`: Sequential execution of linters.
//! - `models`: Execution results and the run report.
//! - `output`: Human/JSON printers.
//! - `settings`: Verbosity and color toggles.
//! - `error`: Config and fatal run errors.
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod resolve;
pub mod runner;
pub mod settings;
pub mod shell;
