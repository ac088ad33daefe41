//! Sequential linter execution.
//!
//! Linters run strictly in declaration order, one blocking child process at
//! a time. A linter without targets is skipped. A failing linter is recorded
//! and the run continues, unless `stop_on_early` is set.

use crate::config::{Config, LinterSpec};
use crate::error::Result;
use crate::models::{ExecutionResult, RunReport};
use crate::output::{OutputMode, Reporter};
use crate::resolve::TargetResolver;
use crate::shell;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

/// Drives one invocation over every configured linter.
pub struct Runner<'a> {
    config: &'a Config,
    resolver: TargetResolver,
    reporter: Reporter,
}

impl<'a> Runner<'a> {
    pub fn new(config: &'a Config, resolver: TargetResolver, reporter: Reporter) -> Self {
        Self {
            config,
            resolver,
            reporter,
        }
    }

    /// Run all linters and print the summary.
    ///
    /// Only target resolution errors abort the run; linter failures are data.
    pub fn run(&self) -> Result<RunReport> {
        let mut report = RunReport::default();
        for spec in &self.config.linters {
            let targets = self.resolver.resolve(&spec.globs)?;
            tracing::debug!(linter = %spec.name, targets = targets.len(), "targets resolved");
            if targets.is_empty() {
                self.reporter.skipped(&spec.name);
                continue;
            }
            self.reporter.targets(&spec.name, &targets);

            let result = run_linter(spec, &targets, self.resolver.root(), &self.reporter);
            self.reporter.finished(&result);

            let failed = !result.succeeded;
            report.results.push(result);
            if failed && spec.stop_on_early {
                self.reporter.early_stop(&spec.name);
                report.stopped_early = true;
                break;
            }
        }
        self.reporter.summary(&report);
        Ok(report)
    }
}

/// Expand the command for `targets`, announce it and run it from `root`.
fn run_linter(
    spec: &LinterSpec,
    targets: &[PathBuf],
    root: &Path,
    reporter: &Reporter,
) -> ExecutionResult {
    let command = shell::expand(&spec.command, targets);
    reporter.banner(&spec.name, &command);
    execute(spec, &command, root, reporter.mode())
}

/// Spawn the expanded command through the interpreter and wait for it.
///
/// Only the exit status is observed. In JSON mode the child's stdout is
/// sent to our stderr so stdout carries the report alone.
fn execute(spec: &LinterSpec, command: &str, root: &Path, mode: OutputMode) -> ExecutionResult {
    tracing::debug!(linter = %spec.name, %command, "spawning");
    let start = Instant::now();
    let status = shell::interpreter(command)
        .current_dir(root)
        .stdin(Stdio::inherit())
        .stdout(match mode {
            OutputMode::Human => Stdio::inherit(),
            OutputMode::Json => Stdio::from(std::io::stderr()),
        })
        .stderr(Stdio::inherit())
        .status();
    let duration = start.elapsed();
    match status {
        Ok(status) => ExecutionResult {
            name: spec.name.clone(),
            succeeded: status.success(),
            exit_code: status.code(),
            duration,
        },
        Err(err) => {
            tracing::warn!(linter = %spec.name, error = %err, "failed to start command interpreter");
            ExecutionResult {
                name: spec.name.clone(),
                succeeded: false,
                exit_code: None,
                duration,
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::{parse_str, Format};
    use crate::settings::Settings;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn workspace(files: &[&str]) -> TempDir {
        let dir = tempdir().unwrap();
        for f in files {
            fs::write(dir.path().join(f), "# x").unwrap();
        }
        dir
    }

    fn run(dir: &TempDir, yaml: &str, files: &[&str]) -> RunReport {
        let cfg = parse_str(yaml, Format::Yaml).unwrap();
        let resolver = TargetResolver::new(dir.path(), files);
        let reporter = Reporter::new(Settings::default(), OutputMode::Human);
        Runner::new(&cfg, resolver, reporter).run().unwrap()
    }

    fn quiet() -> Reporter {
        Reporter::new(Settings::default(), OutputMode::Json)
    }

    fn spec(command: &str) -> LinterSpec {
        LinterSpec {
            name: "t".into(),
            globs: vec!["*".into()],
            command: command.into(),
            stop_on_early: false,
        }
    }

    #[test]
    fn test_exit_status_is_recorded() {
        let dir = workspace(&[]);
        let ok = run_linter(&spec("exit 0"), &[], dir.path(), &quiet());
        assert!(ok.succeeded);
        assert_eq!(ok.exit_code, Some(0));
        let ng = run_linter(&spec("exit 3"), &[], dir.path(), &quiet());
        assert!(!ng.succeeded);
        assert_eq!(ng.exit_code, Some(3));
    }

    #[test]
    fn test_signal_has_no_exit_code() {
        let dir = workspace(&[]);
        let r = run_linter(&spec("kill -9 $$"), &[], dir.path(), &quiet());
        assert!(!r.succeeded);
        assert_eq!(r.exit_code, None);
    }

    #[test]
    fn test_targets_are_substituted_and_run_in_root() {
        let dir = workspace(&["a.rb", "b c.rb"]);
        let targets = vec![PathBuf::from("a.rb"), PathBuf::from("b c.rb")];
        let r = run_linter(
            &spec("printf '%s\\n' ${filter_files} > out.txt"),
            &targets,
            dir.path(),
            &quiet(),
        );
        assert!(r.succeeded);
        let out = fs::read_to_string(dir.path().join("out.txt")).unwrap();
        assert_eq!(out, "a.rb\nb c.rb\n");
    }

    #[test]
    fn test_all_linters_run_despite_failures() {
        let dir = workspace(&["a.rb"]);
        let report = run(
            &dir,
            r#"
linters:
  ok:
    glob: ["*.rb"]
    command: "exit 0"
  ng:
    glob: ["*.rb"]
    command: "exit 3"
  after:
    glob: ["*.rb"]
    command: "touch after.ran"
"#,
            &[],
        );
        let names: Vec<_> = report.results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["ok", "ng", "after"]);
        assert!(!report.success());
        assert!(!report.stopped_early);
        assert!(dir.path().join("after.ran").exists());
    }

    #[test]
    fn test_stop_on_early_halts_remaining_linters() {
        let dir = workspace(&["a.rb"]);
        let report = run(
            &dir,
            r#"
options:
  stop_on_early: true
linters:
  ng:
    glob: "*.rb"
    command: "exit 1"
  after:
    glob: "*.rb"
    command: "touch after.ran"
"#,
            &[],
        );
        assert_eq!(report.executed(), 1);
        assert!(report.stopped_early);
        assert!(!dir.path().join("after.ran").exists());
    }

    #[test]
    fn test_linters_without_targets_are_skipped() {
        let dir = workspace(&["a.txt"]);
        let report = run(
            &dir,
            "linters:\n  rb:\n    glob: '**/*.rb'\n    command: 'touch ran'\n",
            &[],
        );
        assert_eq!(report.executed(), 0);
        assert!(report.success());
        assert!(!dir.path().join("ran").exists());
    }

    #[test]
    fn test_cli_files_narrow_the_command() {
        let dir = workspace(&["a.rb", "b.rb", "c.txt"]);
        let report = run(
            &dir,
            "linters:\n  echo:\n    glob: ['**/*.rb']\n    command: 'echo ${filter_files} > out.txt'\n",
            &["a.rb", "c.txt"],
        );
        assert!(report.success());
        let out = fs::read_to_string(dir.path().join("out.txt")).unwrap();
        assert_eq!(out.trim(), "a.rb");
    }

    #[test]
    fn test_declaration_order_is_execution_order() {
        let dir = workspace(&["a.rb"]);
        run(
            &dir,
            r#"
linters:
  second:
    glob: "*.rb"
    command: "echo second >> order.txt"
  first:
    glob: "*.rb"
    command: "echo first >> order.txt"
"#,
            &[],
        );
        let out = fs::read_to_string(dir.path().join("order.txt")).unwrap();
        assert_eq!(out, "second\nfirst\n");
    }
}
