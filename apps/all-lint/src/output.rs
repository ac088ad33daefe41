//! Output rendering for a lint run.
//!
//! Supports `human` (default) and `json` outputs. Human output is streamed
//! while linters run; JSON is a single object printed when the run ends,
//! with per-linter results and a summary.

use crate::models::{ExecutionResult, RunReport};
use crate::settings::Settings;
use clap::ValueEnum;
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    #[default]
    Human,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Plain,
    Good,
    Bad,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One rendered line and the color it is painted with.
pub struct Line {
    text: String,
    tone: Tone,
}

impl Line {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: Tone::Plain,
        }
    }

    fn good(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: Tone::Good,
        }
    }

    fn bad(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: Tone::Bad,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    fn paint(&self, color: bool) -> String {
        if !color {
            return self.text.clone();
        }
        match self.tone {
            Tone::Plain => self.text.clone(),
            Tone::Good => self.text.green().to_string(),
            Tone::Bad => self.text.red().to_string(),
        }
    }
}

/// Prints progress and the final summary for a run.
pub struct Reporter {
    settings: Settings,
    mode: OutputMode,
}

impl Reporter {
    pub fn new(settings: Settings, mode: OutputMode) -> Self {
        Self { settings, mode }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    fn human(&self) -> bool {
        self.mode == OutputMode::Human
    }

    fn emit(&self, lines: &[Line]) {
        for line in lines {
            println!("{}", line.paint(self.settings.color));
        }
    }

    /// Verbose-only notice for a linter without targets.
    pub fn skipped(&self, name: &str) {
        if self.human() && self.settings.verbose {
            self.emit(&[Line::plain(format!("⏭️  [{}] no target files - skipped", name))]);
        }
    }

    /// Verbose-only target count, plus the file list when enabled.
    pub fn targets(&self, name: &str, targets: &[PathBuf]) {
        if self.human() && self.settings.verbose {
            self.emit(&compose_targets(name, targets, self.settings.list_files));
        }
    }

    /// Banner printed right before a linter starts.
    pub fn banner(&self, name: &str, command: &str) {
        if self.human() {
            println!();
            println!("==> [{}] {}", name, command);
        }
    }

    pub fn finished(&self, result: &ExecutionResult) {
        if self.human() {
            self.emit(&[compose_status(result)]);
        }
    }

    pub fn early_stop(&self, name: &str) {
        if self.human() {
            self.emit(&[Line::bad(format!(
                "⛔ Stopping early: '{}' failed (stop_on_early)",
                name
            ))]);
        }
    }

    /// Final summary. Human output stays silent when nothing ran.
    pub fn summary(&self, report: &RunReport) {
        match self.mode {
            OutputMode::Json => match serde_json::to_string_pretty(&compose_json(report)) {
                Ok(s) => println!("{}", s),
                Err(e) => tracing::error!(error = %e, "failed to render JSON summary"),
            },
            OutputMode::Human => self.emit(&compose_summary(report)),
        }
    }
}

/// Render an elapsed time: `0ms`, whole milliseconds below one second,
/// otherwise seconds with two decimals.
pub fn format_duration(d: Duration) -> String {
    if d.is_zero() {
        return "0ms".to_string();
    }
    let secs = d.as_secs_f64();
    if secs < 1.0 {
        format!("{}ms", (secs * 1000.0).round() as u64)
    } else {
        format!("{:.2}s", secs)
    }
}

fn compose_targets(name: &str, targets: &[PathBuf], list_files: bool) -> Vec<Line> {
    let mut lines = vec![Line::plain(format!(
        "🔍 [{}] target files: {}",
        name,
        targets.len()
    ))];
    if list_files {
        lines.extend(
            targets
                .iter()
                .map(|t| Line::plain(format!("  - {}", t.display()))),
        );
    }
    lines
}

/// Status line printed right after a linter exits.
pub fn compose_status(r: &ExecutionResult) -> Line {
    if r.succeeded {
        Line::good(format!("✅ [{}] passed", r.name))
    } else {
        match r.exit_code {
            Some(code) => Line::bad(format!("❌ [{}] failed (exit {})", r.name, code)),
            None => Line::bad(format!("❌ [{}] failed", r.name)),
        }
    }
}

/// Per-linter detail line: glyph, name, exit code (or `-`), elapsed time.
pub fn compose_detail(r: &ExecutionResult) -> Line {
    let icon = if r.succeeded { "✅" } else { "❌" };
    let code = r
        .exit_code
        .map(|c| c.to_string())
        .unwrap_or_else(|| "-".to_string());
    let text = format!(
        "{} [{}] exit {} | {}",
        icon,
        r.name,
        code,
        format_duration(r.duration)
    );
    if r.succeeded {
        Line::good(text)
    } else {
        Line::bad(text)
    }
}

/// Banner, failed names, and detail lines. Empty when nothing ran.
pub fn compose_summary(report: &RunReport) -> Vec<Line> {
    if report.executed() == 0 {
        return Vec::new();
    }
    let mut lines = vec![Line::plain("")];
    if report.success() {
        lines.push(Line::good("✨ All linters passed!"));
    } else {
        let failed = report.failed_names();
        lines.push(Line::bad(format!(
            "🚨 Some linters failed ({})",
            failed.len()
        )));
        lines.push(Line::bad("Failed linters:"));
        lines.extend(failed.iter().map(|n| Line::bad(format!("  - {}", n))));
    }
    lines.push(Line::plain(""));
    lines.push(Line::plain("Details:"));
    lines.extend(report.results.iter().map(compose_detail));
    lines.push(Line::plain(""));
    lines
}

/// Compose the JSON summary object (pure) for testing/snapshot purposes.
pub fn compose_json(report: &RunReport) -> JsonVal {
    json!({
        "results": report.results,
        "summary": {
            "executed": report.executed(),
            "failed": report.failed_names().len(),
            "success": report.success(),
            "stopped_early": report.stopped_early,
        }
    })
}
