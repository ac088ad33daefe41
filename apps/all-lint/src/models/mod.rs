//! Run result models shared by the runner and the printers.

use serde::{Serialize, Serializer};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Outcome of one executed linter. Skipped linters produce none.
pub struct ExecutionResult {
    pub name: String,
    pub succeeded: bool,
    /// `None` when the process was killed by a signal or never started.
    pub exit_code: Option<i32>,
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// All results of one invocation, in execution order.
pub struct RunReport {
    pub results: Vec<ExecutionResult>,
    /// Set when `stop_on_early` cut the run short.
    pub stopped_early: bool,
}

impl RunReport {
    /// True when every executed linter passed (vacuously true if none ran).
    pub fn success(&self) -> bool {
        self.results.iter().all(|r| r.succeeded)
    }

    pub fn executed(&self) -> usize {
        self.results.len()
    }

    pub fn failed_names(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| !r.succeeded)
            .map(|r| r.name.as_str())
            .collect()
    }
}

fn as_millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}
