//! Diagnostic and color toggles resolved once per invocation.
//!
//! Sources, in precedence order: CLI flags > environment > defaults.
//! - `ALL_LINT_VERBOSE`: any value enables skip/target diagnostics.
//! - `ALL_LINT_LIST_FILES`: any value lists each target (with verbose).
//! - `NO_COLOR` or `ALL_LINT_COLOR=0`: disable color.
//! - `ALL_LINT_COLOR=1`: force color.
//! - Otherwise color is on when stdout is a terminal and `TERM` is not `dumb`.

use std::ffi::{OsStr, OsString};
use std::io::IsTerminal;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settings {
    pub verbose: bool,
    pub list_files: bool,
    pub color: bool,
}

#[derive(Debug, Clone, Copy, Default)]
/// Flag overrides taken from the `run` subcommand.
pub struct Overrides {
    pub verbose: bool,
    pub list_files: bool,
    pub no_color: bool,
}

impl Settings {
    /// Resolve from the process environment and stdout's terminal status.
    pub fn from_env(overrides: Overrides) -> Self {
        Self::resolve(
            |key| std::env::var_os(key),
            std::io::stdout().is_terminal(),
            overrides,
        )
    }

    /// Resolve using an arbitrary variable lookup.
    pub fn resolve<F>(lookup: F, stdout_is_tty: bool, overrides: Overrides) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let verbose = overrides.verbose || lookup("ALL_LINT_VERBOSE").is_some();
        let list_files = overrides.list_files || lookup("ALL_LINT_LIST_FILES").is_some();
        let color = !overrides.no_color && color_enabled(&lookup, stdout_is_tty);
        Settings {
            verbose,
            list_files,
            color,
        }
    }
}

fn color_enabled<F>(lookup: &F, stdout_is_tty: bool) -> bool
where
    F: Fn(&str) -> Option<OsString>,
{
    let forced = lookup("ALL_LINT_COLOR");
    if lookup("NO_COLOR").is_some() || forced.as_deref() == Some(OsStr::new("0")) {
        return false;
    }
    if forced.as_deref() == Some(OsStr::new("1")) {
        return true;
    }
    stdout_is_tty && lookup("TERM").map_or(true, |t| t.to_str() != Some("dumb"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<OsString> {
        let map: HashMap<String, OsString> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), OsString::from(*v)))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_defaults_follow_tty() {
        let s = Settings::resolve(env(&[]), true, Overrides::default());
        assert_eq!(
            s,
            Settings {
                verbose: false,
                list_files: false,
                color: true
            }
        );
        let s = Settings::resolve(env(&[]), false, Overrides::default());
        assert!(!s.color);
    }

    #[test]
    fn test_env_toggles() {
        let s = Settings::resolve(
            env(&[("ALL_LINT_VERBOSE", ""), ("ALL_LINT_LIST_FILES", "1")]),
            false,
            Overrides::default(),
        );
        assert!(s.verbose);
        assert!(s.list_files);
    }

    #[test]
    fn test_color_precedence() {
        let no = Settings::resolve(
            env(&[("NO_COLOR", "1"), ("ALL_LINT_COLOR", "1")]),
            true,
            Overrides::default(),
        );
        assert!(!no.color);
        let off = Settings::resolve(env(&[("ALL_LINT_COLOR", "0")]), true, Overrides::default());
        assert!(!off.color);
        let forced = Settings::resolve(env(&[("ALL_LINT_COLOR", "1")]), false, Overrides::default());
        assert!(forced.color);
        let dumb = Settings::resolve(env(&[("TERM", "dumb")]), true, Overrides::default());
        assert!(!dumb.color);
    }

    #[test]
    fn test_flags_override_env() {
        let s = Settings::resolve(
            env(&[("ALL_LINT_COLOR", "1")]),
            true,
            Overrides {
                verbose: true,
                list_files: true,
                no_color: true,
            },
        );
        assert!(s.verbose && s.list_files);
        assert!(!s.color);
    }
}
