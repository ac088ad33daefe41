//! Configuration loading and validation.
//!
//! all_lint reads `.all_lint.yml` from the working root (or the path given
//! with `--config`). A path ending in `.toml` is read as TOML with the same
//! shape. Layout:
//!
//! ```yaml
//! options:
//!   stop_on_early: false      # optional
//!   respect_gitignore: true   # optional
//!   fallback_to_glob: false   # optional
//! linters:
//!   rubocop:
//!     glob: ["**/*.rb"]
//!     command: "bundle exec rubocop ${filter_files}"
//! ```
//!
//! Linters keep their declaration order; execution follows it.

use crate::error::ConfigError;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Default config file name, relative to the working root.
pub const DEFAULT_PATH: &str = ".all_lint.yml";

/// Literal token in a command template replaced by the target list.
pub const PLACEHOLDER: &str = "${filter_files}";

#[derive(Debug, Clone, PartialEq, Eq)]
/// A single configured linter.
pub struct LinterSpec {
    pub name: String,
    pub globs: Vec<String>,
    pub command: String,
    /// Copied from the global `options.stop_on_early`.
    pub stop_on_early: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Global options under the `options` mapping.
pub struct Options {
    pub stop_on_early: bool,
    pub respect_gitignore: bool,
    /// When CLI files match no glob, run against the full glob expansion
    /// instead of skipping the linter.
    pub fallback_to_glob: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            stop_on_early: false,
            respect_gitignore: true,
            fallback_to_glob: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Loaded configuration. Read-only once loaded.
pub struct Config {
    pub linters: Vec<LinterSpec>,
    pub options: Options,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Source syntax of a config file.
pub enum Format {
    Yaml,
    Toml,
}

impl Format {
    /// Pick the syntax from the file extension; anything but `.toml` is YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Format::Toml,
            _ => Format::Yaml,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Format::Yaml => "YAML",
            Format::Toml => "TOML",
        }
    }
}

/// Load and validate the config at `path`.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let src = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ConfigError::NotFound {
            path: path.to_path_buf(),
        },
        _ => ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    let cfg = parse_str(&src, Format::from_path(path))?;
    tracing::debug!(
        path = %path.display(),
        linters = cfg.linters.len(),
        "config loaded"
    );
    Ok(cfg)
}

/// Parse config text in the given syntax and validate it.
pub fn parse_str(src: &str, format: Format) -> Result<Config, ConfigError> {
    let data: Value = match format {
        Format::Yaml => serde_yaml::from_str(src).map_err(|e| ConfigError::Syntax {
            format: format.label(),
            message: e.to_string(),
        })?,
        Format::Toml => {
            let table: toml::Value = toml::from_str(src).map_err(|e| ConfigError::Syntax {
                format: format.label(),
                message: e.message().to_string(),
            })?;
            serde_yaml::to_value(table).map_err(|e| ConfigError::Syntax {
                format: format.label(),
                message: e.to_string(),
            })?
        }
    };
    from_value(data)
}

/// Validate an already-parsed document.
fn from_value(data: Value) -> Result<Config, ConfigError> {
    let root = match data {
        Value::Mapping(m) => m,
        _ => return Err(missing_linters()),
    };
    let options = match root.get("options") {
        None | Some(Value::Null) => Options::default(),
        Some(Value::Mapping(m)) => parse_options(m)?,
        Some(_) => {
            return Err(ConfigError::InvalidSchema(
                "'options' must be a mapping".into(),
            ))
        }
    };
    let linters = match root.get("linters") {
        Some(Value::Mapping(m)) => m,
        _ => return Err(missing_linters()),
    };

    let mut out = Vec::with_capacity(linters.len());
    for (key, conf) in linters {
        let name = scalar_to_string(key).ok_or_else(|| {
            ConfigError::InvalidSchema("linter names must be scalars".into())
        })?;
        out.push(parse_linter(name, conf, &options)?);
    }
    Ok(Config {
        linters: out,
        options,
    })
}

fn missing_linters() -> ConfigError {
    ConfigError::InvalidSchema("'linters' mapping is required".into())
}

fn parse_options(m: &Mapping) -> Result<Options, ConfigError> {
    let mut opts = Options::default();
    let flag = |key: &str, default: bool| -> Result<bool, ConfigError> {
        match m.get(key) {
            None => Ok(default),
            Some(v) => coerce_bool(v).ok_or_else(|| {
                ConfigError::InvalidSchema(format!("option '{}' must be a boolean", key))
            }),
        }
    };
    opts.stop_on_early = flag("stop_on_early", opts.stop_on_early)?;
    opts.respect_gitignore = flag("respect_gitignore", opts.respect_gitignore)?;
    opts.fallback_to_glob = flag("fallback_to_glob", opts.fallback_to_glob)?;
    Ok(opts)
}

fn parse_linter(name: String, conf: &Value, options: &Options) -> Result<LinterSpec, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidLinter {
        name: name.clone(),
        reason: reason.to_string(),
    };
    let conf = match conf {
        Value::Mapping(m) => m,
        _ => return Err(invalid("must be a mapping")),
    };
    let (glob, command) = match (non_null(conf.get("glob")), non_null(conf.get("command"))) {
        (Some(g), Some(c)) => (g, c),
        _ => return Err(invalid("'glob' and 'command' are required")),
    };

    let globs = match glob {
        Value::Sequence(items) => items
            .iter()
            .map(|v| match v {
                Value::String(s) => Ok(s.clone()),
                _ => Err(invalid("'glob' entries must be strings")),
            })
            .collect::<Result<Vec<_>, _>>()?,
        Value::String(s) => vec![s.clone()],
        _ => return Err(invalid("'glob' must be a pattern or a list of patterns")),
    };
    if globs.is_empty() {
        return Err(invalid("'glob' must list at least one pattern"));
    }
    for pat in &globs {
        if let Err(e) = glob::Pattern::new(pat) {
            return Err(invalid(&format!("bad glob pattern '{}': {}", pat, e.msg)));
        }
    }

    let command = match command {
        Value::Sequence(_) | Value::Mapping(_) => {
            return Err(invalid("'command' must be a string"))
        }
        other => scalar_to_string(other).ok_or_else(|| invalid("'command' must be a string"))?,
    };
    if command.trim().is_empty() {
        return Err(invalid("'command' must not be empty"));
    }

    Ok(LinterSpec {
        name,
        globs,
        command,
        stop_on_early: options.stop_on_early,
    })
}

fn non_null(v: Option<&Value>) -> Option<&Value> {
    v.filter(|v| !v.is_null())
}

/// Render a YAML scalar as a string; `None` for null and collections.
fn scalar_to_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(t) => scalar_to_string(&t.value),
        _ => None,
    }
}

/// Coerce a scalar into a boolean. Collections are rejected.
fn coerce_bool(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        Value::Null => Some(false),
        Value::Number(n) => Some(n.as_f64().map(|f| f != 0.0).unwrap_or(true)),
        Value::String(s) => {
            let s = s.trim().to_ascii_lowercase();
            Some(!matches!(s.as_str(), "" | "false" | "no" | "off" | "0"))
        }
        Value::Tagged(t) => coerce_bool(&t.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}
