//! Target file resolution for each linter.
//!
//! The target set is the union of a linter's glob expansions, optionally
//! narrowed to files named on the command line, minus anything excluded by
//! gitignore rules. Paths are reported relative to the working root, in
//! glob order (or argument order when CLI files are given), de-duplicated.

use crate::error::{Error, Result};
use glob::{glob_with, MatchOptions, Pattern};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use ignore::Match;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};
use std::rc::Rc;

/// Shell-like matching: `*` stays within a directory and dotfiles need a
/// literal leading dot.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Version-control ignore rules consulted as an exclusion predicate.
///
/// Mirrors git: every `.gitignore` from the repository root down to a
/// file's directory applies, deeper files take precedence, and
/// `.git/info/exclude` plus the global excludes file come last. A path is
/// ignored when it or any of its parent directories is.
pub struct IgnoreRules {
    root: PathBuf,
    repo_root: PathBuf,
    /// `.git/info/exclude` then the global excludes, in precedence order.
    fallback: Vec<Gitignore>,
    per_dir: RefCell<HashMap<PathBuf, Option<Rc<Gitignore>>>>,
}

impl IgnoreRules {
    /// Prepare rules for targets relative to `root`.
    ///
    /// The repository root is the nearest ancestor holding `.git`; outside a
    /// repository `root` itself is used.
    pub fn discover(root: &Path) -> Self {
        let repo_root = detect_repo_root(root);
        let mut fallback = Vec::new();

        let exclude = repo_root.join(".git/info/exclude");
        if exclude.is_file() {
            let mut builder = GitignoreBuilder::new(&repo_root);
            if let Some(err) = builder.add(&exclude) {
                tracing::warn!(path = %exclude.display(), error = %err, "skipping unreadable ignore rules");
            }
            fallback.extend(build_matcher(builder));
        }
        let (global, err) = GitignoreBuilder::new(&repo_root).build_global();
        if let Some(err) = err {
            tracing::warn!(error = %err, "global git excludes unavailable");
        }
        if !global.is_empty() {
            fallback.push(global);
        }

        tracing::debug!(repo_root = %repo_root.display(), "ignore rules prepared");
        Self {
            root: root.to_path_buf(),
            repo_root,
            fallback,
            per_dir: RefCell::new(HashMap::new()),
        }
    }

    /// True when `path` (relative to the working root) or one of its parent
    /// directories is ignored.
    pub fn is_ignored(&self, path: &Path) -> bool {
        let abs = clean(&self.root.join(path));
        let rel = match abs.strip_prefix(&self.repo_root) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => return false,
        };
        let count = rel.components().count();
        let mut current = self.repo_root.clone();
        for (i, comp) in rel.components().enumerate() {
            let parent = current.clone();
            current.push(comp);
            let is_dir = i + 1 < count;
            if self.match_one(&parent, &current, is_dir).is_ignore() {
                return true;
            }
        }
        false
    }

    /// Decide one path: the deepest `.gitignore` with an opinion wins, then
    /// the repository-wide excludes.
    fn match_one(&self, parent: &Path, path: &Path, is_dir: bool) -> Match<()> {
        let mut dir = Some(parent);
        while let Some(d) = dir {
            if let Some(m) = self.dir_matcher(d) {
                let found = m.matched(path, is_dir);
                if !found.is_none() {
                    return found.map(|_| ());
                }
            }
            if d == self.repo_root {
                break;
            }
            dir = d.parent();
        }
        for m in &self.fallback {
            let found = m.matched(path, is_dir);
            if !found.is_none() {
                return found.map(|_| ());
            }
        }
        Match::None
    }

    fn dir_matcher(&self, dir: &Path) -> Option<Rc<Gitignore>> {
        if let Some(cached) = self.per_dir.borrow().get(dir) {
            return cached.clone();
        }
        let file = dir.join(".gitignore");
        let matcher = if file.is_file() {
            let mut builder = GitignoreBuilder::new(dir);
            if let Some(err) = builder.add(&file) {
                tracing::warn!(path = %file.display(), error = %err, "skipping unreadable ignore rules");
            }
            build_matcher(builder).map(Rc::new)
        } else {
            None
        };
        self.per_dir
            .borrow_mut()
            .insert(dir.to_path_buf(), matcher.clone());
        matcher
    }
}

fn build_matcher(builder: GitignoreBuilder) -> Option<Gitignore> {
    match builder.build() {
        Ok(matcher) if !matcher.is_empty() => Some(matcher),
        Ok(_) => None,
        Err(err) => {
            tracing::warn!(error = %err, "ignore rules unavailable");
            None
        }
    }
}

/// Walk upward from `start` to the directory holding `.git`.
fn detect_repo_root(start: &Path) -> PathBuf {
    let start = clean(start);
    let mut cur = start.as_path();
    loop {
        if cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.clone(),
        }
    }
}

/// Lexically resolve `.` and `..` components.
fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(comp);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Computes per-linter target sets against a fixed working root.
pub struct TargetResolver {
    root: PathBuf,
    files: Vec<PathBuf>,
    ignore: Option<IgnoreRules>,
    fallback_to_glob: bool,
}

impl TargetResolver {
    /// Create a resolver. `files` are the CLI file arguments (may be empty).
    pub fn new<S: AsRef<str>>(root: impl Into<PathBuf>, files: &[S]) -> Self {
        let root = root.into();
        let files = files
            .iter()
            .map(|f| relative_to(&root, &normalize(Path::new(f.as_ref()))))
            .collect();
        Self {
            root,
            files,
            ignore: None,
            fallback_to_glob: false,
        }
    }

    pub fn with_ignore(mut self, ignore: Option<IgnoreRules>) -> Self {
        self.ignore = ignore;
        self
    }

    /// Fall back to the full glob expansion when no CLI file matches.
    pub fn with_fallback(mut self, fallback_to_glob: bool) -> Self {
        self.fallback_to_glob = fallback_to_glob;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve the target set for one linter's glob list.
    pub fn resolve(&self, globs: &[String]) -> Result<Vec<PathBuf>> {
        let expanded = self.expand(globs)?;
        let targets = if self.files.is_empty() {
            expanded
        } else {
            let selected: Vec<PathBuf> = {
                let matched: HashSet<&PathBuf> = expanded.iter().collect();
                let mut seen = HashSet::new();
                self.files
                    .iter()
                    .filter(|f| self.root.join(f).is_file())
                    .filter(|f| matched.contains(f))
                    .filter(|f| seen.insert(*f))
                    .cloned()
                    .collect()
            };
            if selected.is_empty() && self.fallback_to_glob {
                tracing::debug!("no CLI file matched; falling back to glob expansion");
                expanded
            } else {
                selected
            }
        };
        Ok(match &self.ignore {
            Some(rules) => targets
                .into_iter()
                .filter(|p| !rules.is_ignored(p))
                .collect(),
            None => targets,
        })
    }

    /// Union of all glob expansions, regular files only, first occurrence wins.
    ///
    /// Matches whose names are not valid UTF-8 cannot be substituted into a
    /// command faithfully and are skipped.
    fn expand(&self, globs: &[String]) -> Result<Vec<PathBuf>> {
        let root = self
            .root
            .to_str()
            .ok_or_else(|| Error::NonUtf8Path(self.root.clone()))?;
        let base = Pattern::escape(root);
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for pat in globs {
            let full = format!("{}/{}", base.trim_end_matches('/'), pat);
            for entry in glob_with(&full, MATCH_OPTIONS)? {
                let path = entry?;
                if !path.is_file() {
                    continue;
                }
                if path.to_str().is_none() {
                    tracing::warn!(path = %path.display(), "skipping file with a non-UTF-8 name");
                    continue;
                }
                let rel = relative_to(&self.root, &path);
                if seen.insert(rel.clone()) {
                    out.push(rel);
                }
            }
        }
        Ok(out)
    }
}

/// Drop `.` components so `./a.rb` and `a.rb` compare equal.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Express absolute paths under `root` relative to it; leave others alone.
fn relative_to(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        pathdiff::diff_paths(path, root).unwrap_or_else(|| path.to_path_buf())
    } else {
        path.to_path_buf()
    }
}
