//! Command template expansion and POSIX shell quoting.

use crate::config::PLACEHOLDER;
use std::borrow::Cow;
use std::path::Path;
use std::process::Command;

/// Quote `arg` for a POSIX shell. Plain words pass through unchanged.
pub fn quote(arg: &str) -> Cow<'_, str> {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./,:@%+=".contains(c));
    if plain {
        return Cow::Borrowed(arg);
    }
    let mut out = String::with_capacity(arg.len() + 2);
    out.push('\'');
    for c in arg.chars() {
        if c == '\'' {
            out.push_str("'\\''");
        } else {
            out.push(c);
        }
    }
    out.push('\'');
    Cow::Owned(out)
}

/// Space-join `files`, quoting each element. Paths that are not valid
/// UTF-8 are left out.
pub fn join<P: AsRef<Path>>(files: &[P]) -> String {
    files
        .iter()
        .filter_map(|f| {
            let path = f.as_ref();
            let text = path.to_str();
            if text.is_none() {
                tracing::warn!(path = %path.display(), "leaving non-UTF-8 path out of the command");
            }
            text
        })
        .map(|f| quote(f).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Replace every placeholder occurrence in `template` with the quoted targets.
pub fn expand<P: AsRef<Path>>(template: &str, files: &[P]) -> String {
    template.replace(PLACEHOLDER, &join(files))
}

/// Build a process that runs `command` through the platform interpreter.
pub fn interpreter(command: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(command);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_plain_and_special() {
        assert_eq!(quote("a.rb"), "a.rb");
        assert_eq!(quote("lib/x-y_z.rb"), "lib/x-y_z.rb");
        assert_eq!(quote("my file.rb"), "'my file.rb'");
        assert_eq!(quote("it's.rb"), "'it'\\''s.rb'");
        assert_eq!(quote("$(rm -rf x).rb"), "'$(rm -rf x).rb'");
        assert_eq!(quote(""), "''");
    }

    #[test]
    fn test_expand_single_and_multiple_targets() {
        assert_eq!(expand("rubocop ${filter_files}", &["a.rb"]), "rubocop a.rb");
        assert_eq!(
            expand("lint ${filter_files} && again ${filter_files}", &["b.rb", "a b.rb"]),
            "lint b.rb 'a b.rb' && again b.rb 'a b.rb'"
        );
    }

    #[test]
    fn test_expand_without_placeholder_is_verbatim() {
        assert_eq!(expand("exit 0", &["a.rb"]), "exit 0");
    }

    #[cfg(unix)]
    #[test]
    fn test_quoted_names_survive_the_shell() {
        let cmd = format!("printf '%s\\n' {}", join(&["it's here.rb", "plain.rb"]));
        let out = interpreter(&cmd).output().unwrap();
        assert!(out.status.success());
        assert_eq!(String::from_utf8_lossy(&out.stdout), "it's here.rb\nplain.rb\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_join_leaves_out_non_utf8_paths() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;
        use std::path::PathBuf;

        let files = vec![
            PathBuf::from("a.rb"),
            PathBuf::from(OsStr::from_bytes(b"bad\xff.rb")),
            PathBuf::from("b c.rb"),
        ];
        assert_eq!(join(&files), "a.rb 'b c.rb'");
    }
}
