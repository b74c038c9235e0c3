//! Path expansion for user-supplied locations
//!
//! Game profiles store save and backup locations the way users type them:
//! `~/Games/Saves`, `$HOME/.local/share/game`, `%APPDATA%\Game\Saves`.
//! [`resolve_path`] turns such a string into an absolute, lexically
//! normalized path. It never touches the filesystem beyond asking for the
//! current directory.

use std::path::{Component, Path, PathBuf};

use directories::BaseDirs;

use crate::error::{SaveStashError, SaveStashResult};

/// Expand environment references and `~`, then make the path absolute
///
/// Supported forms: `~`, `~/...`, `$NAME`, `${NAME}`, `%NAME%`.
/// An undefined variable is an error; a path that does not exist is not.
pub fn resolve_path(input: &str) -> SaveStashResult<PathBuf> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(SaveStashError::invalid_path(input, "path is empty"));
    }

    let expanded = expand_vars(trimmed, |name| std::env::var(name).ok())?;
    let expanded = expand_home(&expanded, input)?;

    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()
            .map_err(|e| {
                SaveStashError::invalid_path(input, format!("cannot read current directory: {}", e))
            })?
            .join(expanded)
    };

    Ok(normalize(&absolute))
}

fn expand_home(path: &str, input: &str) -> SaveStashResult<PathBuf> {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with('\\') => rest,
        _ => return Ok(PathBuf::from(path)),
    };

    let home = BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .ok_or_else(|| SaveStashError::invalid_path(input, "home directory is unknown"))?;

    let rest = rest.trim_start_matches(&['/', '\\'][..]);
    if rest.is_empty() {
        Ok(home)
    } else {
        Ok(home.join(rest))
    }
}

/// Replace `$NAME`, `${NAME}` and `%NAME%` using `lookup`
fn expand_vars<F>(input: &str, lookup: F) -> SaveStashResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    let resolve = |name: &str| {
        lookup(name).ok_or_else(|| {
            SaveStashError::invalid_path(input, format!("environment variable '{}' is not set", name))
        })
    };

    while i < chars.len() {
        match chars[i] {
            '$' if chars.get(i + 1) == Some(&'{') => {
                let close = chars[i + 2..]
                    .iter()
                    .position(|&c| c == '}')
                    .ok_or_else(|| SaveStashError::invalid_path(input, "unterminated '${'"))?;
                let name: String = chars[i + 2..i + 2 + close].iter().collect();
                if name.is_empty() {
                    return Err(SaveStashError::invalid_path(input, "empty variable name"));
                }
                out.push_str(&resolve(&name)?);
                i += close + 3;
            }
            '$' if chars.get(i + 1).is_some_and(|c| is_var_char(*c)) => {
                let len = chars[i + 1..]
                    .iter()
                    .take_while(|c| is_var_char(**c))
                    .count();
                let name: String = chars[i + 1..i + 1 + len].iter().collect();
                out.push_str(&resolve(&name)?);
                i += len + 1;
            }
            '%' => {
                let close = chars[i + 1..].iter().position(|&c| c == '%');
                match close {
                    Some(len) if len > 0 && chars[i + 1..i + 1 + len].iter().all(|c| is_windows_var_char(*c)) => {
                        let name: String = chars[i + 1..i + 1 + len].iter().collect();
                        out.push_str(&resolve(&name)?);
                        i += len + 2;
                    }
                    _ => {
                        out.push('%');
                        i += 1;
                    }
                }
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }

    Ok(out)
}

fn is_var_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_windows_var_char(c: char) -> bool {
    is_var_char(c) || matches!(c, '(' | ')' | '-' | '.')
}

/// Remove `.` and resolve `..` without consulting the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Never pop past the root or a drive prefix
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "GAME_HOME" => Some("/srv/games".into()),
            "APPDATA" => Some("C:/Users/me/AppData/Roaming".into()),
            "ProgramFiles(x86)" => Some("C:/Program Files (x86)".into()),
            _ => None,
        }
    }

    #[test]
    fn test_expand_dollar_forms() {
        assert_eq!(expand_vars("$GAME_HOME/saves", lookup).unwrap(), "/srv/games/saves");
        assert_eq!(expand_vars("${GAME_HOME}x", lookup).unwrap(), "/srv/gamesx");
    }

    #[test]
    fn test_expand_percent_form() {
        assert_eq!(
            expand_vars("%APPDATA%/Game", lookup).unwrap(),
            "C:/Users/me/AppData/Roaming/Game"
        );
        assert_eq!(
            expand_vars("%ProgramFiles(x86)%/Steam", lookup).unwrap(),
            "C:/Program Files (x86)/Steam"
        );
    }

    #[test]
    fn test_literal_markers_are_kept() {
        assert_eq!(expand_vars("100% done", lookup).unwrap(), "100% done");
        assert_eq!(expand_vars("cost$/x", lookup).unwrap(), "cost$/x");
    }

    #[test]
    fn test_undefined_variable_is_invalid() {
        let err = expand_vars("$NOPE/saves", lookup).unwrap_err();
        assert!(matches!(err, SaveStashError::InvalidPath { .. }));
        assert!(err.to_string().contains("NOPE"));

        assert!(expand_vars("%NOPE%/saves", lookup).is_err());
    }

    #[test]
    fn test_malformed_brace_is_invalid() {
        assert!(expand_vars("${GAME_HOME/saves", lookup).is_err());
        assert!(expand_vars("${}/saves", lookup).is_err());
    }

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize(Path::new("/a/./b/../c")),
            PathBuf::from("/a/c")
        );
        assert_eq!(normalize(Path::new("/../x")), PathBuf::from("/x"));
    }

    #[test]
    fn test_resolve_env_and_relative() {
        std::env::set_var("SAVESTASH_TEST_EXPAND_ROOT", "/tmp/savestash-expand");
        let resolved = resolve_path("$SAVESTASH_TEST_EXPAND_ROOT/slot1/../slot2").unwrap();
        assert_eq!(resolved, PathBuf::from("/tmp/savestash-expand/slot2"));
        std::env::remove_var("SAVESTASH_TEST_EXPAND_ROOT");

        let relative = resolve_path("saves").unwrap();
        assert!(relative.is_absolute());
        assert!(relative.ends_with("saves"));
    }

    #[test]
    fn test_resolve_home() {
        let home = BaseDirs::new().unwrap().home_dir().to_path_buf();
        assert_eq!(resolve_path("~").unwrap(), normalize(&home));
        assert_eq!(
            resolve_path("~/Saves").unwrap(),
            normalize(&home.join("Saves"))
        );
    }

    #[test]
    fn test_nonexistent_path_is_fine() {
        assert!(resolve_path("/definitely/not/here/saves").is_ok());
        assert!(resolve_path("   ").is_err());
    }
}
