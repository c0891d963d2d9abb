//! Environment variable loading helpers.
//!
//! Keeps the fallback chain in one place so callers never repeat
//! `env::var(..).ok().or_else(..)` by hand.

use std::env;
use std::path::Path;

/// Load `.env` from the current directory into the process environment.
///
/// Variables that are already set are never overridden. Runs at most once.
pub fn load_dotenv() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let path = env::current_dir()
            .map(|d| d.join(".env"))
            .unwrap_or_else(|_| std::path::PathBuf::from(".env"));
        load_dotenv_from(&path);
    });
}

fn load_dotenv_from(path: &Path) {
    let Ok(content) = std::fs::read_to_string(path) else {
        return;
    };
    let mut applied = 0usize;
    for (key, value) in content.lines().filter_map(parse_dotenv_line) {
        if env::var(key).is_err() {
            env::set_var(key, value);
            applied += 1;
        }
    }
    tracing::debug!(path = %path.display(), applied, "Loaded .env");
}

/// Parse a single `KEY=value` line. Comments, blanks and malformed lines yield `None`.
pub(crate) fn parse_dotenv_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let line = line.strip_prefix("export ").unwrap_or(line);
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    let mut value = value.trim();
    // Strip inline comment (# not inside quotes)
    if let Some(hash_pos) = value.find('#') {
        let before_hash = value[..hash_pos].trim_end();
        if !before_hash.contains('"') && !before_hash.contains('\'') {
            value = before_hash;
        }
    }
    if value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')))
    {
        value = &value[1..value.len() - 1];
    }
    Some((key, value))
}

/// Lookup function over the real process environment.
///
/// Components that read several variables accept a `Fn(&str) -> Option<String>`
/// so tests can hand them a map instead of mutating the process environment.
pub fn process_lookup(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// Read `key`, falling back to `default`. Empty values count as unset.
pub fn env_or<F>(key: &str, default: F) -> String
where
    F: FnOnce() -> String,
{
    env::var(key)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(default)
}

/// Read `key`; empty or blank values are `None`.
pub fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|s| {
        let s = s.trim().to_string();
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    })
}

/// Boolean variable: `0/false/no/off` are false, any other value is true.
pub fn env_bool(key: &str, default: bool) -> bool {
    match env::var(key).ok().as_deref() {
        Some(s) => !matches!(
            s.trim().to_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        ),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dotenv_line_plain() {
        assert_eq!(parse_dotenv_line("EPOCHS=3"), Some(("EPOCHS", "3")));
        assert_eq!(
            parse_dotenv_line("export MODEL_NAME = resnet_v1_50"),
            Some(("MODEL_NAME", "resnet_v1_50"))
        );
    }

    #[test]
    fn test_parse_dotenv_line_quotes_and_comments() {
        assert_eq!(
            parse_dotenv_line("OUTPUT_DIR=\"/tmp/out dir\""),
            Some(("OUTPUT_DIR", "/tmp/out dir"))
        );
        assert_eq!(
            parse_dotenv_line("DATASET_NAME=tf_flowers # default set"),
            Some(("DATASET_NAME", "tf_flowers"))
        );
        assert_eq!(parse_dotenv_line("# comment"), None);
        assert_eq!(parse_dotenv_line("   "), None);
        assert_eq!(parse_dotenv_line("no_equals_here"), None);
        assert_eq!(parse_dotenv_line("=value"), None);
    }

    #[test]
    fn test_load_dotenv_does_not_override() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(".env");
        std::fs::write(
            &path,
            "TLT_LOADER_TEST_SET=from_file\nTLT_LOADER_TEST_NEW=fresh\n",
        )
        .unwrap();
        env::set_var("TLT_LOADER_TEST_SET", "from_env");
        load_dotenv_from(&path);
        assert_eq!(env::var("TLT_LOADER_TEST_SET").unwrap(), "from_env");
        assert_eq!(env::var("TLT_LOADER_TEST_NEW").unwrap(), "fresh");
    }

    #[test]
    fn test_env_helpers_fallbacks() {
        env::set_var("TLT_LOADER_TEST_EMPTY", "");
        env::set_var("TLT_LOADER_TEST_BLANK", "  ");
        env::set_var("TLT_LOADER_TEST_BOOL", "off");
        assert_eq!(
            env_or("TLT_LOADER_TEST_EMPTY", || "fallback".to_string()),
            "fallback"
        );
        assert_eq!(
            env_or("TLT_LOADER_TEST_BOOL", || "fallback".to_string()),
            "off"
        );
        assert_eq!(env_optional("TLT_LOADER_TEST_BLANK"), None);
        assert!(!env_bool("TLT_LOADER_TEST_BOOL", true));
        assert!(env_bool("TLT_LOADER_TEST_MISSING", true));
    }
}
