use anyhow::{Context, Result, bail};
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

/// `$TALLY_HOME`, else `~/.tally`.
pub fn tally_home() -> Result<PathBuf> {
    resolve_home(std::env::var_os("TALLY_HOME"), std::env::var_os("HOME"))
}

fn resolve_home(tally_home: Option<OsString>, home: Option<OsString>) -> Result<PathBuf> {
    if let Some(dir) = tally_home.filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    match home.filter(|h| !h.is_empty()) {
        Some(home) => Ok(PathBuf::from(home).join(".tally")),
        None => bail!("HOME is not set (or set TALLY_HOME)"),
    }
}

pub fn ensure_tally_home() -> Result<PathBuf> {
    let dir = tally_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_home_override_wins() {
        let dir = resolve_home(Some("/srv/tally".into()), Some("/home/a".into())).unwrap();
        assert_eq!(dir, PathBuf::from("/srv/tally"));
    }

    #[test]
    fn test_defaults_under_home() {
        let dir = resolve_home(None, Some("/home/a".into())).unwrap();
        assert_eq!(dir, PathBuf::from("/home/a/.tally"));
        let dir = resolve_home(Some("".into()), Some("/home/a".into())).unwrap();
        assert_eq!(dir, PathBuf::from("/home/a/.tally"));
    }

    #[test]
    fn test_no_home() {
        assert!(resolve_home(None, None).is_err());
    }
}
