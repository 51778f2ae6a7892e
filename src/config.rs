//! Ambient configuration surface (§6.2).
//!
//! Prompy's configuration is read once per CLI invocation rather than
//! hot-reloaded in a long-running process, so this module is deliberately
//! smaller than the teacher's `config`/`toml_edit`/`arc-swap`/`notify`
//! live-reload stack (dropped; see DESIGN.md). `dirs` still locates the
//! user's config root, and `toml`/`serde` still parse it, matching the
//! teacher's choice of crates for "the same concern" rather than inventing
//! a new one.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// On-disk configuration, read from `<config root>/config.toml` if present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrompyConfig {
    /// Additional fragment search roots, in precedence order, consulted
    /// after the ones derived from the current project and CLI flags.
    #[serde(default)]
    pub search_roots: Vec<PathBuf>,
    #[serde(default)]
    pub default_project: Option<String>,
    #[serde(default)]
    pub default_language: Option<String>,
}

impl PrompyConfig {
    /// Load `config.toml` from `root` if it exists; an absent file is not
    /// an error (§6.2), it just means all-default configuration.
    pub fn load(root: &Path) -> Result<Self, crate::error::Error> {
        let path = root.join("config.toml");
        if !path.is_file() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path).map_err(|source| crate::error::Error::Io {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| crate::error::Error::Syntax {
            file: Some(path),
            line: source.span().map(|s| s.start).unwrap_or(0),
            column: 0,
            detail: source.to_string(),
            snippet: String::new(),
        })
    }
}

/// The platform's per-user configuration directory for this application,
/// e.g. `~/.config/prompy` on Linux.
pub fn default_user_config_root() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("prompy"))
}

/// Walk upward from `start` looking for a `.prompy` directory marking a
/// project root, the way version-control tools locate their own root.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        if dir.join(".prompy").is_dir() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn missing_config_file_is_not_an_error() {
        let dir = tempdir().unwrap();
        let config = PrompyConfig::load(dir.path()).unwrap();
        assert!(config.search_roots.is_empty());
    }

    #[test]
    fn parses_present_config_file() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("config.toml"),
            "default_project = \"acme\"\nsearch_roots = [\"/extra\"]\n",
        )
        .unwrap();

        let config = PrompyConfig::load(dir.path()).unwrap();
        assert_eq!(config.default_project.as_deref(), Some("acme"));
        assert_eq!(config.search_roots, vec![PathBuf::from("/extra")]);
    }

    #[test]
    fn finds_project_root_by_walking_upward() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".prompy")).unwrap();
        let nested = dir.path().join("a/b/c");
        fs::create_dir_all(&nested).unwrap();

        let found = find_project_root(&nested).unwrap();
        assert_eq!(found, dir.path());
    }

    #[test]
    fn no_project_root_found_returns_none() {
        let dir = tempdir().unwrap();
        assert!(find_project_root(dir.path()).is_none());
    }
}
