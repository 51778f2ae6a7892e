//! C1 — Slug & Path Resolver (§4.1).
//!
//! Maps a fragment slug to a concrete file under one of the configured
//! search roots. Pure function of its inputs: no environment reads, no
//! caching (the loader owns the per-render cache, §4.2).

use crate::error::Error;
use std::path::{Path, PathBuf};

/// Resolve `slug` to the first existing file across `roots`, in precedence
/// order. On failure, returns every path that was probed (for
/// [`Error::MissingFragment`]'s `searched` field).
pub fn resolve(
    slug: &str,
    project: &str,
    language: &str,
    roots: &[PathBuf],
) -> Result<PathBuf, Vec<PathBuf>> {
    let mut probed = Vec::new();
    for root in roots {
        if let Some(candidate) = candidate_path(root, slug, project, language) {
            let exists = candidate.is_file();
            tracing::trace!(slug, path = %candidate.display(), exists, "probed path");
            probed.push(candidate.clone());
            if exists {
                return Ok(candidate);
            }
        }
    }
    Err(probed)
}

/// Every path that would be probed for `slug` across `roots`, regardless of
/// whether any of them exist. Used by the catalog and by tests that want to
/// assert on the exact search-path list without touching the filesystem.
pub fn probe_paths(slug: &str, project: &str, language: &str, roots: &[PathBuf]) -> Vec<PathBuf> {
    roots
        .iter()
        .filter_map(|root| candidate_path(root, slug, project, language))
        .collect()
}

/// Validate slug grammar: non-empty, no `..` path-traversal segment.
pub fn validate(slug: &str) -> Result<(), Error> {
    if slug.is_empty() {
        return Err(Error::InvalidSlug {
            slug: slug.to_string(),
        });
    }
    if slug.split('/').any(|segment| segment == "..") {
        return Err(Error::InvalidSlug {
            slug: slug.to_string(),
        });
    }
    Ok(())
}

/// Compute the on-disk candidate for `slug` under a single `root`, or `None`
/// if the slug's sigil requires a context value (`project`/`language`) that
/// is empty, in which case that root is skipped entirely for this slug.
fn candidate_path(root: &Path, slug: &str, project: &str, language: &str) -> Option<PathBuf> {
    let relative = rewrite_slug(slug, project, language)?;
    Some(root.join(relative).with_extension("md"))
}

/// Apply the sigil-rewrite rules from §4.1, returning the path (without
/// `.md`) relative to a search root.
fn rewrite_slug(slug: &str, project: &str, language: &str) -> Option<PathBuf> {
    if let Some(rest) = slug.strip_prefix("project/") {
        if project.is_empty() {
            return None;
        }
        return Some(PathBuf::from("projects").join(project).join(rest));
    }
    if let Some(rest) = slug.strip_prefix("language/") {
        if language.is_empty() {
            return None;
        }
        return Some(PathBuf::from("languages").join(language).join(rest));
    }
    if let Some(rest) = slug.strip_prefix("environment/") {
        if language.is_empty() {
            return None;
        }
        return Some(PathBuf::from("languages").join(language).join(rest));
    }
    Some(PathBuf::from("fragments").join(slug))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn plain_slug_resolves_under_fragments() {
        let dir = tempdir().unwrap();
        let root = dir.path().to_path_buf();
        fs::create_dir_all(root.join("fragments")).unwrap();
        fs::write(root.join("fragments/all-tests-pass.md"), "body").unwrap();

        let found = resolve("all-tests-pass", "", "", &[root.clone()]).unwrap();
        assert_eq!(found, root.join("fragments/all-tests-pass.md"));
    }

    #[test]
    fn project_sigil_rewrites_and_skips_when_empty() {
        let dir = tempdir().unwrap();
        let root = dir.path().to_path_buf();
        fs::create_dir_all(root.join("projects/my-proj")).unwrap();
        fs::write(root.join("projects/my-proj/init-shell.md"), "body").unwrap();

        let found = resolve("project/init-shell", "my-proj", "", &[root.clone()]).unwrap();
        assert_eq!(found, root.join("projects/my-proj/init-shell.md"));

        // Empty project means the root contributes no candidate at all.
        let missing = resolve("project/init-shell", "", "", &[root]);
        assert_eq!(missing, Err(Vec::new()));
    }

    #[test]
    fn missing_fragment_reports_all_probed_paths() {
        let dir = tempdir().unwrap();
        let root_a = dir.path().join("a");
        let root_b = dir.path().join("b");
        fs::create_dir_all(&root_a).unwrap();
        fs::create_dir_all(&root_b).unwrap();

        let err = resolve("nope", "", "", &[root_a.clone(), root_b.clone()]).unwrap_err();
        assert_eq!(
            err,
            vec![
                root_a.join("fragments/nope.md"),
                root_b.join("fragments/nope.md"),
            ]
        );
    }

    #[test]
    fn invalid_slug_rejects_empty_and_dotdot() {
        assert!(validate("").is_err());
        assert!(validate("foo/../bar").is_err());
        assert!(validate("foo/bar").is_ok());
    }
}
