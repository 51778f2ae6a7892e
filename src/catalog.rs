//! C7 — Fragment Catalog (§4.7).
//!
//! Enumerates every fragment file reachable across the configured search
//! roots, in root-precedence order, and reports when a later root's slug
//! shadows one already seen from an earlier root.

use crate::loader::Loader;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub slug: String,
    pub path: PathBuf,
    pub description: Option<String>,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ListFilters {
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CatalogResult {
    /// The fragments a render call would actually resolve to, one per slug.
    pub entries: Vec<CatalogEntry>,
    /// Occurrences of a slug that were shadowed by a higher-precedence root.
    pub shadowed: Vec<CatalogEntry>,
}

/// Walk every root (in precedence order) and build the catalog (§4.7).
/// `roots` earlier in the list win when the same slug appears under more
/// than one. Ordering is by root precedence first, by path within a root
/// second — never a single alphabetical-by-slug sort across the whole
/// flattened list, which would let a later, lower-precedence root's entries
/// sort ahead of an earlier root's.
pub fn enumerate(roots: &[PathBuf], filters: &ListFilters) -> CatalogResult {
    let mut seen = std::collections::HashMap::new();
    let mut entries = Vec::new();
    let mut shadowed = Vec::new();
    let mut loader = Loader::new();

    for root in roots {
        let mut found = walk_root(root);
        found.sort_by(|a, b| a.1.cmp(&b.1));
        for (slug, path) in found {
            let Ok(fragment) = loader.load(&path, &slug) else {
                continue;
            };
            let entry = CatalogEntry {
                slug: slug.clone(),
                path: path.clone(),
                description: fragment.metadata.description.clone(),
                categories: fragment.metadata.categories.clone(),
            };
            if let Some(category) = &filters.category {
                if !entry.categories.iter().any(|c| c == category) {
                    continue;
                }
            }
            if seen.contains_key(&slug) {
                shadowed.push(entry);
            } else {
                seen.insert(slug, ());
                entries.push(entry);
            }
        }
    }

    CatalogResult { entries, shadowed }
}

/// Enumerate `(slug, path)` pairs under one search root, deriving each
/// fragment's slug from its path relative to the root (the inverse of
/// [`crate::slug::resolve`]'s sigil rewriting).
fn walk_root(root: &Path) -> Vec<(String, PathBuf)> {
    let mut found = Vec::new();
    for (prefix, dir) in [
        ("fragments", root.join("fragments")),
        ("projects", root.join("projects")),
        ("languages", root.join("languages")),
    ] {
        if !dir.is_dir() {
            continue;
        }
        for entry in WalkDir::new(&dir).into_iter().filter_map(Result::ok) {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }
            if let Some(slug) = slug_from_path(prefix, &dir, path) {
                found.push((slug, path.to_path_buf()));
            }
        }
    }
    found
}

/// Reconstruct the slug a given on-disk path under `dir` (the `fragments`,
/// `projects`, or `languages` subtree) would have been resolved from.
fn slug_from_path(prefix: &str, dir: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(dir).ok()?.with_extension("");
    let relative_str = relative.to_str()?.replace(std::path::MAIN_SEPARATOR, "/");

    match prefix {
        "fragments" => Some(relative_str),
        // The project/language name itself isn't part of the slug (only
        // the sigil is) — `projects/<name>/<rest>.md` is always reached via
        // slug `project/<rest>` regardless of which project is active.
        "projects" => {
            let (_project, rest) = relative_str.split_once('/')?;
            Some(format!("project/{rest}"))
        }
        "languages" => {
            let (_language, rest) = relative_str.split_once('/')?;
            Some(format!("language/{rest}"))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn root_precedence_beats_alphabetical_slug_order() {
        let dir = tempdir().unwrap();
        let root_a = dir.path().join("a");
        let root_b = dir.path().join("b");
        write(&root_a, "fragments/zzz.md", "from a");
        write(&root_b, "fragments/aaa.md", "from b");

        let result = enumerate(&[root_a, root_b], &ListFilters::default());
        let slugs: Vec<_> = result.entries.iter().map(|e| e.slug.clone()).collect();
        assert_eq!(slugs, vec!["zzz", "aaa"]);
    }

    #[test]
    fn enumerates_plain_fragments_sorted_by_slug() {
        let dir = tempdir().unwrap();
        write(dir.path(), "fragments/b.md", "b body");
        write(dir.path(), "fragments/a.md", "a body");

        let result = enumerate(&[dir.path().to_path_buf()], &ListFilters::default());
        let slugs: Vec<_> = result.entries.iter().map(|e| e.slug.clone()).collect();
        assert_eq!(slugs, vec!["a", "b"]);
    }

    #[test]
    fn earlier_root_shadows_later_root() {
        let dir = tempdir().unwrap();
        let root_a = dir.path().join("a");
        let root_b = dir.path().join("b");
        write(&root_a, "fragments/dup.md", "from a");
        write(&root_b, "fragments/dup.md", "from b");

        let result = enumerate(&[root_a.clone(), root_b.clone()], &ListFilters::default());
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].path, root_a.join("fragments/dup.md"));
        assert_eq!(result.shadowed.len(), 1);
        assert_eq!(result.shadowed[0].path, root_b.join("fragments/dup.md"));
    }

    #[test]
    fn category_filter_excludes_non_matching_fragments() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "fragments/tagged.md",
            "---\ncategories: [finish]\n---\nbody",
        );
        write(dir.path(), "fragments/untagged.md", "body");

        let filters = ListFilters {
            category: Some("finish".to_string()),
        };
        let result = enumerate(&[dir.path().to_path_buf()], &filters);
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].slug, "tagged");
    }
}
