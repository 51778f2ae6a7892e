//! C8 — Rename Refactorer (§4.8).
//!
//! Renames a fragment slug everywhere it is referenced, rewriting only the
//! matched slug text byte-for-byte and leaving every other byte of each
//! file (including the renamed fragment's own content) untouched. Writes
//! are atomic: each file is written to a temporary sibling and renamed into
//! place, mirroring the loader's preference for `tempfile` elsewhere in
//! this crate. Candidate files come from [`crate::catalog::enumerate`]
//! rather than a second directory walk (§4.8 step 1).

use crate::catalog::{self, ListFilters};
use crate::error::Error;
use crate::parser::find_all_references;
use std::fs;
use std::io::Write as _;
use std::path::PathBuf;

/// Rename every occurrence of `old_slug` to `new_slug` across the fragment
/// tree rooted at `roots`. Only exact slug matches are rewritten (never
/// prefix matches, e.g. renaming `a` does not touch `a/b`).
///
/// Uses the catalog to enumerate candidate files (spec.md §4.8 step 1)
/// rather than re-walking the tree itself. Shadowed fragment files are
/// rewritten too, alongside the entries the catalog would actually resolve
/// to — a shadowed file still physically exists and may still reference
/// `old_slug`, even though it wouldn't be reached by a render call.
pub fn move_fragment(old_slug: &str, new_slug: &str, roots: &[PathBuf]) -> Result<usize, Error> {
    crate::slug::validate(old_slug)?;
    crate::slug::validate(new_slug)?;

    let catalog::CatalogResult { entries, shadowed } = catalog::enumerate(roots, &ListFilters::default());

    let mut rewritten_files = 0;
    for path in entries.into_iter().chain(shadowed).map(|entry| entry.path) {
        if rewrite_file(&path, old_slug, new_slug)? {
            rewritten_files += 1;
        }
    }
    Ok(rewritten_files)
}

/// Rewrite a single file's reference occurrences of `old_slug`, in place.
/// Returns `true` if anything changed.
fn rewrite_file(path: &std::path::Path, old_slug: &str, new_slug: &str) -> Result<bool, Error> {
    let text = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let references = find_all_references(&text, Some(path))?;
    let mut spans: Vec<_> = references
        .into_iter()
        .filter(|token| token.slug == old_slug)
        .map(|token| token.slug_span)
        .collect();
    if spans.is_empty() {
        return Ok(false);
    }
    spans.sort_by_key(|span| span.start);

    let mut rewritten = String::with_capacity(text.len());
    let mut cursor = 0;
    for span in spans {
        rewritten.push_str(&text[cursor..span.start]);
        rewritten.push_str(new_slug);
        cursor = span.end;
    }
    rewritten.push_str(&text[cursor..]);

    write_atomic(path, &rewritten)?;
    Ok(true)
}

fn write_atomic(path: &std::path::Path, contents: &str) -> Result<(), Error> {
    let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    temp.write_all(contents.as_bytes())
        .map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
    temp.persist(path).map_err(|e| Error::Io {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn renames_reference_leaving_rest_of_file_untouched() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("fragments")).unwrap();
        fs::write(
            dir.path().join("fragments/caller.md"),
            r#"before {{ @old/name(x="1") }} after"#,
        )
        .unwrap();

        let count = move_fragment("old/name", "new/name", &[dir.path().to_path_buf()]).unwrap();
        assert_eq!(count, 1);

        let rewritten = fs::read_to_string(dir.path().join("fragments/caller.md")).unwrap();
        assert_eq!(rewritten, r#"before {{ @new/name(x="1") }} after"#);
    }

    #[test]
    fn does_not_touch_prefix_matches() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("fragments")).unwrap();
        fs::write(dir.path().join("fragments/caller.md"), "{{ @a/b() }}").unwrap();

        let count = move_fragment("a", "z", &[dir.path().to_path_buf()]).unwrap();
        assert_eq!(count, 0);
        let contents = fs::read_to_string(dir.path().join("fragments/caller.md")).unwrap();
        assert_eq!(contents, "{{ @a/b() }}");
    }

    #[test]
    fn renames_every_occurrence_across_the_tree() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("fragments")).unwrap();
        fs::write(dir.path().join("fragments/one.md"), "{{ @shared() }}").unwrap();
        fs::write(dir.path().join("fragments/two.md"), "x {{ @shared() }} y").unwrap();

        let count = move_fragment("shared", "common", &[dir.path().to_path_buf()]).unwrap();
        assert_eq!(count, 2);
    }
}
