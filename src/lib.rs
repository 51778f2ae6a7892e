//! Prompy — a fragment composition engine for building AI chat prompts out
//! of small, reusable Markdown fragments stitched together with minijinja
//! templates and a custom `@slug(args...)` reference operator.
//!
//! See the module list below for where each piece of the design lives; the
//! three free functions at the bottom of this file are the crate's public
//! entry points, used by both the CLI (`src/main.rs`) and integration
//! tests.

pub mod catalog;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod loader;
pub mod parser;
pub mod refactor;
pub mod slug;

use std::collections::HashMap;
use std::path::PathBuf;

pub use catalog::{CatalogEntry, ListFilters};
pub use error::{Error, Result};

/// Bundles the per-render inputs a caller needs to supply alongside a
/// fragment slug or literal body: the initial variable scope, the active
/// `project`/`language` used to resolve sigil-prefixed slugs (§4.1), and the
/// ordered list of search roots (§6.1).
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub scope: HashMap<String, String>,
    pub project: String,
    pub language: String,
    pub roots: Vec<PathBuf>,
}

/// Render a fragment's own slug (not a raw string body) against `options` —
/// the library's main entry point (§6.1).
pub fn render(slug: &str, options: RenderOptions) -> Result<String> {
    let RenderOptions {
        scope,
        project,
        language,
        roots,
    } = options;

    let top = slug::resolve(slug, &project, &language, &roots).map_err(|searched| {
        Error::MissingFragment {
            slug: slug.to_string(),
            caller_file: None,
            caller_line: 0,
            searched,
        }
    })?;
    let text = std::fs::read_to_string(&top).map_err(|source| Error::Io {
        path: top.clone(),
        source,
    })?;

    let fragment_engine = engine::FragmentEngine::new(project, language, roots);
    fragment_engine.render(&text, scope, Some(top))
}

/// Render an already-loaded template string directly, without resolving it
/// as a fragment slug first (used by tests and by the CLI's `--string`
/// mode, §6.5).
pub fn render_string(body: &str, options: RenderOptions) -> Result<String> {
    let RenderOptions {
        scope,
        project,
        language,
        roots,
    } = options;
    let fragment_engine = engine::FragmentEngine::new(project, language, roots);
    fragment_engine.render(body, scope, None)
}

/// List every fragment reachable across `roots` (§6.1, §4.7).
pub fn list_fragments(roots: &[PathBuf], filters: &catalog::ListFilters) -> catalog::CatalogResult {
    catalog::enumerate(roots, filters)
}

/// Rename a fragment slug everywhere it's referenced (§6.1, §4.8). Returns
/// the number of files rewritten.
pub fn move_fragment(old_slug: &str, new_slug: &str, roots: &[PathBuf]) -> Result<usize> {
    refactor::move_fragment(old_slug, new_slug, roots)
}
