//! C2 — Fragment Loader (§4.2).
//!
//! Reads a prompt file, splits the optional `---`-delimited metadata block
//! from the template body, and parses the metadata as YAML. Loading is
//! idempotent within one [`Loader`]: repeated loads of the same
//! canonicalized path return the same cached [`Fragment`] (§3, §5).

use crate::error::Error;
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Declared argument table: name -> default value, or `None` for "required".
pub type ArgTable = IndexMap<String, Option<String>>;

#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub description: Option<String>,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Fragment {
    pub path: PathBuf,
    pub slug: String,
    pub metadata: Metadata,
    pub body: String,
    pub args: ArgTable,
}

#[derive(Debug, Default, Deserialize)]
struct RawMetadata {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default)]
    args: Option<ArgTable>,
    #[serde(default)]
    arguments: Option<ArgTable>,
}

/// Per-render cache of parsed fragments, keyed by canonicalized absolute
/// path. Deliberately scoped to a single render call (§5) — callers create
/// a fresh `Loader` per `render()` invocation.
#[derive(Default)]
pub struct Loader {
    cache: HashMap<PathBuf, Rc<Fragment>>,
}

impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load (or fetch from cache) the fragment at `path`, loaded for `slug`.
    pub fn load(&mut self, path: &Path, slug: &str) -> Result<Rc<Fragment>, Error> {
        let canonical = path.canonicalize().map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(cached) = self.cache.get(&canonical) {
            tracing::debug!(slug, path = %canonical.display(), "fragment cache hit");
            return Ok(cached.clone());
        }

        let fragment = Rc::new(parse_fragment(&canonical, slug)?);
        self.cache.insert(canonical, fragment.clone());
        Ok(fragment)
    }
}

fn parse_fragment(path: &Path, slug: &str) -> Result<Fragment, Error> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let (metadata, args, body) = split_front_matter(&text, path)?;

    Ok(Fragment {
        path: path.to_path_buf(),
        slug: slug.to_string(),
        metadata,
        body,
        args,
    })
}

/// Split `text` into (metadata, args table, body) per §4.2: if the file
/// begins with a line equal to `---`, everything up to the next `---` line
/// is a YAML mapping; everything after is the body. Otherwise metadata is
/// empty and the body is the whole file.
fn split_front_matter(text: &str, path: &Path) -> Result<(Metadata, ArgTable, String), Error> {
    let mut lines = text.split_inclusive('\n');
    let Some(first_line) = lines.next() else {
        return Ok((Metadata::default(), ArgTable::new(), String::new()));
    };
    if first_line.trim_end_matches(['\n', '\r']) != "---" {
        return Ok((Metadata::default(), ArgTable::new(), text.to_string()));
    }

    let mut raw_yaml = String::new();
    let mut body = String::new();
    let mut in_body = false;
    for line in lines {
        if !in_body && line.trim_end_matches(['\n', '\r']) == "---" {
            in_body = true;
            continue;
        }
        if in_body {
            body.push_str(line);
        } else {
            raw_yaml.push_str(line);
        }
    }

    let raw: RawMetadata = if raw_yaml.trim().is_empty() {
        RawMetadata::default()
    } else {
        serde_yaml::from_str(&raw_yaml).map_err(|source| Error::Syntax {
            file: Some(path.to_path_buf()),
            line: 1,
            column: 0,
            detail: format!("invalid front matter: {source}"),
            snippet: raw_yaml.lines().next().unwrap_or_default().to_string(),
        })?
    };

    let args = merge_arg_tables(raw.args, raw.arguments);

    let metadata = Metadata {
        description: raw.description,
        categories: raw.categories,
    };

    Ok((metadata, args, body))
}

/// `args` and `arguments` refer to the same concept (§3); if both are
/// present, merge them with `arguments` winning on key conflict (it is
/// listed first in the grammar as the canonical name). See DESIGN.md for
/// this Open-Question resolution.
fn merge_arg_tables(args: Option<ArgTable>, arguments: Option<ArgTable>) -> ArgTable {
    match (args, arguments) {
        (None, None) => ArgTable::new(),
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (Some(mut a), Some(b)) => {
            for (key, value) in b {
                a.insert(key, value);
            }
            a
        }
    }
}
