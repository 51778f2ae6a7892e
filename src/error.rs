//! Structured error taxonomy for the fragment composition engine (see §7).
//!
//! Every variant carries the file path / line it applies to where the spec
//! requires it. `Display` here is deliberately terse (one line, fit for a
//! `tracing::error!(%error, ...)` field); the multi-line, human-readable
//! rendering lives in [`crate::diagnostics`].

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("syntax error at line {line}: {detail}")]
    Syntax {
        file: Option<PathBuf>,
        line: usize,
        column: usize,
        detail: String,
        snippet: String,
    },

    #[error("missing fragment: @{slug}")]
    MissingFragment {
        slug: String,
        caller_file: Option<PathBuf>,
        caller_line: usize,
        searched: Vec<PathBuf>,
    },

    #[error("cyclic reference detected: {}", chain.join(" -> "))]
    Cycle {
        /// Slugs in stack order, repeating the first at the end.
        chain: Vec<String>,
        top_file: Option<PathBuf>,
        /// File paths resolved for each frame in `chain` (excluding the
        /// synthetic top frame and the final repeated slug).
        paths: Vec<PathBuf>,
        origin_line: usize,
    },

    #[error("missing required argument '{name}' for fragment @{slug}")]
    MissingArgument {
        name: String,
        slug: String,
        caller_file: Option<PathBuf>,
        caller_line: usize,
    },

    #[error("unbound variable '{name}'")]
    UnboundVariable {
        name: String,
        caller_file: Option<PathBuf>,
        caller_line: usize,
    },

    #[error("too many positional arguments for fragment @{slug}")]
    TooManyArguments {
        slug: String,
        caller_file: Option<PathBuf>,
        caller_line: usize,
    },

    #[error("invalid slug: '{slug}'")]
    InvalidSlug { slug: String },

    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// True for errors the resolver raises while binding a callee's
    /// argument scope, as opposed to locating/loading/evaluating it.
    pub fn is_argument_error(&self) -> bool {
        matches!(
            self,
            Error::MissingArgument { .. }
                | Error::UnboundVariable { .. }
                | Error::TooManyArguments { .. }
        )
    }
}
