//! Ambient CLI surface (§6.5). Thin: every subcommand just gathers its
//! arguments and calls straight into the library.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "prompy", about = "Fragment composition engine for AI prompts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Fragment search root, highest precedence first. May be repeated.
    /// Defaults to the current directory if none are given.
    #[arg(long = "root", global = true)]
    pub roots: Vec<PathBuf>,

    /// Active project, used to resolve `project/...` slugs.
    #[arg(long, global = true, default_value = "")]
    pub project: String,

    /// Active language/environment, used to resolve `language/...` and
    /// `environment/...` slugs.
    #[arg(long, global = true, default_value = "")]
    pub language: String,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render a fragment (by slug) or a literal template string.
    Render {
        /// Fragment slug to render. Mutually exclusive with `--string`.
        slug: Option<String>,

        /// Render this literal template string instead of a fragment file.
        #[arg(long, conflicts_with = "slug")]
        string: Option<String>,

        /// Initial variable bindings as `name=value`. May be repeated.
        #[arg(long = "set", value_parser = parse_key_value)]
        set: Vec<(String, String)>,
    },
    /// List every fragment reachable across the configured search roots.
    List {
        /// Only list fragments tagged with this category.
        #[arg(long)]
        category: Option<String>,
    },
    /// Rename a fragment slug everywhere it is referenced.
    Rename {
        old_slug: String,
        new_slug: String,
    },
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) => Ok((key.to_string(), value.to_string())),
        None => Err(format!("expected name=value, got '{raw}'")),
    }
}
