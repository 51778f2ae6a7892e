//! C6 — Diagnostic Reporter.
//!
//! Converts a [`crate::error::Error`] into the multi-line, human-readable
//! message templates specified in spec §4.6. The engine never prints these
//! itself (§7); callers (the CLI, or a test assertion) ask for the rendered
//! string via [`report`].

use crate::error::Error;
use std::fmt::Write as _;

/// Render `error` as the multi-line diagnostic text described in §4.6.
pub fn report(error: &Error) -> String {
    let mut out = String::new();
    match error {
        Error::MissingFragment {
            slug,
            caller_file,
            caller_line,
            searched,
        } => {
            let _ = writeln!(out, "Error: Missing fragment: @{slug}");
            let _ = writeln!(out, "  in file: {}", display_file(caller_file.as_deref()));
            let _ = writeln!(out, "  at line: {caller_line}");
            let _ = writeln!(out, "  searched paths:");
            for path in searched {
                let _ = writeln!(out, "    - {}", path.display());
            }
        }
        Error::Cycle {
            chain,
            top_file,
            paths,
            origin_line,
        } => {
            let _ = writeln!(
                out,
                "Error: Cyclic reference detected: {}",
                chain
                    .iter()
                    .map(|s| format!("@{s}"))
                    .collect::<Vec<_>>()
                    .join(" -> ")
            );
            let _ = writeln!(out, "  in file: {}", display_file(top_file.as_deref()));
            for path in paths {
                let _ = writeln!(out, "  - {}", path.display());
            }
            let _ = writeln!(out, "  starting at line: {origin_line}");
        }
        Error::MissingArgument {
            name,
            slug,
            caller_file,
            caller_line,
        } => {
            let _ = writeln!(
                out,
                "Error: Missing required argument '{name}' for fragment @{slug}"
            );
            let _ = writeln!(out, "  in file: {}", display_file(caller_file.as_deref()));
            let _ = writeln!(out, "  at line: {caller_line}");
        }
        Error::UnboundVariable {
            name,
            caller_file,
            caller_line,
        } => {
            let _ = writeln!(out, "Error: Unbound variable '{name}'");
            let _ = writeln!(out, "  in file: {}", display_file(caller_file.as_deref()));
            let _ = writeln!(out, "  at line: {caller_line}");
        }
        Error::TooManyArguments {
            slug,
            caller_file,
            caller_line,
        } => {
            let _ = writeln!(
                out,
                "Error: Too many positional arguments for fragment @{slug}"
            );
            let _ = writeln!(out, "  in file: {}", display_file(caller_file.as_deref()));
            let _ = writeln!(out, "  at line: {caller_line}");
        }
        Error::Syntax {
            file,
            line,
            column,
            detail,
            snippet,
        } => {
            let _ = writeln!(out, "Error: Template syntax error at line {line}: {detail}");
            let _ = writeln!(out, "  in file: {}", display_file(file.as_deref()));
            let _ = writeln!(out, "  {snippet}");
            let _ = writeln!(out, "  {}^", " ".repeat(*column));
        }
        Error::InvalidSlug { slug } => {
            let _ = writeln!(out, "Error: Invalid slug: '{slug}'");
        }
        Error::Io { path, source } => {
            let _ = writeln!(out, "Error: I/O error reading {}: {source}", path.display());
        }
    }
    // Drop the trailing newline `writeln!` leaves so callers can print with
    // their own terminator.
    if out.ends_with('\n') {
        out.pop();
    }
    out
}

fn display_file(path: Option<&std::path::Path>) -> String {
    match path {
        Some(p) => p.display().to_string(),
        None => "<string>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_fragment_report_includes_all_fields() {
        let error = Error::MissingFragment {
            slug: "project/nope".into(),
            caller_file: Some(PathBuf::from("top.md")),
            caller_line: 3,
            searched: vec![PathBuf::from("/a/nope.md"), PathBuf::from("/b/nope.md")],
        };
        let text = report(&error);
        assert!(text.contains("Missing fragment: @project/nope"));
        assert!(text.contains("in file: top.md"));
        assert!(text.contains("at line: 3"));
        assert!(text.contains("- /a/nope.md"));
        assert!(text.contains("- /b/nope.md"));
    }

    #[test]
    fn cycle_report_chain_begins_and_ends_with_same_slug() {
        let error = Error::Cycle {
            chain: vec!["<top>".into(), "a".into(), "b".into(), "a".into()],
            top_file: None,
            paths: vec![PathBuf::from("a.md"), PathBuf::from("b.md")],
            origin_line: 1,
        };
        let text = report(&error);
        assert!(text.contains("@<top> -> @a -> @b -> @a"));
        assert!(text.contains("starting at line: 1"));
    }
}
