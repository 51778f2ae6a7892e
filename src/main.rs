mod cli;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Command};
use prompy::{ListFilters, RenderOptions};
use std::collections::HashMap;
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = load_config()?;
    let roots = resolve_roots(&cli.roots, &config)?;
    let project = pick(&cli.project, &config.default_project);
    let language = pick(&cli.language, &config.default_language);

    match cli.command {
        Command::Render { slug, string, set } => {
            let scope: HashMap<String, String> = set.into_iter().collect();
            let options = RenderOptions {
                scope,
                project,
                language,
                roots,
            };
            let rendered = match (slug, string) {
                (Some(slug), None) => {
                    tracing::info!(%slug, "rendering fragment");
                    prompy::render(&slug, options)
                }
                (None, Some(body)) => {
                    tracing::info!("rendering literal template string");
                    prompy::render_string(&body, options)
                }
                _ => anyhow::bail!("expected either a fragment slug or --string, not both"),
            };
            match rendered {
                Ok(output) => {
                    print!("{output}");
                    Ok(())
                }
                Err(error) => {
                    eprintln!("{}", prompy::diagnostics::report(&error));
                    std::process::exit(1)
                }
            }
        }
        Command::List { category } => {
            let filters = ListFilters { category };
            let result = prompy::list_fragments(&roots, &filters);
            for entry in &result.entries {
                match &entry.description {
                    Some(description) => println!("{}\t{description}", entry.slug),
                    None => println!("{}", entry.slug),
                }
            }
            for entry in &result.shadowed {
                tracing::warn!(slug = %entry.slug, path = %entry.path.display(), "shadowed fragment");
            }
            Ok(())
        }
        Command::Rename { old_slug, new_slug } => {
            let count = prompy::move_fragment(&old_slug, &new_slug, &roots)
                .map_err(|error| anyhow::anyhow!(prompy::diagnostics::report(&error)))?;
            tracing::info!(old_slug, new_slug, files_rewritten = count, "renamed fragment");
            println!("rewrote {count} file(s)");
            Ok(())
        }
    }
}

/// Default search roots per §4.1's precedence order: (1) the project-local
/// `.prompy/` override root, if a project root is found by walking upward
/// from the current directory, then (2) the user configuration root's
/// `prompts/` subtree. `config`'s own `search_roots` are always appended
/// last. Explicit `--root` flags replace both default roots entirely. Falls
/// back to the current directory only if neither default root is available
/// (e.g. no project root and no resolvable user config directory).
fn resolve_roots(explicit: &[PathBuf], config: &prompy::config::PrompyConfig) -> anyhow::Result<Vec<PathBuf>> {
    let mut roots = if !explicit.is_empty() {
        explicit.to_vec()
    } else {
        let cwd = std::env::current_dir().context("determining current directory")?;
        let mut defaults = Vec::new();
        if let Some(project_root) = prompy::config::find_project_root(&cwd) {
            defaults.push(project_root.join(".prompy"));
        }
        if let Some(user_root) = prompy::config::default_user_config_root() {
            defaults.push(user_root.join("prompts"));
        }
        if defaults.is_empty() {
            defaults.push(cwd);
        }
        defaults
    };
    roots.extend(config.search_roots.iter().cloned());
    Ok(roots)
}

/// Load `config.toml` from the user's config root, if one exists (§6.2). A
/// user who has never created one gets all-default configuration.
fn load_config() -> anyhow::Result<prompy::config::PrompyConfig> {
    match prompy::config::default_user_config_root() {
        Some(root) => prompy::config::PrompyConfig::load(&root)
            .map_err(|error| anyhow::anyhow!(prompy::diagnostics::report(&error))),
        None => Ok(prompy::config::PrompyConfig::default()),
    }
}

/// CLI flags take precedence over the config file's defaults; an empty
/// string means "not set" (clap's `default_value = ""`, §6.5).
fn pick(flag: &str, configured: &Option<String>) -> String {
    if !flag.is_empty() {
        return flag.to_string();
    }
    configured.clone().unwrap_or_default()
}
