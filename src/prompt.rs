//! Interactive input: the parameter prompting loop and template discovery.
//!
//! Prompting happens before the definition is built; the builder itself
//! never prompts. Every validation failure for an answer is surfaced before
//! the operator is asked again.

use anyhow::{Context, Result, bail};
use cloudkit::events::humanize;
use dialoguer::{Input, Select};
use formation::{StackOptions, Template, validate};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ui;

/// Line-input seam so the prompting loop is testable without a terminal.
pub trait Prompt {
    /// Ask one question, pre-filled with a default when available.
    fn ask(&mut self, question: &str, default: Option<&str>) -> Result<String>;
}

/// Terminal-backed prompt.
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn ask(&mut self, question: &str, default: Option<&str>) -> Result<String> {
        let mut input = Input::<String>::new().with_prompt(question);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        input.interact_text().context("parameter prompt aborted")
    }
}

/// Resolve a value for every declared parameter that lacks one.
///
/// For each unresolved parameter the operator is asked, pre-filled with the
/// template default, until the answer passes validation. With prompting
/// disabled this is a no-op and unresolved parameters fail later in the
/// definition builder.
pub fn populate_parameters(
    template: &Template,
    options: &mut StackOptions,
    prompt: &mut dyn Prompt,
    interactive: bool,
) -> Result<()> {
    if !interactive {
        return Ok(());
    }
    for (name, constraint) in template.parameters() {
        if options.parameter(&name).is_some() {
            continue;
        }
        let question = humanize(&name);
        loop {
            let default = constraint.default.clone();
            let answer = prompt.ask(&question, default.as_deref())?;
            let failures = validate(&answer, &constraint);
            if failures.is_empty() {
                options.set_parameter(&name, &answer);
                break;
            }
            for failure in &failures {
                ui::error(&failure.message);
            }
        }
    }
    Ok(())
}

// ============================================================================
// Template discovery
// ============================================================================

/// Interactively pick a template below `dir`, recursing into directories.
pub fn discover_template(dir: &Path) -> Result<PathBuf> {
    let (directories, files) = scan_directory(dir)?;
    if directories.is_empty() && files.is_empty() {
        bail!("no templates discoverable under {}", dir.display());
    }

    let mut labels = Vec::new();
    for path in &directories {
        labels.push(format!("{}/", display_label(path)));
    }
    for path in &files {
        labels.push(display_label(path));
    }

    let selection = Select::new()
        .with_prompt("Select the template to use")
        .items(&labels)
        .default(0)
        .interact()
        .context("template selection aborted")?;

    if selection < directories.len() {
        discover_template(&directories[selection])
    } else {
        Ok(files[selection - directories.len()].clone())
    }
}

/// Sorted subdirectories and `.json` templates below `dir`, dotfiles skipped.
fn scan_directory(dir: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut directories = Vec::new();
    let mut files = Vec::new();
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Could not read templates directory: {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        if path.is_dir() {
            directories.push(path);
        } else if path.extension().and_then(|e| e.to_str()) == Some("json") {
            files.push(path);
        }
    }
    directories.sort();
    files.sort();
    Ok((directories, files))
}

/// Humanize a path for the selection menu: `web-tier.json` becomes `Web Tier`.
fn display_label(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    stem.split(['-', '_'])
        .filter(|part| !part.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
