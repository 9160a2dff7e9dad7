//! Rendering of extraction results and project listings

use std::fmt::{self, Write as _};

use clap::ValueEnum;
use serde::Serialize;
use serde_json::json;

use crate::config::Config;
use crate::extractor::ExtractionResult;
use crate::version::error::ExtractError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum JsonStyle {
    #[default]
    Pretty,
    Minimised,
}

fn to_json<T: Serialize>(value: &T, style: JsonStyle) -> String {
    let rendered = match style {
        JsonStyle::Pretty => serde_json::to_string_pretty(value),
        JsonStyle::Minimised => serde_json::to_string(value),
    };

    rendered.unwrap_or_else(|e| {
        json!({ "success": false, "error": format!("JSON marshal error: {e}") }).to_string()
    })
}

/// Render the outcome of an extraction.
///
/// In JSON a success is the serialized [`ExtractionResult`]; a failure
/// carries `success` and `error` only.
pub fn render_result(
    outcome: &Result<ExtractionResult, ExtractError>,
    format: OutputFormat,
    style: JsonStyle,
    verbose: bool,
) -> String {
    match format {
        OutputFormat::Json => match outcome {
            Ok(result) => to_json(result, style),
            Err(e) => render_error(e, format, style),
        },
        OutputFormat::Text => match outcome {
            Ok(result) => render_text(result, verbose),
            Err(e) => format!("❌ No version found\nError: {e}\n"),
        },
    }
}

fn render_text(result: &ExtractionResult, verbose: bool) -> String {
    let mut out = String::from("✅ Version extracted successfully\n");
    let _ = writeln!(out, "Version: {}", result.version);
    let _ = write!(out, "Project Type: {}", result.project_type);
    if let Some(subtype) = result.subtype.as_deref().filter(|s| !s.is_empty()) {
        let _ = write!(out, " ({subtype})");
    }
    let _ = writeln!(out, "\nFile: {}", result.file.display());

    if verbose {
        let _ = writeln!(out, "Matched by: {}", result.matched_by);
        let _ = writeln!(out, "Version source: {}", result.version_source);
        if let Some(tag) = &result.git_tag {
            let _ = writeln!(out, "Git tag: {tag}");
        }
    }

    out
}

/// Render a failure that happened before extraction (configuration errors)
pub fn render_error(error: &dyn fmt::Display, format: OutputFormat, style: JsonStyle) -> String {
    match format {
        OutputFormat::Json => to_json(&json!({ "success": false, "error": error.to_string() }), style),
        OutputFormat::Text => format!("Error: {error}\n"),
    }
}

/// Render the configured project types in search order
pub fn render_projects(config: &Config, format: OutputFormat, style: JsonStyle) -> String {
    if format == OutputFormat::Json {
        return to_json(&config.projects, style);
    }

    let mut out = format!("Supported Project Types ({} total):\n\n", config.projects.len());
    for (i, project) in config.projects.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, project.label());
        let _ = writeln!(out, "   File: {}", project.file);
        let _ = writeln!(out, "   Priority: {}", project.priority);
        if let Some(notes) = &project.notes {
            let _ = writeln!(out, "   Notes: {notes}");
        }
        let _ = writeln!(out, "   Regex patterns: {}", project.regex.len());
        let _ = writeln!(out, "   Sample repositories: {}\n", project.samples.len());
    }

    out
}
