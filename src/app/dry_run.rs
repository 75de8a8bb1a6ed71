//! Dry-run flow: resolve every input and print the plan.
//!
//! Nothing is fetched beyond what resolution itself needs, nothing is written
//! and the output directory is not created.

use anyhow::Result;
use tracing::{error, info};
use yt_obsidian_core::{ContentReference, IdentifierResolver, PipelineOptions, ResolveError};

use crate::ProcessExit;
use crate::app::exit_handler;

pub(crate) async fn run_dry_run_preview(
    resolver: &IdentifierResolver,
    inputs: &[String],
    options: &PipelineOptions,
) -> Result<ProcessExit> {
    info!(inputs = inputs.len(), "Resolving inputs (dry run)");
    println!("{}", format_plan_header(options));

    let mut resolved_count = 0usize;
    let mut unresolved_count = 0usize;
    for (index, input) in inputs.iter().enumerate() {
        let result = resolver.resolve(input).await;
        println!("{}", format_plan_entry(index + 1, input, &result));
        match result {
            Ok(_) => resolved_count += 1,
            Err(error) if error.aborts_run() => {
                error!(%error, "Stopping dry run");
                return Ok(ProcessExit::Failure);
            }
            Err(_) => unresolved_count += 1,
        }
    }

    println!("Dry run summary: {resolved_count} resolved, {unresolved_count} unresolved.");
    println!("Dry run - no notes written");
    Ok(exit_handler::determine_exit_outcome(
        resolved_count,
        unresolved_count,
    ))
}

fn limit_label(value: usize) -> String {
    if value == 0 {
        "all".to_string()
    } else {
        value.to_string()
    }
}

pub(crate) fn format_plan_header(options: &PipelineOptions) -> String {
    format!(
        "Dry run plan\n  Output dir: {}\n  Overwrite: {}\n  Max depth: {}\n  Limit: {}",
        options.output_dir.display(),
        if options.overwrite { "yes" } else { "no" },
        limit_label(options.max_depth),
        limit_label(options.limit),
    )
}

pub(crate) fn format_plan_entry(
    index: usize,
    input: &str,
    result: &Result<ContentReference, ResolveError>,
) -> String {
    match result {
        Ok(reference) => {
            let mut entry = format!(
                "- [{index}] {input}\n    Type: {}\n    ID: {}",
                reference.kind(),
                reference.id()
            );
            if let Some(playlist) = reference.secondary_playlist() {
                entry.push_str(&format!("\n    Playlist: {playlist}"));
            }
            entry.push_str(&format!("\n    URL: {}", reference.canonical_url()));
            entry
        }
        Err(error) => format!(
            "- [{index}] {input}\n    Unresolved: {}",
            preview_single_line(&error.to_string())
        ),
    }
}

fn preview_single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_plan_header_labels_zero_as_all() {
        let options = PipelineOptions {
            output_dir: PathBuf::from("/vault"),
            overwrite: true,
            max_depth: 0,
            limit: 3,
        };
        let header = format_plan_header(&options);
        assert!(header.contains("Output dir: /vault"));
        assert!(header.contains("Overwrite: yes"));
        assert!(header.contains("Max depth: all"));
        assert!(header.contains("Limit: 3"));
    }

    #[test]
    fn test_plan_entry_with_secondary_playlist() {
        let reference = ContentReference::video("dQw4w9WgXcQ")
            .with_secondary_playlist(Some("PLabcdefghijkl".to_string()));
        let entry = format_plan_entry(1, "input", &Ok(reference));
        assert!(entry.contains("Type: video"), "{entry}");
        assert!(entry.contains("ID: dQw4w9WgXcQ"), "{entry}");
        assert!(entry.contains("Playlist: PLabcdefghijkl"), "{entry}");
        assert!(entry.contains("URL: https://www.youtube.com/watch?v=dQw4w9WgXcQ"), "{entry}");
    }

    #[test]
    fn test_plan_entry_unresolved_is_single_line() {
        let entry = format_plan_entry(2, "nope", &Err(ResolveError::unrecognized("nope")));
        let detail = entry.lines().nth(1).unwrap();
        assert!(detail.contains("Unresolved:"), "{entry}");
        assert!(detail.contains("Suggestion:"), "{entry}");
    }
}
