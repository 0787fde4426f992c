//! `check` command
//!
//! Reports what `render` would do with each map directive, without
//! writing anything.

use std::path::PathBuf;

use serde::Serialize;

use crate::cli::args::{CheckArgs, OutputFormat};
use crate::cli::commands::load_config;
use crate::error::EmbedError;
use crate::transform::{BlockOutcome, BlockReport, TransformOptions, Transformer};

#[derive(Debug, Serialize)]
struct FileReport {
    path: PathBuf,
    blocks: Vec<BlockReport>,
}

#[derive(Debug, Default, Serialize)]
struct Summary {
    files: usize,
    rendered: usize,
    missing_image: usize,
    parse_failed: usize,
}

impl Summary {
    fn add(&mut self, outcome: &BlockOutcome) {
        match outcome {
            BlockOutcome::Rendered { .. } => self.rendered += 1,
            BlockOutcome::MissingImage { .. } => self.missing_image += 1,
            BlockOutcome::ParseFailed { .. } => self.parse_failed += 1,
        }
    }
}

/// Run the `check` command.
///
/// # Errors
///
/// Returns a config or I/O error, or `StrictFailure` naming the first file
/// with unparseable directives once the full report is printed.
pub fn run(args: &CheckArgs) -> Result<(), EmbedError> {
    let config = load_config(args.config.as_deref())?;
    let transformer = Transformer::new(TransformOptions::from(&config));

    let mut reports = Vec::with_capacity(args.files.len());
    let mut summary = Summary::default();
    for path in &args.files {
        let source = std::fs::read_to_string(path)?;
        let blocks = transformer.transform(&source).blocks;
        for block in &blocks {
            summary.add(&block.outcome);
        }
        summary.files += 1;
        reports.push(FileReport {
            path: path.clone(),
            blocks,
        });
    }

    match args.format {
        OutputFormat::Human => print_human(&reports, &summary),
        OutputFormat::Json => {
            let out = serde_json::json!({ "files": reports, "summary": summary });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }

    let first_failure = reports.iter().find_map(|report| {
        let failed = report
            .blocks
            .iter()
            .filter(|b| matches!(b.outcome, BlockOutcome::ParseFailed { .. }))
            .count();
        (failed > 0).then(|| (report.path.clone(), failed))
    });
    if let Some((path, failed)) = first_failure {
        return Err(EmbedError::StrictFailure { path, failed });
    }

    Ok(())
}

fn print_human(reports: &[FileReport], summary: &Summary) {
    for report in reports {
        for block in &report.blocks {
            let detail = match &block.outcome {
                BlockOutcome::Rendered { id } => format!("map #{id}"),
                BlockOutcome::MissingImage { id } => format!("map #{id} has no image"),
                BlockOutcome::ParseFailed { message } => message.clone(),
            };
            println!(
                "{}:{}: {}: {detail}",
                report.path.display(),
                block.line,
                block.outcome.label()
            );
        }
    }
    println!(
        "{} file(s): {} rendered, {} missing image, {} failed",
        summary.files, summary.rendered, summary.missing_image, summary.parse_failed
    );
}
