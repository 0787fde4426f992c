//! `render` command
//!
//! Transforms markdown files, replacing map directives with placeholders.
//! A single input without `--out-dir` goes to stdout; otherwise each input
//! is written to `<out-dir>/<stem>.<ext>`.

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::cli::args::{DocumentFormat, RenderArgs};
use crate::cli::commands::load_config;
use crate::error::EmbedError;
use crate::observability::init_metrics;
use crate::transform::{TransformOptions, Transformer, render_html};

/// Run the `render` command.
///
/// # Errors
///
/// Returns a usage error when several inputs are given without
/// `--out-dir` or two inputs map to the same output file, a config or I/O
/// error from loading and writing, and `StrictFailure` under `--strict`
/// when a file has unparseable directives. Under `--strict` the failing
/// file is not written.
pub fn run(args: &RenderArgs) -> Result<(), EmbedError> {
    if args.files.len() > 1 && args.out_dir.is_none() {
        return Err(EmbedError::Usage(
            "--out-dir is required when rendering more than one file".to_string(),
        ));
    }

    let metrics = if args.metrics {
        Some(init_metrics()?)
    } else {
        None
    };

    let config = load_config(args.config.as_deref())?;
    let transformer = Transformer::new(TransformOptions::from(&config));

    let targets = match &args.out_dir {
        Some(dir) => Some(output_paths(&args.files, dir, args.format)?),
        None => None,
    };

    let mut rendered = 0usize;
    for (index, path) in args.files.iter().enumerate() {
        let source = std::fs::read_to_string(path)?;
        let result = transformer.transform(&source);

        let failed = result.failures();
        if failed > 0 {
            if args.strict {
                return Err(EmbedError::StrictFailure {
                    path: path.clone(),
                    failed,
                });
            }
            tracing::warn!(file = %path.display(), failed, "left unparseable map directives in place");
        }

        let document = match args.format {
            DocumentFormat::Markdown => result.output,
            DocumentFormat::Html => render_html(&result.output),
        };

        match targets.as_ref().and_then(|t| t.get(index)) {
            Some(target) => {
                if let Some(parent) = target.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(target, document)?;
                tracing::info!(
                    file = %path.display(),
                    out = %target.display(),
                    blocks = result.blocks.len(),
                    "rendered"
                );
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(document.as_bytes())?;
                stdout.flush()?;
            }
        }
        rendered += result.blocks.len();
    }

    tracing::info!(files = args.files.len(), blocks = rendered, "render complete");

    if let Some(handle) = metrics {
        eprint!("{}", handle.render());
    }

    Ok(())
}

/// Computes `<dir>/<stem>.<ext>` for each input, rejecting collisions.
fn output_paths(
    files: &[PathBuf],
    dir: &Path,
    format: DocumentFormat,
) -> Result<Vec<PathBuf>, EmbedError> {
    let mut seen = HashSet::new();
    files
        .iter()
        .map(|file| {
            let stem = file.file_stem().ok_or_else(|| {
                EmbedError::Usage(format!("{} has no file name", file.display()))
            })?;
            let target = dir.join(stem).with_extension(format.extension());
            if !seen.insert(target.clone()) {
                return Err(EmbedError::Usage(format!(
                    "more than one input would be written to {}",
                    target.display()
                )));
            }
            Ok(target)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_paths_use_format_extension() {
        let files = vec![PathBuf::from("notes/world.md"), PathBuf::from("city.markdown")];
        let paths = output_paths(&files, Path::new("out"), DocumentFormat::Html).unwrap();
        assert_eq!(
            paths,
            vec![PathBuf::from("out/world.html"), PathBuf::from("out/city.html")]
        );
    }

    #[test]
    fn test_output_paths_reject_collisions() {
        let files = vec![PathBuf::from("a/map.md"), PathBuf::from("b/map.md")];
        let err = output_paths(&files, Path::new("out"), DocumentFormat::Markdown).unwrap_err();
        assert!(matches!(err, EmbedError::Usage(_)));
    }

    #[test]
    fn test_multiple_files_need_out_dir() {
        let args = RenderArgs {
            files: vec![PathBuf::from("a.md"), PathBuf::from("b.md")],
            out_dir: None,
            format: DocumentFormat::Markdown,
            config: None,
            strict: false,
            metrics: false,
        };
        let err = run(&args).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::ExitCode::USAGE_ERROR);
    }
}
