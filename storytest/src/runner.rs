//! File processing.
//!
//! Every input file is handled by its own task:
//! - read the story module
//! - transform it (or dump its parsed model)
//! - write the result to its destination
//!
//! Failures are collected per file and reported together at the end.

use crate::cli::Cli;
use anyhow::{bail, Context, Result};
use csf::{CsfParser, StoryParser};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use storytest_core::{transform_csf, TransformOptions};
use tokio::fs;
use tokio::task::JoinSet;

/// What to produce for each file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Transform,
    DumpModel,
}

/// Where results go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    /// Next to the input file.
    Sibling,
    Directory(PathBuf),
}

impl Destination {
    pub fn for_cli(cli: &Cli) -> Self {
        match (&cli.out_dir, cli.files.len()) {
            (Some(dir), _) => Destination::Directory(dir.clone()),
            (None, 1) => Destination::Stdout,
            (None, _) => Destination::Sibling,
        }
    }

    /// Output file for `input`, or `None` for stdout.
    pub fn path_for(&self, input: &Path, mode: Mode) -> Option<PathBuf> {
        let dir = match self {
            Destination::Stdout => return None,
            Destination::Sibling => input.parent().map(Path::to_path_buf).unwrap_or_default(),
            Destination::Directory(dir) => dir.clone(),
        };
        Some(dir.join(output_file_name(input, mode)))
    }
}

/// `Button.stories.tsx` becomes `Button.stories.test.tsx` (or `.json` for models).
pub fn output_file_name(input: &Path, mode: Mode) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "stories".to_string());
    match (mode, input.extension()) {
        (Mode::DumpModel, _) => format!("{stem}.model.json"),
        (Mode::Transform, Some(ext)) => format!("{stem}.test.{}", ext.to_string_lossy()),
        (Mode::Transform, None) => format!("{stem}.test.js"),
    }
}

/// Produce the output text for one file.
pub async fn process_file(path: &Path, options: &TransformOptions, mode: Mode) -> Result<String> {
    let source = fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;

    match mode {
        Mode::Transform => Ok(transform_csf(&source, options)?),
        Mode::DumpModel => {
            let module = CsfParser.parse(&source, &|title| options.make_title(title))?;
            Ok(serde_json::to_string_pretty(&module)?)
        }
    }
}

async fn process_and_write(
    path: PathBuf,
    options: Arc<TransformOptions>,
    mode: Mode,
    destination: Destination,
) -> Result<Option<String>> {
    let output = process_file(&path, &options, mode).await?;
    match destination.path_for(&path, mode) {
        None => Ok(Some(output)),
        Some(target) => {
            if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).await?;
            }
            fs::write(&target, output)
                .await
                .with_context(|| format!("failed to write {}", target.display()))?;
            tracing::info!(input = %path.display(), output = %target.display(), "wrote file");
            Ok(None)
        }
    }
}

/// Run the command line: process every file concurrently.
pub async fn run(cli: Cli) -> Result<()> {
    let options = Arc::new(cli.transform_config().await?.into_options()?);
    let mode = if cli.dump_model {
        Mode::DumpModel
    } else {
        Mode::Transform
    };
    let destination = Destination::for_cli(&cli);
    tracing::debug!(files = cli.files.len(), ?mode, ?destination, "processing story files");

    let mut tasks = JoinSet::new();
    for (index, path) in cli.files.iter().cloned().enumerate() {
        let options = Arc::clone(&options);
        let destination = destination.clone();
        tasks.spawn(async move {
            let result = process_and_write(path.clone(), options, mode, destination).await;
            (index, path, result)
        });
    }

    let mut results = Vec::with_capacity(cli.files.len());
    while let Some(joined) = tasks.join_next().await {
        results.push(joined?);
    }
    results.sort_by_key(|(index, _, _)| *index);

    let mut failures = 0;
    for (_, path, result) in results {
        match result {
            Ok(Some(output)) => println!("{output}"),
            Ok(None) => {}
            Err(e) => {
                failures += 1;
                tracing::error!(path = %path.display(), "transform failed: {e:#}");
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} files failed", cli.files.len());
    }
    Ok(())
}
