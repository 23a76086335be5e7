// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::{
    ingest::{IngestParams, IngestReport, ingest_file},
    render::{Heatmap, HeatmapSink, RenderParams, render},
};

#[derive(Debug)]
pub struct FileOutcome {
    pub report: IngestReport,
    /// `None` if no samples were accepted
    pub output: Option<PathBuf>,
}

/// Ingests one file and hands the result to `sink`.
pub fn process_file<S: HeatmapSink + ?Sized>(
    path: &Path,
    ingest: &IngestParams,
    params: &RenderParams,
    sink: &mut S,
) -> Result<FileOutcome> {
    let ingested = ingest_file(path, ingest)
        .with_context(|| format!("Failed to ingest {}", path.display()))?;
    let output = render(sink, &Heatmap::from(&ingested), params, path)?;
    Ok(FileOutcome {
        report: ingested.report,
        output,
    })
}

/// Processes `files` in order. A failing file is logged and does not stop the batch.
pub fn process_files<S: HeatmapSink + ?Sized>(
    files: &[PathBuf],
    ingest: &IngestParams,
    params: &RenderParams,
    sink: &mut S,
) -> Vec<(PathBuf, Result<FileOutcome>)> {
    files
        .iter()
        .map(|path| {
            let outcome = process_file(path, ingest, params, sink);
            if let Err(err) = &outcome {
                log::error!("{err:#}");
            }
            (path.clone(), outcome)
        })
        .collect()
}
