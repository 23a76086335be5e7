// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::Context;
use clap::{ArgGroup, Parser};
use specmap::{
    batch::process_files,
    discover,
    ingest::IngestParams,
    render::{MatrixTableSink, RenderParams},
    timestamp::TimeWindow,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("input").required(true).args(["file", "dir"])))]
struct Args {
    /// CSV file with dB values
    #[arg(short, long, value_name = "FILE")]
    file: Option<PathBuf>,
    /// Process all CSV files in this directory and its subdirectories
    #[arg(short, long, value_name = "DIR")]
    dir: Option<PathBuf>,
    /// Output directory, defaults to the directory of each input file
    #[arg(short, long, value_name = "DIR")]
    odir: Option<PathBuf>,
    /// Start of the time-of-day window
    #[arg(short = 'a', long, default_value = "00:00")]
    mintime: String,
    /// End of the time-of-day window
    #[arg(short = 'b', long, default_value = "24:00")]
    maxtime: String,
    /// Minimal frequency in Hz
    #[arg(short = 'A', long, default_value = "0", allow_negative_numbers = true)]
    minfreq: i64,
    /// Maximal frequency in Hz
    #[arg(short = 'B', long, default_value = "1000", allow_negative_numbers = true)]
    maxfreq: i64,
    /// Distance between frequency labels in Hz
    #[arg(short = 'D', long, default_value = "10")]
    freqdist: i64,
    /// Downscale factor, 0..1
    #[arg(short = 's', long, default_value = "1")]
    downscale: f32,
    /// Fixed dB offset, replaces noise-floor normalization
    #[arg(short = 'O', long, allow_negative_numbers = true)]
    dboffset: Option<f64>,
    /// Legend text
    #[arg(short = 'l', long, default_value = "")]
    legendtext: String,
    /// Scale factor (for unit changes)
    #[arg(short = 'S', long, default_value = "1.0", allow_negative_numbers = true)]
    scale: f64,
    /// Only process files modified on or after this date (YYYY-MM-DD)
    #[arg(short = 'n', long, default_value = "1970-01-01")]
    newer: String,
    /// Unit suffix of the frequency columns
    #[arg(short = 'u', long, default_value = "Hz")]
    unit: String,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();

    let window = TimeWindow::parse(&args.mintime, &args.maxtime).context("Invalid time window")?;
    let ingest = IngestParams {
        window,
        min_freq: args.minfreq,
        max_freq: args.maxfreq,
        db_offset: args.dboffset,
        scale: args.scale,
        unit: args.unit,
    };
    let render = RenderParams {
        freq_label_stride: args.freqdist,
        downscale: args.downscale,
        legend: args.legendtext,
        output_dir: args.odir,
    };

    let files = match (args.file, args.dir) {
        (_, Some(dir)) => {
            let newer = discover::parse_cutoff(&args.newer)?;
            discover::csv_files(&dir, newer)
                .with_context(|| format!("Failed to list {}", dir.display()))?
        }
        (Some(file), None) => vec![file],
        (None, None) => unreachable!("clap requires --file or --dir"),
    };
    log::info!("Processing {} file(s)", files.len());

    let results = process_files(&files, &ingest, &render, &mut MatrixTableSink);
    let failed = results.iter().filter(|(_, r)| r.is_err()).count();
    if failed > 0 {
        log::warn!("{failed} of {} file(s) failed", results.len());
    }

    Ok(())
}
