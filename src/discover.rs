// SPDX-License-Identifier: GPL-3.0-or-later

use std::{
    path::{Path, PathBuf},
    time::SystemTime,
};

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Local, NaiveDate, TimeZone};

/// Parses a `YYYY-MM-DD` modification-date cutoff.
pub fn parse_cutoff(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").with_context(|| format!("Invalid date: {date}"))
}

/// Local midnight at the start of `date`.
pub fn cutoff_time(date: NaiveDate) -> Result<SystemTime> {
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow!("Invalid date: {date}"))?;
    let local = Local
        .from_local_datetime(&midnight)
        .earliest()
        .ok_or_else(|| anyhow!("{date} has no local midnight"))?;
    Ok(local.into())
}

/// Returns all `.csv` files (any case) below `dir` modified at or after `newer`, sorted.
pub fn csv_files(dir: &Path, newer: NaiveDate) -> Result<Vec<PathBuf>> {
    let cutoff = cutoff_time(newer)?;
    let dir_str = dir
        .to_str()
        .ok_or_else(|| anyhow!("Non-UTF-8 directory: {}", dir.display()))?;
    let pattern = format!("{}/**/*", glob::Pattern::escape(dir_str));

    let mut files = Vec::new();
    for entry in glob::glob(&pattern).context("Invalid directory pattern")? {
        let path = match entry {
            Ok(path) => path,
            Err(err) => {
                log::warn!("Skipping unreadable path: {err}");
                continue;
            }
        };
        if !has_csv_extension(&path) || !path.is_file() {
            continue;
        }
        let modified = path
            .metadata()
            .and_then(|m| m.modified())
            .with_context(|| format!("Failed to read modification time of {}", path.display()))?;
        if modified >= cutoff {
            files.push(path);
        } else {
            log::debug!(
                "Skipping {} modified {}",
                path.display(),
                DateTime::<Local>::from(modified).format("%Y-%m-%d %H:%M")
            );
        }
    }
    files.sort();
    Ok(files)
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}
