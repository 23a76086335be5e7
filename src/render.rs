// SPDX-License-Identifier: GPL-3.0-or-later

//! Hand-off of ingested matrices to output sinks.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ndarray::ArrayView2;

use crate::ingest::{HourMark, Ingested};

/// Presentation parameters forwarded to a sink.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderParams {
    /// Label every frequency divisible by this
    pub freq_label_stride: i64,
    pub downscale: f32,
    pub legend: String,
    /// Defaults to the directory of the input file
    pub output_dir: Option<PathBuf>,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            freq_label_stride: 10,
            downscale: 1.0,
            legend: String::new(),
            output_dir: None,
        }
    }
}

impl RenderParams {
    /// Only factors strictly between 0 and 1 shrink the output.
    pub fn downscale_factor(&self) -> Option<f32> {
        (self.downscale > 0.0 && self.downscale < 1.0).then_some(self.downscale)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Heatmap<'a> {
    pub frequencies: &'a [i64],
    pub hours: &'a [HourMark],
    /// frequency × sample
    pub matrix: ArrayView2<'a, f64>,
}

impl<'a> From<&'a Ingested> for Heatmap<'a> {
    fn from(ingested: &'a Ingested) -> Self {
        Self {
            frequencies: &ingested.frequencies,
            hours: &ingested.hours,
            matrix: ingested.matrix.view(),
        }
    }
}

impl Heatmap<'_> {
    /// `(row, frequency)` for every frequency that gets an axis label.
    pub fn frequency_ticks(&self, stride: i64) -> Vec<(usize, i64)> {
        if stride <= 0 {
            return Vec::new();
        }
        self.frequencies
            .iter()
            .enumerate()
            .filter(|&(_, f)| f.rem_euclid(stride) == 0)
            .map(|(i, &f)| (i, f))
            .collect()
    }

    /// Hour label of each sample column, `None` between hour changes.
    pub fn column_labels(&self) -> Vec<Option<&str>> {
        let mut labels = vec![None; self.matrix.ncols()];
        for mark in self.hours {
            if let Some(label) = labels.get_mut(mark.column) {
                *label = Some(mark.label.as_str());
            }
        }
        labels
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }
}

pub trait HeatmapSink {
    /// File extension of the produced output, without the leading dot.
    fn extension(&self) -> &str;

    fn write(&mut self, heatmap: &Heatmap, params: &RenderParams, destination: &Path)
    -> Result<()>;
}

/// `<output dir>/<input stem>.<extension>`
pub fn output_path(source: &Path, output_dir: Option<&Path>, extension: &str) -> PathBuf {
    let stem = source.file_stem().unwrap_or(source.as_os_str());
    let dir = match output_dir.or_else(|| source.parent()) {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut name = stem.to_os_string();
    name.push(".");
    name.push(extension);
    dir.join(name)
}

/// Writes `heatmap` next to `source`, or into the configured output directory.
///
/// Returns `None` without touching the sink when there is nothing to draw.
pub fn render<S: HeatmapSink + ?Sized>(
    sink: &mut S,
    heatmap: &Heatmap,
    params: &RenderParams,
    source: &Path,
) -> Result<Option<PathBuf>> {
    if heatmap.is_empty() {
        log::info!("No samples in {}, skipping output", source.display());
        return Ok(None);
    }
    let destination = output_path(source, params.output_dir.as_deref(), sink.extension());
    sink.write(heatmap, params, &destination)
        .with_context(|| format!("Failed to write {}", destination.display()))?;
    log::info!("Wrote {}", destination.display());
    Ok(Some(destination))
}

/// Tab-separated matrix export.
///
/// The first row holds the legend, a `label` column header and the hour label of each sample
/// column. Every further row holds a frequency, its axis label (empty unless the frequency is a
/// multiple of the label stride) and its values.
#[derive(Debug, Default)]
pub struct MatrixTableSink;

impl HeatmapSink for MatrixTableSink {
    fn extension(&self) -> &str {
        "heatmap.tsv"
    }

    fn write(
        &mut self,
        heatmap: &Heatmap,
        params: &RenderParams,
        destination: &Path,
    ) -> Result<()> {
        if params.downscale_factor().is_some() {
            log::warn!("Downscaling does not apply to matrix tables, ignoring");
        }
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_path(destination)?;

        let legend = if params.legend.is_empty() {
            "frequency [Hz]"
        } else {
            params.legend.as_str()
        };
        let header = [legend, "label"]
            .into_iter()
            .chain(heatmap.column_labels().into_iter().map(|l| l.unwrap_or("")));
        writer.write_record(header)?;

        let mut ticks = heatmap
            .frequency_ticks(params.freq_label_stride)
            .into_iter()
            .peekable();
        for (i, (frequency, row)) in heatmap
            .frequencies
            .iter()
            .zip(heatmap.matrix.outer_iter())
            .enumerate()
        {
            let label = match ticks.next_if(|&(r, _)| r == i) {
                Some((_, f)) => format!("{f} Hz"),
                None => String::new(),
            };
            let record = [frequency.to_string(), label]
                .into_iter()
                .chain(row.iter().map(|v| v.to_string()));
            writer.write_record(record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn output_next_to_source() {
        assert_eq!(
            output_path(Path::new("data/day1.csv"), None, "jpg"),
            PathBuf::from("data/day1.jpg")
        );
        assert_eq!(
            output_path(Path::new("day1.csv"), None, "jpg"),
            PathBuf::from("./day1.jpg")
        );
        assert_eq!(
            output_path(Path::new("data/day1.csv"), Some(Path::new("out")), "heatmap.tsv"),
            PathBuf::from("out/day1.heatmap.tsv")
        );
    }

    #[test]
    fn ticks_follow_stride() {
        let matrix = array![[0.0], [0.0], [0.0], [0.0]];
        let heatmap = Heatmap {
            frequencies: &[5, 10, 15, 20],
            hours: &[],
            matrix: matrix.view(),
        };
        assert_eq!(heatmap.frequency_ticks(10), vec![(1, 10), (3, 20)]);
        assert_eq!(heatmap.frequency_ticks(5).len(), 4);
        assert!(heatmap.frequency_ticks(0).is_empty());
    }

    #[test]
    fn labels_at_hour_marks() {
        let matrix = array![[0.0, 0.0, 0.0]];
        let hours = [
            HourMark {
                column: 0,
                label: "2020-01-01 10:00".into(),
            },
            HourMark {
                column: 2,
                label: "2020-01-01 11:00".into(),
            },
        ];
        let heatmap = Heatmap {
            frequencies: &[100],
            hours: &hours,
            matrix: matrix.view(),
        };
        assert_eq!(
            heatmap.column_labels(),
            vec![Some("2020-01-01 10:00"), None, Some("2020-01-01 11:00")]
        );
    }

    #[test]
    fn downscale_only_below_one() {
        let factor = |downscale| {
            RenderParams {
                downscale,
                ..Default::default()
            }
            .downscale_factor()
        };
        assert_eq!(factor(0.5), Some(0.5));
        assert_eq!(factor(1.0), None);
        assert_eq!(factor(0.0), None);
        assert_eq!(factor(1.5), None);
    }

    #[test]
    fn table_labels_frequencies_on_stride() {
        let matrix = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let hours = [HourMark {
            column: 0,
            label: "2020-01-01 10:00".into(),
        }];
        let heatmap = Heatmap {
            frequencies: &[10, 15, 20],
            hours: &hours,
            matrix: matrix.view(),
        };
        let params = RenderParams {
            freq_label_stride: 10,
            legend: "dB".into(),
            ..Default::default()
        };
        let destination = std::env::temp_dir()
            .join(format!("specmap-table-{}.heatmap.tsv", std::process::id()));
        MatrixTableSink
            .write(&heatmap, &params, &destination)
            .unwrap();
        let table = std::fs::read_to_string(&destination).unwrap();
        let _ = std::fs::remove_file(&destination);
        assert_eq!(
            table.lines().collect::<Vec<_>>(),
            vec![
                "dB\tlabel\t2020-01-01 10:00\t",
                "10\t10 Hz\t1\t2",
                "15\t\t3\t4",
                "20\t20 Hz\t5\t6",
            ]
        );
    }

    struct Recorder(usize);

    impl HeatmapSink for Recorder {
        fn extension(&self) -> &str {
            "png"
        }

        fn write(&mut self, _: &Heatmap, _: &RenderParams, _: &Path) -> Result<()> {
            self.0 += 1;
            Ok(())
        }
    }

    #[test]
    fn empty_heatmap_is_not_rendered() {
        let matrix = ndarray::Array2::<f64>::zeros((2, 0));
        let heatmap = Heatmap {
            frequencies: &[1, 2],
            hours: &[],
            matrix: matrix.view(),
        };
        let mut sink = Recorder(0);
        let out = render(&mut sink, &heatmap, &RenderParams::default(), Path::new("a.csv")).unwrap();
        assert!(out.is_none());
        assert_eq!(sink.0, 0);
    }
}
