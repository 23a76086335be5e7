// SPDX-License-Identifier: GPL-3.0-or-later

use std::{fs::File, io::Read, path::Path};

use csv::{ReaderBuilder, StringRecord, Trim};
use ndarray::Array2;

use crate::{
    columns::{DEFAULT_UNIT, FrequencySchema},
    error::{IngestError, RowErrorKind, RowParseError},
    normalize::normalize,
    timestamp::{TimeOfDay, TimeWindow, shorten_timestamp},
    util::minmax,
};

#[derive(Debug, Clone, PartialEq)]
pub struct IngestParams {
    pub window: TimeWindow,
    pub min_freq: i64, // Hz
    pub max_freq: i64, // Hz
    /// Fixed dB offset. Without one the per-bin noise floor is subtracted instead.
    pub db_offset: Option<f64>,
    pub scale: f64,
    /// Unit suffix of the frequency columns
    pub unit: String,
}

impl Default for IngestParams {
    fn default() -> Self {
        Self {
            window: TimeWindow::default(),
            min_freq: 0,
            max_freq: 1000,
            db_offset: None,
            scale: 1.0,
            unit: DEFAULT_UNIT.to_string(),
        }
    }
}

/// First sample column of an hour of day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourMark {
    pub column: usize,
    /// `YYYY-MM-DD HH:MM`
    pub label: String,
}

#[derive(Debug, Default)]
pub struct IngestReport {
    /// Lines consumed, header included
    pub lines: u64,
    pub accepted: usize,
    /// Rows outside the time window
    pub filtered: usize,
    pub skipped: usize,
    pub errors: Vec<RowParseError>,
}

#[derive(Debug)]
pub struct Ingested {
    /// Ascending, one per matrix row
    pub frequencies: Vec<i64>,
    pub hours: Vec<HourMark>,
    /// frequency × sample
    pub matrix: Array2<f64>,
    pub report: IngestReport,
}

impl Ingested {
    pub fn samples(&self) -> usize {
        self.matrix.ncols()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    Accepted,
    OutsideWindow,
}

/// Ingests one CSV file. The file is closed before returning.
pub fn ingest_file(path: &Path, params: &IngestParams) -> Result<Ingested, IngestError> {
    log::info!("Processing file {}", path.display());
    let file = File::open(path).map_err(|source| IngestError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    ingest_reader(file, &path.display().to_string(), params)
}

/// Ingests a CSV stream. `name` is only used in diagnostics.
///
/// Rows that fail to parse are logged, recorded in the report and skipped.
pub fn ingest_reader<R: Read>(
    reader: R,
    name: &str,
    params: &IngestParams,
) -> Result<Ingested, IngestError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let header = reader
        .headers()
        .map_err(crate::error::SchemaError::from)?
        .clone();
    if header.is_empty() {
        log::info!("File {name} is empty");
        return Ok(Ingested {
            frequencies: Vec::new(),
            hours: Vec::new(),
            matrix: Array2::zeros((0, 0)),
            report: IngestReport::default(),
        });
    }
    let schema =
        FrequencySchema::from_header(header.iter(), &params.unit, params.min_freq, params.max_freq)?;
    log::debug!(
        "Parsed schema for {name}: {} of {} frequency columns retained",
        schema.len(),
        header.len() - 1
    );

    let mut builder = MatrixBuilder::new(&schema, params);
    let mut report = IngestReport {
        lines: 1,
        ..Default::default()
    };
    for (i, result) in reader.records().enumerate() {
        // header is line 1
        let fallback_line = i as u64 + 2;
        let line = match &result {
            Ok(record) => record.position().map(|p| p.line()),
            Err(err) => err.position().map(|p| p.line()),
        }
        .unwrap_or(fallback_line);
        report.lines = report.lines.max(line);

        let io_error = matches!(&result, Err(err) if err.is_io_error());
        match result
            .map_err(RowErrorKind::from)
            .and_then(|record| builder.push(&record))
        {
            Ok(RowOutcome::Accepted) => report.accepted += 1,
            Ok(RowOutcome::OutsideWindow) => report.filtered += 1,
            Err(kind) => {
                let err = RowParseError { line, kind };
                log::warn!("Error in file {name}, {err}");
                report.skipped += 1;
                report.errors.push(err);
            }
        }
        if io_error {
            break;
        }
    }
    log::info!("File {name} ends at line {}", report.lines);
    log::info!(
        "{name}: {} rows accepted, {} outside time window, {} skipped",
        report.accepted,
        report.filtered,
        report.skipped
    );

    let (frequencies, hours, matrix) = builder.finish()?;
    Ok(Ingested {
        frequencies,
        hours,
        matrix,
        report,
    })
}

/// Accumulates accepted rows of a single pass.
struct MatrixBuilder<'a> {
    schema: &'a FrequencySchema,
    params: &'a IngestParams,
    hours: Vec<HourMark>,
    current_hour: Option<u8>,
    /// sample-major
    values: Vec<f64>,
    samples: usize,
}

impl<'a> MatrixBuilder<'a> {
    fn new(schema: &'a FrequencySchema, params: &'a IngestParams) -> Self {
        Self {
            schema,
            params,
            hours: Vec::new(),
            current_hour: None,
            values: Vec::new(),
            samples: 0,
        }
    }

    fn push(&mut self, record: &StringRecord) -> Result<RowOutcome, RowErrorKind> {
        let timestamp = record.get(self.schema.timestamp_index).unwrap_or("");
        let time = TimeOfDay::of_timestamp(timestamp)?;
        if !self.params.window.contains(time) {
            return Ok(RowOutcome::OutsideWindow);
        }
        let label = shorten_timestamp(timestamp)?;

        let column = self
            .schema
            .bins
            .iter()
            .map(|bin| -> Result<f64, RowErrorKind> {
                let cell = record.get(bin.index).unwrap_or("");
                let value: f64 = cell.parse().map_err(|_| RowErrorKind::Cell {
                    column: bin.column.clone(),
                    value: cell.to_string(),
                })?;
                Ok(match self.params.db_offset {
                    Some(offset) => (value - offset) * self.params.scale,
                    None => value,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if self.current_hour != Some(time.hour) {
            self.current_hour = Some(time.hour);
            self.hours.push(HourMark {
                column: self.samples,
                label,
            });
        }
        self.values.extend(column);
        self.samples += 1;
        Ok(RowOutcome::Accepted)
    }

    fn finish(self) -> Result<(Vec<i64>, Vec<HourMark>, Array2<f64>), IngestError> {
        let by_sample = Array2::from_shape_vec((self.samples, self.schema.len()), self.values)?;
        let by_frequency = by_sample.reversed_axes();
        let (min, max) = minmax(by_frequency.view());
        log::debug!(
            "Collected {} samples of {} bins, min: {}, max: {}",
            self.samples,
            self.schema.len(),
            min,
            max
        );

        let matrix = match self.params.db_offset {
            Some(_) => by_frequency,
            None => normalize(by_frequency, self.params.scale),
        };
        Ok((
            self.schema.frequencies(),
            self.hours,
            matrix.as_standard_layout().into_owned(),
        ))
    }
}
