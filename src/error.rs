// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::PathBuf;

use thiserror::Error;

/// A header that cannot be turned into a frequency schema. Fatal for the file.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("header has no 'timestamp' column")]
    MissingTimestamp,
    #[error("column '{column}' is not of the form <integer>{unit}")]
    InvalidFrequencyColumn { column: String, unit: String },
    #[error("frequency {frequency} appears in more than one column")]
    DuplicateFrequency { frequency: i64 },
    #[error("failed to read header: {0}")]
    Csv(#[from] csv::Error),
}

/// A timestamp or time-of-day string with the wrong layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("'{value}' is shorter than {expected} characters")]
    TooShort { value: String, expected: usize },
    #[error("'{value}' has no character boundary around bytes {range:?}")]
    Misaligned {
        value: String,
        range: std::ops::Range<usize>,
    },
    #[error("'{value}' is not a valid HH:MM time of day")]
    InvalidTimeOfDay { value: String },
}

#[derive(Debug, Error)]
pub enum RowErrorKind {
    #[error("bad timestamp: {0}")]
    Timestamp(#[from] FormatError),
    #[error("column '{column}': '{value}' is not a number")]
    Cell { column: String, value: String },
    #[error("{0}")]
    Record(#[from] csv::Error),
}

/// A data row that was skipped. Never aborts ingestion.
#[derive(Debug, Error)]
#[error("line {line}: {kind}")]
pub struct RowParseError {
    pub line: u64,
    pub kind: RowErrorKind,
}

/// Errors that abort ingestion of a single file.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to open {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("inconsistent sample matrix: {0}")]
    Shape(#[from] ndarray::ShapeError),
}
