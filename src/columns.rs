// SPDX-License-Identifier: GPL-3.0-or-later

use itertools::Itertools;
use regex::Regex;

use crate::error::SchemaError;

pub const TIMESTAMP_COLUMN: &str = "timestamp";
pub const DEFAULT_UNIT: &str = "Hz";

/// One retained frequency column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyBin {
    pub frequency: i64, // Hz
    /// Header name, used for diagnostics
    pub column: String,
    /// Position of the column in each record
    pub index: usize,
}

/// The frequency columns of one CSV file, ascending and restricted to a frequency range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencySchema {
    pub timestamp_index: usize,
    pub bins: Vec<FrequencyBin>,
}

impl FrequencySchema {
    /// Builds the schema from a header row.
    ///
    /// Every column except `timestamp` must be `<integer><unit>`, optionally with whitespace
    /// between number and unit. Columns outside `min_freq..=max_freq` are dropped.
    pub fn from_header<'a, I>(
        header: I,
        unit: &str,
        min_freq: i64,
        max_freq: i64,
    ) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let re = Regex::new(&format!(r"^\s*(-?\d+)\s*{}\s*$", regex::escape(unit)))
            .expect("escaped unit always forms a valid pattern");

        let mut timestamp_index = None;
        let mut bins = Vec::new();
        for (index, column) in header.into_iter().enumerate() {
            if column.trim() == TIMESTAMP_COLUMN {
                timestamp_index = Some(index);
                continue;
            }
            let frequency = re
                .captures(column)
                .and_then(|caps| caps[1].parse().ok())
                .ok_or_else(|| SchemaError::InvalidFrequencyColumn {
                    column: column.to_string(),
                    unit: unit.to_string(),
                })?;
            bins.push(FrequencyBin {
                frequency,
                column: column.to_string(),
                index,
            });
        }
        let timestamp_index = timestamp_index.ok_or(SchemaError::MissingTimestamp)?;

        bins.sort_by_key(|bin| bin.frequency);
        if let Some((dup, _)) = bins
            .iter()
            .tuple_windows()
            .find(|(a, b)| a.frequency == b.frequency)
        {
            return Err(SchemaError::DuplicateFrequency {
                frequency: dup.frequency,
            });
        }
        bins.retain(|bin| (min_freq..=max_freq).contains(&bin.frequency));

        Ok(Self {
            timestamp_index,
            bins,
        })
    }

    pub fn frequencies(&self) -> Vec<i64> {
        self.bins.iter().map(|bin| bin.frequency).collect()
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(header: &str, min: i64, max: i64) -> Result<FrequencySchema, SchemaError> {
        FrequencySchema::from_header(header.split(','), DEFAULT_UNIT, min, max)
    }

    #[test]
    fn filters_by_range() {
        let schema = schema("timestamp,100Hz,200Hz,300Hz", 150, 1000).unwrap();
        assert_eq!(schema.frequencies(), vec![200, 300]);
        assert_eq!(schema.timestamp_index, 0);
        assert_eq!(schema.bins[0].index, 2);
        assert_eq!(schema.bins[1].column, "300Hz");
    }

    #[test]
    fn range_is_inclusive() {
        let schema = schema("timestamp,100Hz,200Hz,300Hz", 100, 300).unwrap();
        assert_eq!(schema.frequencies(), vec![100, 200, 300]);
    }

    #[test]
    fn sorts_numerically() {
        let schema = schema("20 Hz,timestamp,100 Hz,3 Hz,1000 Hz", 0, 10_000).unwrap();
        assert_eq!(schema.frequencies(), vec![3, 20, 100, 1000]);
        assert_eq!(schema.timestamp_index, 1);
        let indices: Vec<_> = schema.bins.iter().map(|b| b.index).collect();
        assert_eq!(indices, vec![3, 0, 2, 4]);
    }

    #[test]
    fn output_is_sorted_subset_within_range() {
        let input = [870, 10, 450, 5, 999, 120, 640, 333];
        let header = std::iter::once("timestamp".to_string())
            .chain(input.iter().map(|f| format!("{f} Hz")))
            .join(",");
        for (min, max) in [(0, 1000), (100, 500), (451, 452), (900, 100)] {
            let out = schema(&header, min, max).unwrap().frequencies();
            assert!(out.windows(2).all(|w| w[0] < w[1]));
            assert!(out.iter().all(|f| input.contains(f)));
            assert!(out.iter().all(|f| (min..=max).contains(f)));
            let expected = input.iter().filter(|f| (min..=max).contains(*f)).count();
            assert_eq!(out.len(), expected);
        }
    }

    #[test]
    fn requires_timestamp_column() {
        assert!(matches!(
            schema("time,100Hz", 0, 1000),
            Err(SchemaError::InvalidFrequencyColumn { .. })
        ));
        assert!(matches!(
            schema("100Hz,200Hz", 0, 1000),
            Err(SchemaError::MissingTimestamp)
        ));
    }

    #[test]
    fn rejects_bad_frequency_columns() {
        for header in ["timestamp,100kHz", "timestamp,Hz", "timestamp,1.5Hz", "timestamp,abc"] {
            assert!(
                matches!(
                    schema(header, 0, 1000),
                    Err(SchemaError::InvalidFrequencyColumn { .. })
                ),
                "{header}"
            );
        }
    }

    #[test]
    fn rejects_duplicate_frequencies() {
        assert!(matches!(
            schema("timestamp,100Hz,100 Hz", 0, 1000),
            Err(SchemaError::DuplicateFrequency { frequency: 100 })
        ));
    }

    #[test]
    fn custom_unit() {
        let schema =
            FrequencySchema::from_header("timestamp,5 mHz,7 mHz".split(','), "mHz", 0, 10).unwrap();
        assert_eq!(schema.frequencies(), vec![5, 7]);
    }
}
