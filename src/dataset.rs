//! Loading labeled datasets from delimited text.
//!
//! Malformed rows are skipped with a warning; the learners only ever see
//! well-formed points of uniform dimensionality.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::common_types::{validate_dataset, DataPoint};
use crate::error::{MlError, Result};

/// Reads rows of `delimiter`-separated numeric features plus one label column.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DelimitedLoader {
    pub delimiter: char,
    /// Zero-based column holding the label; `None` means the last column.
    pub label_column: Option<usize>,
    /// Skip the first non-empty line.
    pub has_header: bool,
}

impl Default for DelimitedLoader {
    fn default() -> Self {
        DelimitedLoader {
            delimiter: ',',
            label_column: None,
            has_header: true,
        }
    }
}

impl DelimitedLoader {
    /// CSV-like table with a header row, e.g. the wine-quality or breast-cancer tables.
    pub fn knn_csv(delimiter: char, label_column: usize) -> Self {
        DelimitedLoader {
            delimiter,
            label_column: Some(label_column),
            has_header: true,
        }
    }

    /// Header-less `x;y;label` rows used by the clustering and perceptron datasets.
    pub fn points_semicolon() -> Self {
        DelimitedLoader {
            delimiter: ';',
            label_column: Some(2),
            has_header: false,
        }
    }

    fn parse_row<L: FromStr>(&self, line: &str) -> std::result::Result<DataPoint<f64, L>, String> {
        let columns: Vec<&str> = line
            .split(self.delimiter)
            .map(|c| c.trim().trim_matches('"'))
            .collect();
        let label_index = self.label_column.unwrap_or(columns.len().saturating_sub(1));
        if label_index >= columns.len() {
            return Err(format!("label column {} missing", label_index));
        }
        let label = columns[label_index]
            .parse::<L>()
            .map_err(|_| format!("bad label {:?}", columns[label_index]))?;

        let mut features = Vec::with_capacity(columns.len() - 1);
        for (index, column) in columns.iter().enumerate() {
            if index == label_index {
                continue;
            }
            let value = column
                .parse::<f64>()
                .map_err(|_| format!("bad number {:?} in column {}", column, index))?;
            features.push(value);
        }
        Ok(DataPoint::new(features, label))
    }

    /// Parses `text`, skipping (and logging) rows that cannot be converted.
    ///
    /// Rows whose feature count differs from the first accepted row are skipped too.
    /// Fails with [`MlError::Parse`] only when there were data rows but none survived.
    pub fn parse<L: FromStr>(&self, text: &str) -> Result<Vec<DataPoint<f64, L>>> {
        let mut lines = text.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());
        if self.has_header {
            lines.next();
        }

        let mut dataset: Vec<DataPoint<f64, L>> = Vec::new();
        let mut rows = 0usize;
        for (line_number, line) in lines {
            rows += 1;
            match self.parse_row::<L>(line) {
                Ok(point) => {
                    if let Some(first) = dataset.first() {
                        if first.dimensions() != point.dimensions() {
                            warn!(
                                line = line_number + 1,
                                expected = first.dimensions(),
                                actual = point.dimensions(),
                                "skipping row with wrong feature count"
                            );
                            continue;
                        }
                    }
                    dataset.push(point);
                }
                Err(reason) => warn!(line = line_number + 1, %reason, "skipping malformed row"),
            }
        }

        if rows > 0 && dataset.is_empty() {
            return Err(MlError::Parse(format!("none of the {} data rows could be parsed", rows)));
        }
        validate_dataset(&dataset)?;
        debug!(rows, kept = dataset.len(), "dataset parsed");
        Ok(dataset)
    }

    pub fn load_file<L: FromStr, P: AsRef<Path>>(&self, path: P) -> Result<Vec<DataPoint<f64, L>>> {
        let text = fs::read_to_string(path.as_ref())?;
        debug!(path = %path.as_ref().display(), bytes = text.len(), "dataset file read");
        self.parse(&text)
    }
}
