//! Tabular input data.
//!
//! A [`Dataset`] is the read-only input to a run: a row-major feature
//! matrix, the target vector, and per-row sample weights (all ones unless
//! supplied). It can be built in memory or read from a delimited text file
//! with a header row, where one named column is the target and every other
//! column is a feature.

use crate::error::{Result, SrError};
use log::info;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Feature matrix, target and weights for one regression problem.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: Vec<f64>,
    n_features: usize,
    target: Vec<f64>,
    weights: Vec<f64>,
    feature_names: Vec<String>,
    target_name: String,
}

impl Dataset {
    /// Builds a dataset from feature rows and a target vector.
    ///
    /// Feature columns are named `X0`, `X1`, ... and the target `y`.
    /// Every value must be finite.
    pub fn new(rows: Vec<Vec<f64>>, target: Vec<f64>) -> Result<Self> {
        if rows.is_empty() {
            return Err(SrError::EmptyDataset);
        }
        if rows.len() != target.len() {
            return Err(SrError::DimensionMismatch {
                what: "target",
                expected: rows.len(),
                found: target.len(),
            });
        }
        let n_features = rows[0].len();
        let mut features = Vec::with_capacity(rows.len() * n_features);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n_features {
                return Err(SrError::RaggedRow {
                    row: i + 1,
                    expected: n_features,
                    found: row.len(),
                });
            }
            if let Some(col) = row.iter().position(|v| !v.is_finite()) {
                return Err(SrError::NonNumeric {
                    row: i + 1,
                    column: format!("X{col}"),
                    value: row[col].to_string(),
                });
            }
            features.extend(row);
        }
        if let Some(i) = target.iter().position(|v| !v.is_finite()) {
            return Err(SrError::NonNumeric {
                row: i + 1,
                column: "y".to_string(),
                value: target[i].to_string(),
            });
        }
        let weights = vec![1.0; target.len()];
        Ok(Self {
            features,
            n_features,
            target,
            weights,
            feature_names: (0..n_features).map(|i| format!("X{i}")).collect(),
            target_name: "y".to_string(),
        })
    }

    /// Replaces the uniform weights.
    pub fn with_weights(mut self, weights: Vec<f64>) -> Result<Self> {
        if weights.len() != self.target.len() {
            return Err(SrError::DimensionMismatch {
                what: "sample_weight",
                expected: self.target.len(),
                found: weights.len(),
            });
        }
        let valid = weights.iter().all(|w| w.is_finite() && *w >= 0.0);
        if !valid || weights.iter().sum::<f64>() <= 0.0 {
            return Err(SrError::InvalidWeights);
        }
        self.weights = weights;
        Ok(self)
    }

    /// Replaces the feature column names.
    pub fn with_feature_names(mut self, names: Vec<String>) -> Result<Self> {
        if names.len() != self.n_features {
            return Err(SrError::DimensionMismatch {
                what: "feature_names",
                expected: self.n_features,
                found: names.len(),
            });
        }
        self.feature_names = names;
        Ok(self)
    }

    /// Reads a comma-separated file with a header row.
    pub fn from_csv_path<P: AsRef<Path>>(path: P, target_column: &str) -> Result<Self> {
        let path = path.as_ref();
        info!("Reading data from \"{}\"...", path.display());
        let file = File::open(path)?;
        Self::from_csv_reader(BufReader::new(file), target_column)
    }

    /// Reads comma-separated text with a header row.
    ///
    /// Blank lines are skipped; surrounding whitespace and double quotes
    /// are stripped from every cell. `NaN` and infinities are rejected
    /// like any other non-numeric cell.
    pub fn from_csv_reader<R: BufRead>(reader: R, target_column: &str) -> Result<Self> {
        let mut lines = reader.lines();
        let header = loop {
            match lines.next() {
                Some(line) => {
                    let line = line?;
                    if !line.trim().is_empty() {
                        break split_cells(&line);
                    }
                }
                None => return Err(SrError::EmptyDataset),
            }
        };
        let target_idx = header
            .iter()
            .position(|name| name == target_column)
            .ok_or_else(|| SrError::MissingTargetColumn(target_column.to_string()))?;

        let mut rows = Vec::new();
        let mut target = Vec::new();
        let mut row_no = 0;
        for line in lines {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            row_no += 1;
            let cells = split_cells(&line);
            if cells.len() != header.len() {
                return Err(SrError::RaggedRow {
                    row: row_no,
                    expected: header.len(),
                    found: cells.len(),
                });
            }
            let mut row = Vec::with_capacity(header.len() - 1);
            for (col, cell) in cells.iter().enumerate() {
                let value = cell
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| SrError::NonNumeric {
                        row: row_no,
                        column: header[col].clone(),
                        value: cell.clone(),
                    })?;
                if col == target_idx {
                    target.push(value);
                } else {
                    row.push(value);
                }
            }
            rows.push(row);
        }

        let feature_names: Vec<String> = header
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != target_idx)
            .map(|(_, name)| name.clone())
            .collect();

        let mut dataset = Self::new(rows, target)?.with_feature_names(feature_names)?;
        dataset.target_name = target_column.to_string();
        info!(
            "Target variable \"{}\", {} samples; {} feature columns {:?}",
            dataset.target_name,
            dataset.n_samples(),
            dataset.n_features,
            dataset.feature_names
        );
        Ok(dataset)
    }

    /// Number of rows.
    pub fn n_samples(&self) -> usize {
        self.target.len()
    }

    /// Number of feature columns.
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Feature row `i`.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.features[i * self.n_features..(i + 1) * self.n_features]
    }

    /// Iterates feature rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.n_samples()).map(move |i| self.row(i))
    }

    /// Target values.
    pub fn target(&self) -> &[f64] {
        &self.target
    }

    /// Sample weights.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Feature column names.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Target column name.
    pub fn target_name(&self) -> &str {
        &self.target_name
    }
}

fn split_cells(line: &str) -> Vec<String> {
    line.split(',')
        .map(|cell| cell.trim().trim_matches('"').trim().to_string())
        .collect()
}
