use std::collections::HashMap;

use ndarray::{Array1, Array2, ArrayView1, Axis};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatasetError {
    #[error("duplicate item column '{0}'")]
    DuplicateColumn(String),
    #[error("row {row} has {found} values, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("unknown item column '{0}'")]
    UnknownColumn(String),
}

/// Response matrix: one row per respondent, one column per item code.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    codes: Vec<String>,
    index: HashMap<String, usize>,
    values: Array2<f64>,
}

impl Dataset {
    pub fn from_rows(codes: Vec<String>, rows: &[Vec<f64>]) -> Result<Self, DatasetError> {
        let index = build_index(&codes)?;
        let n_items = codes.len();
        let mut values = Array2::<f64>::zeros((rows.len(), n_items));
        for (r, row) in rows.iter().enumerate() {
            if row.len() != n_items {
                return Err(DatasetError::RaggedRow {
                    row: r,
                    found: row.len(),
                    expected: n_items,
                });
            }
            for (c, &v) in row.iter().enumerate() {
                values[[r, c]] = v;
            }
        }
        Ok(Self {
            codes,
            index,
            values,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_items(&self) -> usize {
        self.codes.len()
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    pub fn column_index(&self, code: &str) -> Option<usize> {
        self.index.get(code).copied()
    }

    pub fn column(&self, code: &str) -> Option<ArrayView1<'_, f64>> {
        self.column_index(code)
            .map(|idx| self.values.column(idx))
    }

    /// Copies the named columns, in the given order, into a new matrix.
    pub fn select(&self, codes: &[String]) -> Result<Array2<f64>, DatasetError> {
        let mut idx = Vec::with_capacity(codes.len());
        for code in codes {
            idx.push(
                self.column_index(code)
                    .ok_or_else(|| DatasetError::UnknownColumn(code.clone()))?,
            );
        }
        Ok(self.values.select(Axis(1), &idx))
    }

    /// Per-row sum over the named columns.
    pub fn row_sums(&self, codes: &[String]) -> Result<Array1<f64>, DatasetError> {
        let block = self.select(codes)?;
        Ok(block.sum_axis(Axis(1)))
    }
}

#[cfg(test)]
impl Dataset {
    /// One vector per item code, all of the same length.
    pub fn from_columns(codes: Vec<String>, columns: &[Vec<f64>]) -> Result<Self, DatasetError> {
        assert_eq!(columns.len(), codes.len(), "one column per item code");
        let n_rows = columns.first().map_or(0, |c| c.len());
        let rows = (0..n_rows)
            .map(|r| columns.iter().map(|c| c[r]).collect())
            .collect::<Vec<Vec<f64>>>();
        Self::from_rows(codes, &rows)
    }
}

fn build_index(codes: &[String]) -> Result<HashMap<String, usize>, DatasetError> {
    let mut index = HashMap::with_capacity(codes.len());
    for (i, code) in codes.iter().enumerate() {
        if index.insert(code.clone(), i).is_some() {
            return Err(DatasetError::DuplicateColumn(code.clone()));
        }
    }
    Ok(index)
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/dataset.rs"]
mod tests;
