use ndarray::{Array2, ArrayView1};

use crate::model::Dataset;
use crate::stats::{NumericError, round4};

/// How `variance` scores its item list, resolved once per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarianceStrategy<'a> {
    /// Variance of one column.
    SingleItem(&'a str),
    /// Variance of the per-respondent sum over several columns.
    MultiItem(&'a [String]),
}

impl<'a> VarianceStrategy<'a> {
    pub fn resolve(items: &'a [String]) -> Result<Self, NumericError> {
        match items {
            [] => Err(NumericError::NoItems),
            [single] => Ok(VarianceStrategy::SingleItem(single.as_str())),
            _ => Ok(VarianceStrategy::MultiItem(items)),
        }
    }
}

/// Population variance (divides by N) of one item or of the summed items.
pub fn variance(items: &[String], dataset: &Dataset) -> Result<f64, NumericError> {
    let strategy = VarianceStrategy::resolve(items)?;
    if dataset.n_rows() == 0 {
        return Err(NumericError::EmptyDataset);
    }
    match strategy {
        VarianceStrategy::SingleItem(code) => Ok(population_variance(column(dataset, code)?)),
        VarianceStrategy::MultiItem(codes) => {
            let sums = dataset.row_sums(codes)?;
            Ok(population_variance(sums.view()))
        }
    }
}

pub fn covariance(a: &str, b: &str, dataset: &Dataset) -> Result<f64, NumericError> {
    if dataset.n_rows() == 0 {
        return Err(NumericError::EmptyDataset);
    }
    let x = column(dataset, a)?;
    if a == b {
        return Ok(population_variance(x));
    }
    let y = column(dataset, b)?;
    Ok(population_covariance(x, y))
}

/// NaN when either item is constant.
pub fn pearson_correlation(a: &str, b: &str, dataset: &Dataset) -> Result<f64, NumericError> {
    let covar = covariance(a, b, dataset)?;
    let sd_a = population_variance(column(dataset, a)?).sqrt();
    let sd_b = population_variance(column(dataset, b)?).sqrt();
    Ok(covar / (sd_a * sd_b))
}

pub fn mean(values: ArrayView1<'_, f64>) -> f64 {
    values.sum() / values.len() as f64
}

pub fn population_variance(values: ArrayView1<'_, f64>) -> f64 {
    let avg = mean(values);
    let mut acc = 0.0f64;
    for &v in values {
        acc += (v - avg) * (v - avg);
    }
    acc / values.len() as f64
}

pub fn population_covariance(x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> f64 {
    let avg_x = mean(x);
    let avg_y = mean(y);
    let mut acc = 0.0f64;
    for (&a, &b) in x.iter().zip(y.iter()) {
        acc += (a - avg_x) * (b - avg_y);
    }
    acc / x.len() as f64
}

pub fn correlation_of(x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> f64 {
    let covar = population_covariance(x, y);
    covar / (population_variance(x).sqrt() * population_variance(y).sqrt())
}

/// Item x item correlations in dataset column order. `get(row, col)` reads
/// row `row` at column `col`.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub codes: Vec<String>,
    pub values: Array2<f64>,
}

impl CorrelationMatrix {
    pub fn index_of(&self, code: &str) -> Option<usize> {
        self.codes.iter().position(|c| c == code)
    }

    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let r = self.index_of(row)?;
        let c = self.index_of(col)?;
        Some(self.values[[r, c]])
    }
}

/// Correlation matrix with each row cut off at its first entry that rounds
/// to 1.0: that entry and everything after it in the row is NaN.
pub fn correlation_matrix(dataset: &Dataset) -> Result<CorrelationMatrix, NumericError> {
    let full = full_correlation_matrix(dataset)?;
    let n = full.codes.len();
    let mut values = full.values;
    for i in 0..n {
        let mut masked = false;
        for j in 0..n {
            if round4(values[[i, j]]) == 1.0 {
                masked = true;
            }
            if masked {
                values[[i, j]] = f64::NAN;
            }
        }
    }
    Ok(CorrelationMatrix {
        codes: full.codes,
        values,
    })
}

pub fn full_correlation_matrix(dataset: &Dataset) -> Result<CorrelationMatrix, NumericError> {
    if dataset.n_rows() == 0 {
        return Err(NumericError::EmptyDataset);
    }
    let codes = dataset.codes().to_vec();
    let n = codes.len();
    let mut values = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            values[[i, j]] = pearson_correlation(&codes[i], &codes[j], dataset)?;
        }
    }
    Ok(CorrelationMatrix { codes, values })
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemDescriptives {
    pub code: String,
    pub mean: f64,
    pub std: f64,
}

pub fn item_descriptives(dataset: &Dataset) -> Result<Vec<ItemDescriptives>, NumericError> {
    if dataset.n_rows() == 0 {
        return Err(NumericError::EmptyDataset);
    }
    let mut out = Vec::with_capacity(dataset.n_items());
    for code in dataset.codes() {
        let col = column(dataset, code)?;
        out.push(ItemDescriptives {
            code: code.clone(),
            mean: mean(col),
            std: population_variance(col).sqrt(),
        });
    }
    Ok(out)
}

fn column<'a>(dataset: &'a Dataset, code: &str) -> Result<ArrayView1<'a, f64>, NumericError> {
    dataset
        .column(code)
        .ok_or_else(|| NumericError::UnknownItem(code.to_string()))
}

#[cfg(test)]
#[path = "../../tests/src_inline/stats/aggregate.rs"]
mod tests;
