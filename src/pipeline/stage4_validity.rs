use serde::Serialize;

use crate::model::Dataset;
use crate::pipeline::stage1_structure::LatentBlock;
use crate::stats::aggregate::CorrelationMatrix;
use crate::stats::ols::{OlsError, fit_with_intercept};
use crate::stats::{NumericError, round4};

/// Smallest `1 - R^2` treated as a finite VIF.
const MIN_TOLERANCE: f64 = 1e-10;

/// Heterotrait-monotrait ratio between two item blocks, read from the masked
/// correlation matrix. NaN entries are skipped; a NaN cross entry is replaced
/// by its mirror. Cross correlations enter as absolute values, within-block
/// correlations keep their sign and each block's mean must be positive.
pub fn heterotrait_monotrait(
    a: &LatentBlock,
    b: &LatentBlock,
    corr: &CorrelationMatrix,
) -> Result<f64, NumericError> {
    let mono_a = monotrait(a, corr)?;
    let mono_b = monotrait(b, corr)?;
    for (block, mono) in [(a, mono_a), (b, mono_b)] {
        if mono <= 0.0 {
            return Err(NumericError::NonPositiveMonotrait {
                block: block.name.clone(),
                mean: mono,
            });
        }
    }

    let mut hetero = Vec::new();
    for item_a in &a.columns {
        for item_b in &b.columns {
            let direct = lookup(corr, item_b, item_a)?;
            if !direct.is_nan() {
                hetero.push(direct.abs());
                continue;
            }
            let mirrored = lookup(corr, item_a, item_b)?;
            if !mirrored.is_nan() {
                hetero.push(mirrored.abs());
            }
        }
    }
    if hetero.is_empty() {
        return Err(NumericError::NoHeterotraitPairs(
            a.name.clone(),
            b.name.clone(),
        ));
    }

    let avg_hetero = hetero.iter().sum::<f64>() / hetero.len() as f64;
    Ok(avg_hetero / (mono_a * mono_b).sqrt())
}

fn monotrait(block: &LatentBlock, corr: &CorrelationMatrix) -> Result<f64, NumericError> {
    let mut values = Vec::new();
    for item_1 in &block.columns {
        for item_2 in &block.columns {
            let v = lookup(corr, item_2, item_1)?;
            if !v.is_nan() {
                values.push(v);
            }
        }
    }
    if values.is_empty() {
        return Err(NumericError::NoMonotraitPairs(block.name.clone()));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

fn lookup(corr: &CorrelationMatrix, row: &str, col: &str) -> Result<f64, NumericError> {
    corr.get(row, col)
        .ok_or_else(|| NumericError::UnknownItem(format!("{row}/{col}")))
}

/// Construct x construct HTMT table. Row `i` lists HTMT(i, j) rounded to 4
/// decimals until the first entry that rounds to 1.0; that entry and the rest
/// of the row are blank.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HtmtMatrix {
    pub constructs: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl HtmtMatrix {
    #[cfg(test)]
    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let r = self.constructs.iter().position(|c| c == row)?;
        let c = self.constructs.iter().position(|c| c == col)?;
        self.values[r][c]
    }
}

pub fn htmt_matrix(
    blocks: &[LatentBlock],
    corr: &CorrelationMatrix,
) -> Result<HtmtMatrix, NumericError> {
    let mut values = Vec::with_capacity(blocks.len());
    for a in blocks {
        let mut row = Vec::with_capacity(blocks.len());
        let mut blank = false;
        for b in blocks {
            let ratio = round4(heterotrait_monotrait(a, b, corr)?);
            if ratio == 1.0 {
                blank = true;
            }
            row.push(if blank { None } else { Some(ratio) });
        }
        values.push(row);
    }
    Ok(HtmtMatrix {
        constructs: blocks.iter().map(|b| b.name.clone()).collect(),
        values,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemVif {
    pub item: String,
    pub block: String,
    pub vif: f64,
}

/// VIF of every item against the other items of its own block.
pub fn outer_vif(block: &LatentBlock, dataset: &Dataset) -> Result<Vec<ItemVif>, NumericError> {
    let k = block.columns.len();
    if k < 2 {
        return Err(NumericError::InsufficientColumns {
            block: block.name.clone(),
            found: k,
        });
    }
    if dataset.n_rows() == 0 {
        return Err(NumericError::EmptyDataset);
    }
    let x = dataset.select(&block.columns)?;

    let mut out = Vec::with_capacity(k);
    for (j, code) in block.columns.iter().enumerate() {
        let others = (0..k).filter(|&c| c != j).collect::<Vec<_>>();
        let predictors = x.select(ndarray::Axis(1), &others);
        let fit = fit_with_intercept(x.column(j), predictors.view()).map_err(|e| match e {
            OlsError::ConstantResponse => NumericError::ZeroVariance(code.clone()),
            OlsError::Singular => NumericError::PerfectCollinearity(code.clone()),
        })?;
        let unexplained = 1.0 - fit.r_squared;
        if unexplained <= MIN_TOLERANCE {
            return Err(NumericError::PerfectCollinearity(code.clone()));
        }
        out.push(ItemVif {
            item: code.clone(),
            block: block.name.clone(),
            vif: 1.0 / unexplained,
        });
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_validity.rs"]
mod tests;
