use crate::model::Dataset;
use crate::stats::NumericError;
use crate::stats::aggregate::variance;

/// `(k/(k-1)) * (1 - sum(item variances) / variance of the summed items)`.
pub fn cronbachs_alpha(block: &str, items: &[String], dataset: &Dataset) -> Result<f64, NumericError> {
    let k = items.len();
    if k < 2 {
        return Err(NumericError::SingleItemAlpha {
            block: block.to_string(),
            found: k,
        });
    }
    if dataset.n_rows() == 0 {
        return Err(NumericError::EmptyDataset);
    }
    if items_identical(items, dataset)? {
        return Err(NumericError::IdenticalItems(block.to_string()));
    }

    let total_variance = variance(items, dataset)?;
    if total_variance == 0.0 {
        return Err(NumericError::ZeroVariance(block.to_string()));
    }
    let mut item_variances = 0.0f64;
    for item in items {
        item_variances += variance(std::slice::from_ref(item), dataset)?;
    }

    let k = k as f64;
    Ok((k / (k - 1.0)) * ((total_variance - item_variances) / total_variance))
}

/// `(sum l)^2 / ((sum l)^2 + sum(1 - l^2))`.
pub fn composite_reliability(block: &str, loadings: &[f64]) -> Result<f64, NumericError> {
    check_loadings(block, loadings)?;
    let sum = loadings.iter().sum::<f64>();
    let errors = loadings.iter().map(|l| 1.0 - l * l).sum::<f64>();
    let squared = sum * sum;
    Ok(squared / (squared + errors))
}

/// Mean of the squared loadings.
pub fn average_variance_extracted(block: &str, loadings: &[f64]) -> Result<f64, NumericError> {
    check_loadings(block, loadings)?;
    let squared = loadings.iter().map(|l| l * l).sum::<f64>();
    Ok(squared / loadings.len() as f64)
}

fn check_loadings(block: &str, loadings: &[f64]) -> Result<(), NumericError> {
    if loadings.is_empty() {
        return Err(NumericError::EmptyLoadings(block.to_string()));
    }
    if loadings.iter().any(|l| !l.is_finite()) {
        return Err(NumericError::NonFiniteLoading(block.to_string()));
    }
    Ok(())
}

/// True when every within-respondent difference between the items is zero.
fn items_identical(items: &[String], dataset: &Dataset) -> Result<bool, NumericError> {
    let block = dataset.select(items)?;
    for row in block.rows() {
        let first = row[0];
        if row.iter().any(|v| *v != first) {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_reliability.rs"]
mod tests;
