pub mod aggregate;
pub mod ols;

use thiserror::Error;

use crate::model::DatasetError;

/// Numeric degeneracy. Returned instead of NaN or misleading zeros.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NumericError {
    #[error("division by zero: the dataset has no rows")]
    EmptyDataset,
    #[error("no items given")]
    NoItems,
    #[error("unknown item '{0}'")]
    UnknownItem(String),
    #[error("zero variance in '{0}'")]
    ZeroVariance(String),
    #[error("Cronbach's alpha needs at least two items, '{block}' has {found}")]
    SingleItemAlpha { block: String, found: usize },
    #[error("every respondent answered all items of '{0}' identically")]
    IdenticalItems(String),
    #[error("VIF needs at least two items, '{block}' has {found}")]
    InsufficientColumns { block: String, found: usize },
    #[error("'{0}' is a perfect linear combination of the other items in its block")]
    PerfectCollinearity(String),
    #[error("no loadings for '{0}'")]
    EmptyLoadings(String),
    #[error("'{0}' has an undefined loading (constant item)")]
    NonFiniteLoading(String),
    #[error("no within-construct correlations for '{0}'")]
    NoMonotraitPairs(String),
    #[error("mean within-construct correlation of '{block}' is {mean}, HTMT needs it positive")]
    NonPositiveMonotrait { block: String, mean: f64 },
    #[error("no cross-construct correlations between '{0}' and '{1}'")]
    NoHeterotraitPairs(String, String),
}

impl From<DatasetError> for NumericError {
    fn from(value: DatasetError) -> Self {
        match value {
            DatasetError::UnknownColumn(code) => NumericError::UnknownItem(code),
            other => NumericError::UnknownItem(other.to_string()),
        }
    }
}

pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

pub fn round4(value: f64) -> f64 {
    round_to(value, 4)
}
