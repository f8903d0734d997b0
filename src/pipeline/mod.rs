pub mod stage1_structure;
pub mod stage2_outer;
pub mod stage3_reliability;
pub mod stage4_validity;
pub mod stage5_report;

use thiserror::Error;

use crate::model::{DatasetError, ModelError, QuestionnaireError};
use crate::pipeline::stage2_outer::EstimatorError;
use crate::stats::NumericError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("configuration error: {0}")]
    Model(#[from] ModelError),
    #[error("configuration error: {0}")]
    Questionnaire(#[from] QuestionnaireError),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),
    #[error("numeric degeneracy: {0}")]
    Numeric(#[from] NumericError),
    #[error("outer model estimation failed: {0}")]
    Estimator(#[from] EstimatorError),
}
