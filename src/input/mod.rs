use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod responses;
pub mod study_file;

use crate::model::{Dataset, DatasetError, ModelError, Questionnaire, QuestionnaireError, StructuralModel};
use responses::load_responses;
use study_file::load_study_file;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid study file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid responses file: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid study: {0}")]
    Model(#[from] ModelError),
    #[error("invalid study: {0}")]
    Questionnaire(#[from] QuestionnaireError),
    #[error("invalid responses: {0}")]
    Dataset(#[from] DatasetError),
    #[error("responses file has no column for item '{0}'")]
    MissingColumn(String),
    #[error("row {row}, item '{item}': '{value}' is not an answer on the 1-{scale} scale")]
    InvalidAnswer {
        row: usize,
        item: String,
        value: String,
        scale: u8,
    },
}

pub fn load_study(study_path: &Path) -> Result<(StructuralModel, Questionnaire), InputError> {
    let (model, questionnaire) = load_study_file(study_path)?;
    tracing::info!(
        path = %study_path.display(),
        constructs = model.constructs().len(),
        relations = model.relations().len(),
        items = questionnaire.item_codes().len(),
        "study loaded"
    );
    Ok((model, questionnaire))
}

/// Drops the named constructs, their relations and their item blocks.
pub fn exclude_constructs(
    model: &mut StructuralModel,
    questionnaire: &mut Questionnaire,
    abbreviations: &[String],
) -> Result<(), InputError> {
    for abbreviation in abbreviations {
        let id = model
            .find_by_abbreviation(abbreviation)
            .ok_or_else(|| ModelError::UnknownAbbreviation(abbreviation.clone()))?
            .id;
        model.remove_construct(id)?;
        tracing::info!(construct = %abbreviation, "construct excluded");
    }
    questionnaire.sync_blocks(model);
    Ok(())
}

/// Reads one responses file against the questionnaire.
pub fn load_wave(responses_path: &Path, questionnaire: &Questionnaire) -> Result<Dataset, InputError> {
    let dataset = load_responses(responses_path, questionnaire)?;
    tracing::info!(
        path = %responses_path.display(),
        respondents = dataset.n_rows(),
        items = dataset.n_items(),
        "responses loaded"
    );
    Ok(dataset)
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
