use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::input::InputError;
use crate::model::{ModelError, Questionnaire, StructuralModel};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudyFile {
    pub name: String,
    pub scale: u8,
    pub constructs: Vec<ConstructSpec>,
    #[serde(default)]
    pub relations: Vec<RelationSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConstructSpec {
    pub name: String,
    pub abbreviation: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub items: Vec<ItemSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItemSpec {
    pub text: String,
    #[serde(default)]
    pub reversed: bool,
}

/// Relation between two constructs, by abbreviation.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelationSpec {
    pub from: String,
    pub to: String,
}

pub fn load_study_file(path: &Path) -> Result<(StructuralModel, Questionnaire), InputError> {
    let file = File::open(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let spec: StudyFile = serde_json::from_reader(BufReader::new(file))?;
    build_study(&spec)
}

pub fn build_study(spec: &StudyFile) -> Result<(StructuralModel, Questionnaire), InputError> {
    let mut model = StructuralModel::new(spec.name.clone());
    for c in &spec.constructs {
        model.add_construct(c.name.clone(), c.abbreviation.clone(), c.description.clone())?;
    }

    for r in &spec.relations {
        let from = model
            .find_by_abbreviation(&r.from)
            .ok_or_else(|| ModelError::UnknownAbbreviation(r.from.clone()))?
            .id;
        let to = model
            .find_by_abbreviation(&r.to)
            .ok_or_else(|| ModelError::UnknownAbbreviation(r.to.clone()))?
            .id;
        model.add_relation(from, to)?;
    }

    let mut questionnaire = Questionnaire::new(spec.scale)?;
    questionnaire.sync_blocks(&model);
    for c in &spec.constructs {
        let Some(construct) = model.find_by_abbreviation(&c.abbreviation) else {
            continue;
        };
        let id = construct.id;
        for item in &c.items {
            questionnaire.add_item(id, item.text.clone(), item.reversed)?;
        }
    }

    Ok((model, questionnaire))
}
