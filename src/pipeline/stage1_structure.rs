use ndarray::Array2;
use serde::Serialize;

use crate::model::{ModelError, Questionnaire, StructuralModel};

/// Outgoing paths of one construct, by abbreviation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathEntry {
    pub source: String,
    pub targets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathStructure {
    /// Latent variables in model order.
    pub latent: Vec<String>,
    pub paths: Vec<PathEntry>,
}

impl PathStructure {
    pub fn index_of(&self, latent: &str) -> Option<usize> {
        self.latent.iter().position(|l| l == latent)
    }

    /// Square matrix with `m[[to, from]] == 1` for every path.
    pub fn path_matrix(&self) -> Array2<u8> {
        let n = self.latent.len();
        let mut m = Array2::<u8>::zeros((n, n));
        for entry in &self.paths {
            let Some(from) = self.index_of(&entry.source) else {
                continue;
            };
            for target in &entry.targets {
                if let Some(to) = self.index_of(target) {
                    m[[to, from]] = 1;
                }
            }
        }
        m
    }

    /// `true` where a path runs between two constructs in either direction.
    pub fn adjacency(&self) -> Array2<bool> {
        let m = self.path_matrix();
        let n = self.latent.len();
        Array2::from_shape_fn((n, n), |(a, b)| m[[a, b]] == 1 || m[[b, a]] == 1)
    }
}

pub fn build_path_structure(model: &StructuralModel) -> Result<PathStructure, ModelError> {
    let latent = model
        .constructs()
        .iter()
        .map(|c| c.abbreviation.clone())
        .collect::<Vec<_>>();

    let mut paths = Vec::new();
    for construct in model.constructs() {
        let mut targets = Vec::new();
        for influenced in model.outgoing(construct.id) {
            targets.push(model.get(influenced)?.abbreviation.clone());
        }
        if !targets.is_empty() {
            paths.push(PathEntry {
                source: construct.abbreviation.clone(),
                targets,
            });
        }
    }

    Ok(PathStructure { latent, paths })
}

/// Block name and item columns for every construct, in model order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatentBlock {
    pub name: String,
    pub columns: Vec<String>,
}

pub fn build_blocks(model: &StructuralModel, questionnaire: &Questionnaire) -> Vec<LatentBlock> {
    let mut blocks = Vec::with_capacity(model.constructs().len());
    for construct in model.constructs() {
        let columns = questionnaire
            .block(construct.id)
            .map(|b| b.codes())
            .unwrap_or_default();
        blocks.push(LatentBlock {
            name: construct.abbreviation.clone(),
            columns,
        });
    }
    blocks
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_structure.rs"]
mod tests;
