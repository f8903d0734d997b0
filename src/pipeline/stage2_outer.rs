use ndarray::{Array1, Array2, Axis};
use thiserror::Error;

use crate::model::{Dataset, InnerScheme};
use crate::pipeline::ScoringError;
use crate::pipeline::stage1_structure::{LatentBlock, PathStructure};
use crate::stats::aggregate::{correlation_of, population_variance};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimatorError {
    #[error("the dataset has no rows")]
    EmptyDataset,
    #[error("outer weights did not converge within {0} iterations")]
    NotConverged(usize),
    #[error("score of '{0}' has zero variance")]
    DegenerateScore(String),
    #[error("inner proxy of '{0}' is zero; it has no scored neighbours")]
    DegenerateProxy(String),
}

/// Everything an estimator needs besides the data.
#[derive(Debug, Clone)]
pub struct OuterConfig {
    pub structure: PathStructure,
    pub scheme: InnerScheme,
    pub blocks: Vec<LatentBlock>,
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl OuterConfig {
    /// Every latent variable needs a block with at least one column present
    /// in the dataset.
    pub fn validate(&self, dataset: &Dataset) -> Result<(), ScoringError> {
        for latent in &self.structure.latent {
            let Some(block) = self.blocks.iter().find(|b| &b.name == latent) else {
                return Err(ScoringError::Configuration(format!(
                    "latent variable '{latent}' has no item block"
                )));
            };
            if block.columns.is_empty() {
                return Err(ScoringError::Configuration(format!(
                    "latent variable '{latent}' has no assigned columns"
                )));
            }
            for column in &block.columns {
                if dataset.column_index(column).is_none() {
                    return Err(ScoringError::Configuration(format!(
                        "column '{column}' of '{latent}' is missing from the dataset"
                    )));
                }
            }
        }
        for block in &self.blocks {
            if self.structure.index_of(&block.name).is_none() {
                return Err(ScoringError::Configuration(format!(
                    "item block '{}' is not part of the path structure",
                    block.name
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OuterModelRow {
    pub item: String,
    pub block: String,
    pub weight: f64,
    pub loading: f64,
    pub communality: f64,
}

#[derive(Debug, Clone)]
pub struct OuterModel {
    pub rows: Vec<OuterModelRow>,
    /// Construct scores, one column per block in config order.
    pub scores: Array2<f64>,
    pub iterations: usize,
}

impl OuterModel {
    pub fn loadings_for(&self, block: &str) -> Vec<f64> {
        self.rows
            .iter()
            .filter(|r| r.block == block)
            .map(|r| r.loading)
            .collect()
    }
}

pub trait OuterModelEstimator {
    fn outer_model(&self, dataset: &Dataset, config: &OuterConfig)
    -> Result<OuterModel, EstimatorError>;
}

pub fn run_stage2(
    dataset: &Dataset,
    config: &OuterConfig,
    estimator: &dyn OuterModelEstimator,
) -> Result<OuterModel, ScoringError> {
    config.validate(dataset)?;
    let model = estimator.outer_model(dataset, config)?;
    tracing::info!(
        scheme = config.scheme.as_str(),
        iterations = model.iterations,
        items = model.rows.len(),
        "outer model estimated"
    );
    Ok(model)
}

/// Iterative PLS-PM outer estimation, Mode A blocks, on mean-centered data.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlsEstimator;

impl OuterModelEstimator for PlsEstimator {
    fn outer_model(
        &self,
        dataset: &Dataset,
        config: &OuterConfig,
    ) -> Result<OuterModel, EstimatorError> {
        let n = dataset.n_rows();
        if n == 0 {
            return Err(EstimatorError::EmptyDataset);
        }

        let blocks = &config.blocks;
        let n_lv = blocks.len();
        let adjacency = config.structure.adjacency();
        let lv_index = blocks
            .iter()
            .map(|b| config.structure.index_of(&b.name).unwrap_or(usize::MAX))
            .collect::<Vec<_>>();

        let mut xs = Vec::with_capacity(n_lv);
        for block in blocks {
            let mut x = dataset
                .select(&block.columns)
                .map_err(|_| EstimatorError::DegenerateScore(block.name.clone()))?;
            center_columns(&mut x);
            xs.push(x);
        }

        let mut weights = Vec::with_capacity(n_lv);
        for (b, x) in xs.iter().enumerate() {
            let w = Array1::<f64>::ones(x.ncols());
            weights.push(unit_variance_weights(x, w, &blocks[b].name)?);
        }

        let mut iterations = 0usize;
        let mut converged = false;
        for iter in 1..=config.max_iterations {
            let scores = xs
                .iter()
                .zip(weights.iter())
                .map(|(x, w)| x.dot(w))
                .collect::<Vec<_>>();

            let mut next = Vec::with_capacity(n_lv);
            for a in 0..n_lv {
                let mut proxy = Array1::<f64>::zeros(n);
                for b in 0..n_lv {
                    if a == b || !is_adjacent(&adjacency, lv_index[a], lv_index[b]) {
                        continue;
                    }
                    let r = correlation_of(scores[a].view(), scores[b].view());
                    let inner = match config.scheme {
                        InnerScheme::Centroid => sign(r),
                        InnerScheme::Factorial => r,
                    };
                    proxy.scaled_add(inner, &scores[b]);
                }
                if proxy.iter().all(|v| *v == 0.0) {
                    return Err(EstimatorError::DegenerateProxy(blocks[a].name.clone()));
                }
                let w = xs[a].t().dot(&proxy) / n as f64;
                next.push(unit_variance_weights(&xs[a], w, &blocks[a].name)?);
            }

            let mut change = 0.0f64;
            for (old, new) in weights.iter().zip(next.iter()) {
                for (o, w) in old.iter().zip(new.iter()) {
                    let d = o.abs() - w.abs();
                    change += d * d;
                }
            }
            weights = next;
            iterations = iter;
            tracing::debug!(iteration = iter, change, "outer weight update");
            if change < config.tolerance {
                converged = true;
                break;
            }
        }
        if !converged {
            return Err(EstimatorError::NotConverged(config.max_iterations));
        }

        let mut scores = Array2::<f64>::zeros((n, n_lv));
        let mut rows = Vec::new();
        for (b, block) in blocks.iter().enumerate() {
            let mut score = xs[b].dot(&weights[b]);
            let mut loadings = xs[b]
                .columns()
                .into_iter()
                .map(|col| correlation_of(col, score.view()))
                .collect::<Vec<_>>();

            let negative = loadings.iter().filter(|l| **l < 0.0).count();
            if negative * 2 > loadings.len() {
                score.mapv_inplace(|v| -v);
                weights[b].mapv_inplace(|v| -v);
                for l in loadings.iter_mut() {
                    *l = -*l;
                }
            }

            scores.column_mut(b).assign(&score);
            for (j, code) in block.columns.iter().enumerate() {
                rows.push(OuterModelRow {
                    item: code.clone(),
                    block: block.name.clone(),
                    weight: weights[b][j],
                    loading: loadings[j],
                    communality: loadings[j] * loadings[j],
                });
            }
        }

        Ok(OuterModel {
            rows,
            scores,
            iterations,
        })
    }
}

fn center_columns(x: &mut Array2<f64>) {
    if x.nrows() == 0 {
        return;
    }
    for mut col in x.axis_iter_mut(Axis(1)) {
        let mean = col.sum() / col.len() as f64;
        col.mapv_inplace(|v| v - mean);
    }
}

/// Rescales `w` so that `x . w` has unit population variance.
fn unit_variance_weights(
    x: &Array2<f64>,
    w: Array1<f64>,
    name: &str,
) -> Result<Array1<f64>, EstimatorError> {
    let score = x.dot(&w);
    let sd = population_variance(score.view()).sqrt();
    if sd == 0.0 || !sd.is_finite() {
        return Err(EstimatorError::DegenerateScore(name.to_string()));
    }
    Ok(w / sd)
}

fn is_adjacent(adjacency: &Array2<bool>, a: usize, b: usize) -> bool {
    a < adjacency.nrows() && b < adjacency.ncols() && adjacency[[a, b]]
}

fn sign(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_outer.rs"]
mod tests;
