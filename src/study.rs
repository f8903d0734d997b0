use crate::cache::{MetricCache, MetricKind};
use crate::model::{ConstructId, Dataset, Questionnaire, ScoringConfig, StructuralModel};
use crate::pipeline::ScoringError;
use crate::pipeline::stage1_structure::{LatentBlock, build_blocks, build_path_structure};
use crate::pipeline::stage2_outer::{OuterConfig, OuterModel, OuterModelEstimator, run_stage2};
use crate::pipeline::stage3_reliability::{
    average_variance_extracted, composite_reliability, cronbachs_alpha,
};
use crate::pipeline::stage4_validity::{htmt_matrix, outer_vif};
use crate::pipeline::stage5_report::{Analysis, ConstructMetrics, ItemRow, MetricValue};
use crate::stats::aggregate::{correlation_matrix, item_descriptives};

/// One study's scoring state. Passed explicitly into every scoring call.
#[derive(Debug, Clone)]
pub struct Study {
    pub model: StructuralModel,
    pub questionnaire: Questionnaire,
    pub config: ScoringConfig,
    dataset: Dataset,
    cache: MetricCache,
}

impl Study {
    pub fn new(
        model: StructuralModel,
        mut questionnaire: Questionnaire,
        dataset: Dataset,
        config: ScoringConfig,
    ) -> Self {
        questionnaire.sync_blocks(&model);
        Self {
            model,
            questionnaire,
            config,
            dataset,
            cache: MetricCache::new(),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    #[cfg(test)]
    pub fn cache(&self) -> &MetricCache {
        &self.cache
    }

    /// New responses invalidate every cached metric.
    pub fn replace_dataset(&mut self, dataset: Dataset) {
        self.dataset = dataset;
        self.model.mark_edited();
    }

    pub fn validate(&self) -> Result<(), ScoringError> {
        self.model.validate_for_scoring()?;
        self.questionnaire.validate_blocks()?;
        Ok(())
    }

    pub fn blocks(&self) -> Vec<LatentBlock> {
        build_blocks(&self.model, &self.questionnaire)
    }

    pub fn outer_config(&self) -> Result<OuterConfig, ScoringError> {
        Ok(OuterConfig {
            structure: build_path_structure(&self.model)?,
            scheme: self.config.scheme,
            blocks: self.blocks(),
            max_iterations: self.config.max_iterations,
            tolerance: self.config.tolerance,
        })
    }

    pub fn estimate_outer_model(
        &self,
        estimator: &dyn OuterModelEstimator,
    ) -> Result<OuterModel, ScoringError> {
        self.validate()?;
        let config = self.outer_config()?;
        run_stage2(&self.dataset, &config, estimator)
    }

    pub fn cronbachs_alpha(&mut self, construct: ConstructId) -> Result<f64, ScoringError> {
        let block = self.questionnaire.block(construct)?.clone();
        let edited = self.model.is_edited();
        let dataset = &self.dataset;
        self.cache
            .get_or_compute(construct, MetricKind::CronbachsAlpha, edited, || {
                cronbachs_alpha(&block.abbreviation, &block.codes(), dataset)
                    .map_err(ScoringError::from)
            })
    }

    pub fn composite_reliability(
        &mut self,
        construct: ConstructId,
        outer: &OuterModel,
    ) -> Result<f64, ScoringError> {
        let abbreviation = self.model.get(construct)?.abbreviation.clone();
        let edited = self.model.is_edited();
        self.cache
            .get_or_compute(construct, MetricKind::CompositeReliability, edited, || {
                composite_reliability(&abbreviation, &outer.loadings_for(&abbreviation))
                    .map_err(ScoringError::from)
            })
    }

    pub fn average_variance_extracted(
        &mut self,
        construct: ConstructId,
        outer: &OuterModel,
    ) -> Result<f64, ScoringError> {
        let abbreviation = self.model.get(construct)?.abbreviation.clone();
        let edited = self.model.is_edited();
        self.cache.get_or_compute(
            construct,
            MetricKind::AverageVarianceExtracted,
            edited,
            || {
                average_variance_extracted(&abbreviation, &outer.loadings_for(&abbreviation))
                    .map_err(ScoringError::from)
            },
        )
    }

    /// Full scoring run. Per-construct metric failures are recorded in the
    /// result; configuration and estimator failures abort the run. Clears the
    /// model's edited flag on success.
    pub fn analyze(&mut self, estimator: &dyn OuterModelEstimator) -> Result<Analysis, ScoringError> {
        let keep = self
            .model
            .constructs()
            .iter()
            .map(|c| c.id)
            .collect::<Vec<_>>();
        self.cache.retain_constructs(&keep);
        self.questionnaire.sync_blocks(&self.model);

        let config = self.outer_config()?;
        let outer = self.estimate_outer_model(estimator)?;
        let corr = correlation_matrix(&self.dataset)?;
        let descriptives = item_descriptives(&self.dataset)?;

        let mut constructs = Vec::with_capacity(keep.len());
        for &id in &keep {
            let construct = self.model.get(id)?.clone();
            let n_items = self.questionnaire.block(id)?.items.len();
            let alpha = metric_value(&construct.abbreviation, "alpha", self.cronbachs_alpha(id));
            let cr = metric_value(
                &construct.abbreviation,
                "composite reliability",
                self.composite_reliability(id, &outer),
            );
            let ave = metric_value(
                &construct.abbreviation,
                "AVE",
                self.average_variance_extracted(id, &outer),
            );
            constructs.push(ConstructMetrics {
                abbreviation: construct.abbreviation,
                name: construct.name,
                n_items,
                cronbachs_alpha: alpha,
                composite_reliability: cr,
                ave,
            });
        }

        let htmt = match htmt_matrix(&config.blocks, &corr) {
            Ok(m) => Some(m),
            Err(e) => {
                tracing::warn!(error = %e, "HTMT matrix unavailable");
                None
            }
        };

        let mut vifs = Vec::new();
        let mut vif_failures = Vec::new();
        for block in &config.blocks {
            match outer_vif(block, &self.dataset) {
                Ok(values) => vifs.extend(values),
                Err(e) => {
                    tracing::warn!(block = %block.name, error = %e, "outer VIF unavailable");
                    vif_failures.push((block.name.clone(), e.to_string()));
                }
            }
        }

        let mut items = Vec::with_capacity(descriptives.len());
        for d in descriptives {
            let row = outer.rows.iter().find(|r| r.item == d.code);
            let construct = row.map(|r| r.block.clone()).unwrap_or_default();
            let reversed = self
                .questionnaire
                .item(&d.code)
                .map(|i| i.reversed)
                .unwrap_or(false);
            items.push(ItemRow {
                vif: vifs.iter().find(|v| v.item == d.code).map(|v| v.vif),
                loading: row.map(|r| r.loading),
                weight: row.map(|r| r.weight),
                code: d.code,
                construct,
                reversed,
                mean: d.mean,
                std: d.std,
            });
        }

        self.model.mark_clean();

        Ok(Analysis {
            model_name: self.model.name.clone(),
            scheme: self.config.scheme,
            n_respondents: self.dataset.n_rows(),
            n_items: self.dataset.n_items(),
            paths: config.structure.paths,
            relations: self.model.describe_relations(),
            score_names: config.blocks.iter().map(|b| b.name.clone()).collect(),
            scores: outer.scores,
            constructs,
            items,
            correlations: corr,
            htmt,
            vif_failures,
            iterations: outer.iterations,
        })
    }
}

fn metric_value(construct: &str, metric: &str, result: Result<f64, ScoringError>) -> MetricValue {
    match result {
        Ok(v) => MetricValue::Value(v),
        Err(e) => {
            tracing::warn!(construct, metric, error = %e, "metric unavailable");
            MetricValue::Failed(e.to_string())
        }
    }
}

#[cfg(test)]
#[path = "../tests/src_inline/study.rs"]
mod tests;
