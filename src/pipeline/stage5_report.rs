use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use ndarray::Array2;
use serde::Serialize;

use crate::model::{InnerScheme, ScoringConfig};
use crate::pipeline::stage1_structure::PathEntry;
use crate::pipeline::stage4_validity::HtmtMatrix;
use crate::report::json::render_summary_json;
use crate::report::text::render_report_text;
use crate::report::{ToolMeta, format_cell, format_rounded};
use crate::stats::aggregate::CorrelationMatrix;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricValue {
    Value(f64),
    Failed(String),
}

impl MetricValue {
    pub fn value(&self) -> Option<f64> {
        match self {
            MetricValue::Value(v) => Some(*v),
            MetricValue::Failed(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstructMetrics {
    pub abbreviation: String,
    pub name: String,
    pub n_items: usize,
    pub cronbachs_alpha: MetricValue,
    pub composite_reliability: MetricValue,
    pub ave: MetricValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemRow {
    pub code: String,
    pub construct: String,
    pub reversed: bool,
    pub mean: f64,
    pub std: f64,
    pub loading: Option<f64>,
    pub weight: Option<f64>,
    pub vif: Option<f64>,
}

/// Full-precision result of one scoring run.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub model_name: String,
    pub scheme: InnerScheme,
    pub n_respondents: usize,
    pub n_items: usize,
    pub paths: Vec<PathEntry>,
    pub relations: Vec<String>,
    /// Construct score columns, in `score_names` order.
    pub score_names: Vec<String>,
    pub scores: Array2<f64>,
    pub constructs: Vec<ConstructMetrics>,
    pub items: Vec<ItemRow>,
    pub correlations: CorrelationMatrix,
    pub htmt: Option<HtmtMatrix>,
    pub vif_failures: Vec<(String, String)>,
    pub iterations: usize,
}

pub fn write_reports(
    analysis: &Analysis,
    config: &ScoringConfig,
    meta: &ToolMeta,
    out_dir: &Path,
) -> std::io::Result<()> {
    fs::create_dir_all(out_dir)?;

    let summary_path = out_dir.join("summary.json");
    let json = render_summary_json(analysis, config, meta)?;
    write_text(&summary_path, &json)?;

    let items_path = out_dir.join("items.tsv");
    write_items_tsv(analysis, config, &items_path)?;

    let corr_path = out_dir.join("correlations.tsv");
    write_correlations_tsv(&analysis.correlations, config, &corr_path)?;

    let scores_path = out_dir.join("scores.tsv");
    write_scores_tsv(analysis, config, &scores_path)?;

    if let Some(htmt) = &analysis.htmt {
        let htmt_path = out_dir.join("htmt.tsv");
        write_htmt_tsv(htmt, config, &htmt_path)?;
    }

    let report_path = out_dir.join("report.txt");
    write_text(&report_path, &render_report_text(analysis, config))?;

    tracing::info!(out_dir = %out_dir.display(), "reports written");
    Ok(())
}

fn write_items_tsv(
    analysis: &Analysis,
    config: &ScoringConfig,
    path: &Path,
) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    let header = [
        "item", "construct", "reversed", "mean", "std", "loading", "weight", "vif",
    ]
    .join("\t");
    writeln!(w, "{}", header)?;

    let metric = config.metric_decimals;
    let descriptive = config.descriptive_decimals;
    for item in &analysis.items {
        let row = [
            item.code.clone(),
            item.construct.clone(),
            item.reversed.to_string(),
            format_rounded(item.mean, descriptive),
            format_rounded(item.std, descriptive),
            format_cell(item.loading, metric),
            format_cell(item.weight, metric),
            format_cell(item.vif, metric),
        ];
        writeln!(w, "{}", row.join("\t"))?;
    }
    w.flush()
}

fn write_correlations_tsv(
    corr: &CorrelationMatrix,
    config: &ScoringConfig,
    path: &Path,
) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    let mut header = vec![String::new()];
    header.extend(corr.codes.iter().cloned());
    writeln!(w, "{}", header.join("\t"))?;

    for (i, code) in corr.codes.iter().enumerate() {
        let mut row = vec![code.clone()];
        for j in 0..corr.codes.len() {
            let v = corr.values[[i, j]];
            row.push(format_cell((!v.is_nan()).then_some(v), config.metric_decimals));
        }
        writeln!(w, "{}", row.join("\t"))?;
    }
    w.flush()
}

/// One row per respondent, in responses-file order.
fn write_scores_tsv(
    analysis: &Analysis,
    config: &ScoringConfig,
    path: &Path,
) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    let mut header = vec!["respondent".to_string()];
    header.extend(analysis.score_names.iter().cloned());
    writeln!(w, "{}", header.join("\t"))?;

    for (i, row) in analysis.scores.rows().into_iter().enumerate() {
        let mut cells = vec![(i + 1).to_string()];
        cells.extend(row.iter().map(|v| format_cell(Some(*v), config.metric_decimals)));
        writeln!(w, "{}", cells.join("\t"))?;
    }
    w.flush()
}

fn write_htmt_tsv(htmt: &HtmtMatrix, config: &ScoringConfig, path: &Path) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    let mut header = vec![String::new()];
    header.extend(htmt.constructs.iter().cloned());
    writeln!(w, "{}", header.join("\t"))?;

    for (i, name) in htmt.constructs.iter().enumerate() {
        let mut row = vec![name.clone()];
        for v in &htmt.values[i] {
            row.push(format_cell(*v, config.metric_decimals));
        }
        writeln!(w, "{}", row.join("\t"))?;
    }
    w.flush()
}

fn write_text(path: &Path, content: &str) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    w.write_all(content.as_bytes())?;
    w.flush()
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage5_report.rs"]
mod tests;
