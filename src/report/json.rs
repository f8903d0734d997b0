use serde::Serialize;

use crate::model::ScoringConfig;
use crate::pipeline::stage1_structure::PathEntry;
use crate::pipeline::stage4_validity::HtmtMatrix;
use crate::pipeline::stage5_report::{Analysis, MetricValue};
use crate::report::ToolMeta;
use crate::stats::round_to;

#[derive(Debug, Serialize)]
struct Summary<'a> {
    tool: &'a ToolMeta,
    input: InputSummary<'a>,
    estimation: EstimationSummary,
    constructs: Vec<ConstructSummary<'a>>,
    htmt: Option<HtmtMatrix>,
    vif_failures: Vec<VifFailure<'a>>,
}

#[derive(Debug, Serialize)]
struct InputSummary<'a> {
    model: &'a str,
    n_respondents: usize,
    n_items: usize,
    paths: &'a [PathEntry],
    relations: &'a [String],
}

#[derive(Debug, Serialize)]
struct EstimationSummary {
    scheme: &'static str,
    iterations: usize,
    max_iterations: usize,
    tolerance: f64,
}

#[derive(Debug, Serialize)]
struct ConstructSummary<'a> {
    abbreviation: &'a str,
    name: &'a str,
    n_items: usize,
    cronbachs_alpha: MetricValue,
    composite_reliability: MetricValue,
    ave: MetricValue,
}

#[derive(Debug, Serialize)]
struct VifFailure<'a> {
    construct: &'a str,
    error: &'a str,
}

pub fn render_summary_json(
    analysis: &Analysis,
    config: &ScoringConfig,
    meta: &ToolMeta,
) -> std::io::Result<String> {
    let decimals = config.metric_decimals;
    let summary = Summary {
        tool: meta,
        input: InputSummary {
            model: &analysis.model_name,
            n_respondents: analysis.n_respondents,
            n_items: analysis.n_items,
            paths: &analysis.paths,
            relations: &analysis.relations,
        },
        estimation: EstimationSummary {
            scheme: analysis.scheme.as_str(),
            iterations: analysis.iterations,
            max_iterations: config.max_iterations,
            tolerance: config.tolerance,
        },
        constructs: analysis
            .constructs
            .iter()
            .map(|c| ConstructSummary {
                abbreviation: &c.abbreviation,
                name: &c.name,
                n_items: c.n_items,
                cronbachs_alpha: rounded(&c.cronbachs_alpha, decimals),
                composite_reliability: rounded(&c.composite_reliability, decimals),
                ave: rounded(&c.ave, decimals),
            })
            .collect(),
        htmt: analysis.htmt.clone(),
        vif_failures: analysis
            .vif_failures
            .iter()
            .map(|(construct, error)| VifFailure { construct, error })
            .collect(),
    };
    let mut out = serde_json::to_string_pretty(&summary)?;
    out.push('\n');
    Ok(out)
}

fn rounded(value: &MetricValue, decimals: u32) -> MetricValue {
    match value {
        MetricValue::Value(v) => MetricValue::Value(round_to(*v, decimals)),
        other => other.clone(),
    }
}
