use crate::model::ScoringConfig;
use crate::pipeline::stage5_report::{Analysis, MetricValue};
use crate::report::{format_rounded, verdict};

pub fn render_report_text(analysis: &Analysis, config: &ScoringConfig) -> String {
    let mut out = String::new();
    let decimals = config.metric_decimals;

    out.push_str("Measurement Model Reliability & Validity Report\n");
    out.push_str("===============================================\n\n");

    out.push_str("1. Model\n");
    out.push_str(&format!("Model: {}\n", analysis.model_name));
    out.push_str(&format!(
        "Respondents: {}\nItems: {}\n",
        analysis.n_respondents, analysis.n_items
    ));
    out.push_str(&format!(
        "Inner weighting: {} ({} iterations)\n",
        analysis.scheme.as_str(),
        analysis.iterations
    ));
    for relation in &analysis.relations {
        out.push_str(&format!("  {}\n", relation));
    }
    out.push('\n');

    out.push_str("2. Internal consistency and convergent validity\n");
    for c in &analysis.constructs {
        out.push_str(&format!("{} ({}), {} items\n", c.name, c.abbreviation, c.n_items));
        push_metric(
            &mut out,
            "Cronbach's alpha",
            &c.cronbachs_alpha,
            config.alpha_min,
            decimals,
        );
        push_metric(
            &mut out,
            "Composite reliability",
            &c.composite_reliability,
            config.composite_reliability_min,
            decimals,
        );
        push_metric(&mut out, "AVE", &c.ave, config.ave_min, decimals);
    }
    let passing = analysis
        .constructs
        .iter()
        .filter(|c| {
            meets(&c.cronbachs_alpha, config.alpha_min)
                && meets(&c.composite_reliability, config.composite_reliability_min)
                && meets(&c.ave, config.ave_min)
        })
        .count();
    out.push_str(&format!(
        "Constructs meeting every reliability threshold: {} of {}\n",
        passing,
        analysis.constructs.len()
    ));
    out.push('\n');

    out.push_str("3. Discriminant validity (HTMT)\n");
    match &analysis.htmt {
        Some(htmt) => {
            let mut flagged = Vec::new();
            for (i, row) in htmt.values.iter().enumerate() {
                for (j, v) in row.iter().enumerate() {
                    if let Some(v) = v {
                        if *v >= config.htmt_max {
                            flagged.push(format!(
                                "{}-{} ({})",
                                htmt.constructs[i],
                                htmt.constructs[j],
                                format_rounded(*v, decimals)
                            ));
                        }
                    }
                }
            }
            if flagged.is_empty() {
                out.push_str(&format!(
                    "All HTMT ratios are below {}.\n",
                    config.htmt_max
                ));
            } else {
                out.push_str(&format!(
                    "HTMT at or above {}: {}\n",
                    config.htmt_max,
                    flagged.join(", ")
                ));
            }
        }
        None => out.push_str("HTMT matrix unavailable.\n"),
    }
    out.push('\n');

    out.push_str("4. Collinearity (outer VIF)\n");
    let high = analysis
        .items
        .iter()
        .filter_map(|i| i.vif.filter(|v| *v >= config.vif_max).map(|v| (i, v)))
        .map(|(i, v)| format!("{} ({})", i.code, format_rounded(v, decimals)))
        .collect::<Vec<_>>();
    if high.is_empty() {
        out.push_str(&format!("All item VIFs are below {}.\n", config.vif_max));
    } else {
        out.push_str(&format!(
            "VIF at or above {}: {}\n",
            config.vif_max,
            high.join(", ")
        ));
    }
    for (construct, error) in &analysis.vif_failures {
        out.push_str(&format!("{}: {}\n", construct, error));
    }

    out
}

fn push_metric(out: &mut String, label: &str, value: &MetricValue, min: f64, decimals: u32) {
    match value {
        MetricValue::Value(v) => out.push_str(&format!(
            "  {}: {} [{}]\n",
            label,
            format_rounded(*v, decimals),
            verdict(*v >= min)
        )),
        MetricValue::Failed(e) => out.push_str(&format!("  {}: unavailable ({})\n", label, e)),
    }
}

/// A failed metric never meets its threshold.
fn meets(value: &MetricValue, min: f64) -> bool {
    value.value().is_some_and(|v| v >= min)
}
