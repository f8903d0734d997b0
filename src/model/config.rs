use serde::Serialize;

#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub scheme: InnerScheme,
    pub max_iterations: usize,
    pub tolerance: f64,
    pub metric_decimals: u32,
    pub descriptive_decimals: u32,
    pub alpha_min: f64,
    pub composite_reliability_min: f64,
    pub ave_min: f64,
    pub htmt_max: f64,
    pub vif_max: f64,
}

/// Inner weighting of adjacent construct scores during outer estimation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InnerScheme {
    Centroid,
    Factorial,
}

impl InnerScheme {
    pub fn as_str(self) -> &'static str {
        match self {
            InnerScheme::Centroid => "centroid",
            InnerScheme::Factorial => "factorial",
        }
    }
}

impl ScoringConfig {
    pub fn default_v1() -> Self {
        Self {
            scheme: InnerScheme::Centroid,
            max_iterations: 100,
            tolerance: 1e-6,
            metric_decimals: 4,
            descriptive_decimals: 2,
            alpha_min: 0.70,
            composite_reliability_min: 0.70,
            ave_min: 0.50,
            htmt_max: 0.85,
            vif_max: 5.0,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self::default_v1()
    }
}
