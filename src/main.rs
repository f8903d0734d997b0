mod cache;
mod input;
mod logging;
mod model;
mod pipeline;
mod report;
mod stats;
mod study;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use thiserror::Error;

use crate::input::{InputError, exclude_constructs, load_study, load_wave};
use crate::model::{InnerScheme, ScoringConfig};
use crate::pipeline::ScoringError;
use crate::pipeline::stage2_outer::PlsEstimator;
use crate::pipeline::stage5_report::write_reports;
use crate::report::ToolMeta;
use crate::study::Study;

#[derive(Debug, Parser)]
#[command(name = "utaut-plsqc", version, about = "PLS-PM reliability and validity scoring for survey instruments")]
struct Cli {
    /// Log at debug level unless RUST_LOG is set.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score a study and write the reports.
    Run(RunArgs),
    /// Check that a study's model can be scored.
    Validate(ValidateArgs),
}

#[derive(Debug, Clone, Args)]
struct RunArgs {
    #[arg(long)]
    study: PathBuf,
    /// Responses CSV. Repeat to score several waves against the same study;
    /// each wave then gets its own subdirectory of `--out`.
    #[arg(long, required = true)]
    responses: Vec<PathBuf>,
    #[arg(long)]
    out: PathBuf,
    /// Abbreviation of a construct to leave out of the model. Repeatable.
    #[arg(long)]
    exclude: Vec<String>,
    #[arg(long, value_enum, default_value_t = SchemeArg::Centroid)]
    scheme: SchemeArg,
    #[arg(long)]
    max_iter: Option<usize>,
    #[arg(long)]
    tolerance: Option<f64>,
}

#[derive(Debug, Clone, Args)]
struct ValidateArgs {
    #[arg(long)]
    study: PathBuf,
    #[arg(long)]
    exclude: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SchemeArg {
    Centroid,
    Factorial,
}

impl From<SchemeArg> for InnerScheme {
    fn from(value: SchemeArg) -> Self {
        match value {
            SchemeArg::Centroid => InnerScheme::Centroid,
            SchemeArg::Factorial => InnerScheme::Factorial,
        }
    }
}

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error("failed to write reports: {0}")]
    Report(#[from] std::io::Error),
    #[error("no responses file given")]
    NoResponses,
    #[error("responses files share the name '{0}'; their reports would overwrite each other")]
    DuplicateWave(String),
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    if let Err(err) = run(cli.command) {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<(), AppError> {
    match command {
        Command::Run(args) => run_scoring(&args),
        Command::Validate(args) => run_validate(&args.study, &args.exclude),
    }
}

fn run_scoring(args: &RunArgs) -> Result<(), AppError> {
    let config = build_config(args);
    let out_dirs = wave_out_dirs(&args.out, &args.responses)?;
    let (mut model, mut questionnaire) = load_study(&args.study)?;
    exclude_constructs(&mut model, &mut questionnaire, &args.exclude)?;
    let meta = ToolMeta::current(Path::new("."));

    let Some((first, rest)) = args.responses.split_first() else {
        return Err(AppError::NoResponses);
    };
    let dataset = load_wave(first, &questionnaire)?;
    let mut study = Study::new(model, questionnaire, dataset, config);
    score_wave(&mut study, first, &out_dirs[0], &meta)?;

    for (path, out_dir) in rest.iter().zip(&out_dirs[1..]) {
        let dataset = load_wave(path, &study.questionnaire)?;
        study.replace_dataset(dataset);
        score_wave(&mut study, path, out_dir, &meta)?;
    }
    Ok(())
}

fn score_wave(study: &mut Study, responses: &Path, out_dir: &Path, meta: &ToolMeta) -> Result<(), AppError> {
    tracing::info!(
        wave = %responses.display(),
        respondents = study.dataset().n_rows(),
        "scoring wave"
    );
    let analysis = study.analyze(&PlsEstimator)?;
    write_reports(&analysis, &study.config, meta, out_dir)?;
    Ok(())
}

/// `out` itself for a single wave, `out/<file stem>` per wave otherwise.
fn wave_out_dirs(out: &Path, responses: &[PathBuf]) -> Result<Vec<PathBuf>, AppError> {
    if responses.len() <= 1 {
        return Ok(vec![out.to_path_buf(); responses.len()]);
    }
    let mut seen = HashSet::new();
    let mut dirs = Vec::with_capacity(responses.len());
    for path in responses {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !seen.insert(stem.clone()) {
            return Err(AppError::DuplicateWave(stem));
        }
        dirs.push(out.join(stem));
    }
    Ok(dirs)
}

fn run_validate(study_path: &Path, exclude: &[String]) -> Result<(), AppError> {
    let (mut model, mut questionnaire) = load_study(study_path)?;
    exclude_constructs(&mut model, &mut questionnaire, exclude)?;
    model.validate_for_scoring().map_err(ScoringError::from)?;
    questionnaire
        .validate_blocks()
        .map_err(ScoringError::from)?;
    tracing::info!(model = %model.name, "model can be scored");
    Ok(())
}

fn build_config(args: &RunArgs) -> ScoringConfig {
    let mut config = ScoringConfig::default_v1();
    config.scheme = args.scheme.into();
    if let Some(max_iter) = args.max_iter {
        config.max_iterations = max_iter;
    }
    if let Some(tolerance) = args.tolerance {
        config.tolerance = tolerance;
    }
    config
}

#[cfg(test)]
#[path = "../tests/src_inline/fixtures.rs"]
mod test_fixtures;

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
