use clap::Parser;

use super::*;

fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(std::iter::once("utaut-plsqc").chain(args.iter().copied()))
}

fn run_args(cli: Cli) -> RunArgs {
    match cli.command {
        Command::Run(args) => args,
        other => panic!("expected run, got {other:?}"),
    }
}

#[test]
fn test_run_defaults() {
    let cli = parse(&[
        "run",
        "--study",
        "study.json",
        "--responses",
        "answers.csv",
        "--out",
        "out",
    ])
    .unwrap();
    assert!(!cli.verbose);
    let args = run_args(cli);
    assert_eq!(args.study, PathBuf::from("study.json"));
    assert_eq!(args.responses, vec![PathBuf::from("answers.csv")]);
    assert!(args.exclude.is_empty());
    assert_eq!(args.scheme, SchemeArg::Centroid);

    let config = build_config(&args);
    assert_eq!(config.scheme, InnerScheme::Centroid);
    assert_eq!(config.max_iterations, 100);
    assert_eq!(config.tolerance, 1e-6);
}

#[test]
fn test_run_overrides() {
    let cli = parse(&[
        "--verbose",
        "run",
        "--study",
        "s.json",
        "--responses",
        "r.csv",
        "--out",
        "o",
        "--scheme",
        "factorial",
        "--max-iter",
        "300",
        "--tolerance",
        "1e-8",
    ])
    .unwrap();
    assert!(cli.verbose);
    let config = build_config(&run_args(cli));
    assert_eq!(config.scheme, InnerScheme::Factorial);
    assert_eq!(config.max_iterations, 300);
    assert_eq!(config.tolerance, 1e-8);
}

#[test]
fn test_run_requires_paths() {
    assert!(parse(&["run", "--study", "s.json"]).is_err());
    assert!(parse(&["run", "--study", "s.json", "--responses", "r.csv", "--out", "o", "--scheme", "path"]).is_err());
}

#[test]
fn test_run_accepts_waves_and_exclusions() {
    let args = run_args(
        parse(&[
            "run", "--study", "s.json", "--responses", "w1.csv", "--responses", "w2.csv", "--out",
            "o", "--exclude", "SI", "--exclude", "FC",
        ])
        .unwrap(),
    );
    assert_eq!(args.responses, vec![PathBuf::from("w1.csv"), PathBuf::from("w2.csv")]);
    assert_eq!(args.exclude, vec!["SI", "FC"]);
}

#[test]
fn test_wave_output_directories() {
    let out = Path::new("out");
    assert_eq!(
        wave_out_dirs(out, &[PathBuf::from("data/r.csv")]).unwrap(),
        vec![PathBuf::from("out")]
    );
    assert_eq!(
        wave_out_dirs(out, &[PathBuf::from("a/w1.csv"), PathBuf::from("b/w2.csv")]).unwrap(),
        vec![PathBuf::from("out/w1"), PathBuf::from("out/w2")]
    );
    assert!(matches!(
        wave_out_dirs(out, &[PathBuf::from("a/w.csv"), PathBuf::from("b/w.csv")]),
        Err(AppError::DuplicateWave(ref s)) if s == "w"
    ));
}

#[test]
fn test_validate_subcommand() {
    let cli = parse(&["validate", "--study", "s.json", "--verbose"]).unwrap();
    assert!(cli.verbose);
    match cli.command {
        Command::Validate(args) => {
            assert_eq!(args.study, PathBuf::from("s.json"));
            assert!(args.exclude.is_empty());
        }
        other => panic!("expected validate, got {other:?}"),
    }
}

#[test]
fn test_validate_missing_study_fails() {
    let err = run_validate(Path::new("/nonexistent/plsqc/study.json"), &[]).unwrap_err();
    assert!(matches!(err, AppError::Input(InputError::Io { .. })));
}
