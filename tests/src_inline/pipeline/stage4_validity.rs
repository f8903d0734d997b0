use approx::assert_abs_diff_eq;

use super::*;
use crate::stats::aggregate::correlation_matrix;
use crate::test_fixtures::{utaut_model, utaut_responses};
use crate::pipeline::stage1_structure::build_blocks;

fn block(name: &str, columns: &[&str]) -> LatentBlock {
    LatentBlock {
        name: name.to_string(),
        columns: columns.iter().map(|s| s.to_string()).collect(),
    }
}

fn codes(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn manual_corr(names: &[&str], values: Vec<f64>) -> CorrelationMatrix {
    let n = names.len();
    CorrelationMatrix {
        codes: codes(names),
        values: ndarray::Array2::from_shape_vec((n, n), values).unwrap(),
    }
}

#[test]
fn test_htmt_of_a_block_with_itself_is_one() {
    let (model, questionnaire) = utaut_model(3);
    let data = utaut_responses(&questionnaire, 200, 5);
    let corr = correlation_matrix(&data).unwrap();
    for b in build_blocks(&model, &questionnaire) {
        let ratio = heterotrait_monotrait(&b, &b, &corr).unwrap();
        assert_abs_diff_eq!(ratio, 1.0, epsilon = 1e-12);
    }
}

#[test]
fn test_htmt_by_hand_from_lower_triangle() {
    let nan = f64::NAN;
    // A1 A2 B1 B2, masked lower triangle
    let corr = manual_corr(
        &["A1", "A2", "B1", "B2"],
        vec![
            nan, nan, nan, nan, //
            0.6, nan, nan, nan, //
            0.3, 0.2, nan, nan, //
            -0.1, 0.4, 0.5, nan,
        ],
    );
    let a = block("A", &["A1", "A2"]);
    let b = block("B", &["B1", "B2"]);
    // hetero: |0.3| |0.2| |-0.1| |0.4| via the mirrored entries
    let expected = 0.25 / (0.6f64 * 0.5).sqrt();
    assert_abs_diff_eq!(
        heterotrait_monotrait(&a, &b, &corr).unwrap(),
        expected,
        epsilon = 1e-12
    );
    assert_abs_diff_eq!(
        heterotrait_monotrait(&b, &a, &corr).unwrap(),
        expected,
        epsilon = 1e-12
    );
}

#[test]
fn test_htmt_rejects_negative_within_block_correlation() {
    let nan = f64::NAN;
    // A2 was left unreversed, so the A block correlates negatively
    let corr = manual_corr(
        &["A1", "A2", "B1", "B2"],
        vec![
            nan, nan, nan, nan, //
            -0.8, nan, nan, nan, //
            0.3, 0.2, nan, nan, //
            -0.1, 0.4, 0.3, nan,
        ],
    );
    let a = block("A", &["A1", "A2"]);
    let b = block("B", &["B1", "B2"]);
    assert_eq!(
        heterotrait_monotrait(&a, &b, &corr),
        Err(NumericError::NonPositiveMonotrait {
            block: "A".to_string(),
            mean: -0.8
        })
    );
    assert!(matches!(
        heterotrait_monotrait(&b, &a, &corr),
        Err(NumericError::NonPositiveMonotrait { ref block, .. }) if block == "A"
    ));
    assert!(htmt_matrix(&[a, b], &corr).is_err());
}

#[test]
fn test_htmt_keeps_within_block_sign() {
    let nan = f64::NAN;
    // A1..A3: 0.6, 0.5 and -0.2 average to 0.3
    let corr = manual_corr(
        &["A1", "A2", "A3", "B1", "B2"],
        vec![
            nan, nan, nan, nan, nan, //
            0.6, nan, nan, nan, nan, //
            0.5, -0.2, nan, nan, nan, //
            0.2, 0.2, 0.2, nan, nan, //
            0.2, 0.2, 0.2, 0.4, nan,
        ],
    );
    let a = block("A", &["A1", "A2", "A3"]);
    let b = block("B", &["B1", "B2"]);
    assert_abs_diff_eq!(
        heterotrait_monotrait(&a, &b, &corr).unwrap(),
        0.2 / (0.3f64 * 0.4).sqrt(),
        epsilon = 1e-12
    );
}

#[test]
fn test_htmt_single_item_block_has_no_monotrait_pairs() {
    let nan = f64::NAN;
    let corr = manual_corr(
        &["A1", "A2", "B1"],
        vec![nan, nan, nan, 0.6, nan, nan, 0.3, 0.2, nan],
    );
    let a = block("A", &["A1", "A2"]);
    let b = block("B", &["B1"]);
    assert_eq!(
        heterotrait_monotrait(&a, &b, &corr),
        Err(NumericError::NoMonotraitPairs("B".to_string()))
    );
}

#[test]
fn test_htmt_unknown_item() {
    let nan = f64::NAN;
    let corr = manual_corr(&["A1", "A2"], vec![nan, nan, 0.6, nan]);
    let a = block("A", &["A1", "A2"]);
    let b = block("B", &["B1", "B2"]);
    assert!(matches!(
        heterotrait_monotrait(&a, &b, &corr),
        Err(NumericError::UnknownItem(_))
    ));
}

#[test]
fn test_htmt_matrix_blanks_from_first_unit_entry() {
    let (model, questionnaire) = utaut_model(3);
    let data = utaut_responses(&questionnaire, 300, 9);
    let corr = correlation_matrix(&data).unwrap();
    let blocks = build_blocks(&model, &questionnaire);
    let m = htmt_matrix(&blocks, &corr).unwrap();

    assert_eq!(m.constructs, vec!["PE", "EE", "SI", "BI"]);
    for (i, row) in m.values.iter().enumerate() {
        assert_eq!(row[i], None);
        for v in &row[i..] {
            assert_eq!(*v, None);
        }
        for v in row[..i].iter().flatten() {
            assert!(*v > 0.0 && *v < 1.0, "htmt {v}");
            assert_eq!(*v, round4(*v));
        }
    }
    assert!(m.get("BI", "PE").is_some());
    assert_eq!(m.get("PE", "BI"), None);
    assert_eq!(m.get("PE", "XX"), None);
}

#[test]
fn test_vif_is_at_least_one() {
    let (model, questionnaire) = utaut_model(3);
    let data = utaut_responses(&questionnaire, 250, 4);
    for b in build_blocks(&model, &questionnaire) {
        let vifs = outer_vif(&b, &data).unwrap();
        assert_eq!(vifs.len(), 3);
        for v in vifs {
            assert_eq!(v.block, b.name);
            assert!(v.vif >= 1.0, "{} vif {}", v.item, v.vif);
        }
    }
}

#[test]
fn test_vif_of_uncorrelated_pair_is_one() {
    let data = Dataset::from_columns(
        codes(&["A1", "A2"]),
        &[vec![1.0, 1.0, -1.0, -1.0], vec![1.0, -1.0, 1.0, -1.0]],
    )
    .unwrap();
    let vifs = outer_vif(&block("A", &["A1", "A2"]), &data).unwrap();
    for v in vifs {
        assert_abs_diff_eq!(v.vif, 1.0, epsilon = 1e-9);
    }
}

#[test]
fn test_vif_needs_two_columns() {
    let data = Dataset::from_columns(codes(&["A1"]), &[vec![1.0, 2.0, 3.0]]).unwrap();
    assert_eq!(
        outer_vif(&block("A", &["A1"]), &data),
        Err(NumericError::InsufficientColumns {
            block: "A".to_string(),
            found: 1
        })
    );
}

#[test]
fn test_vif_perfect_collinearity() {
    let data = Dataset::from_columns(
        codes(&["A1", "A2", "A3"]),
        &[
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
            vec![2.0, 1.0, 2.0, 5.0, 3.0],
            vec![3.0, 3.0, 5.0, 9.0, 8.0],
        ],
    )
    .unwrap();
    assert!(matches!(
        outer_vif(&block("A", &["A1", "A2", "A3"]), &data),
        Err(NumericError::PerfectCollinearity(_))
    ));
}

#[test]
fn test_vif_constant_item() {
    let data = Dataset::from_columns(
        codes(&["A1", "A2"]),
        &[vec![3.0, 3.0, 3.0], vec![1.0, 2.0, 3.0]],
    )
    .unwrap();
    assert_eq!(
        outer_vif(&block("A", &["A1", "A2"]), &data),
        Err(NumericError::ZeroVariance("A1".to_string()))
    );
}
