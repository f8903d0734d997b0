use super::*;
use crate::model::{Questionnaire, StructuralModel};

fn utaut() -> StructuralModel {
    let mut model = StructuralModel::new("UTAUT");
    let pe = model.add_construct("Performance Expectancy", "PE", "").unwrap();
    let ee = model.add_construct("Effort Expectancy", "EE", "").unwrap();
    let si = model.add_construct("Social Influence", "SI", "").unwrap();
    let bi = model.add_construct("Behavioral Intention", "BI", "").unwrap();
    let ub = model.add_construct("Use Behavior", "UB", "").unwrap();
    model.add_relation(pe, bi).unwrap();
    model.add_relation(ee, bi).unwrap();
    model.add_relation(ee, pe).unwrap();
    model.add_relation(si, bi).unwrap();
    model.add_relation(bi, ub).unwrap();
    model
}

#[test]
fn test_paths_follow_model_and_relation_order() {
    let structure = build_path_structure(&utaut()).unwrap();
    assert_eq!(structure.latent, vec!["PE", "EE", "SI", "BI", "UB"]);
    assert_eq!(
        structure.paths,
        vec![
            PathEntry {
                source: "PE".to_string(),
                targets: vec!["BI".to_string()],
            },
            PathEntry {
                source: "EE".to_string(),
                targets: vec!["BI".to_string(), "PE".to_string()],
            },
            PathEntry {
                source: "SI".to_string(),
                targets: vec!["BI".to_string()],
            },
            PathEntry {
                source: "BI".to_string(),
                targets: vec!["UB".to_string()],
            },
        ]
    );
}

#[test]
fn test_sink_constructs_have_no_path_entry() {
    let structure = build_path_structure(&utaut()).unwrap();
    assert!(structure.paths.iter().all(|p| p.source != "UB"));
}

#[test]
fn test_path_matrix_and_adjacency() {
    let structure = build_path_structure(&utaut()).unwrap();
    let m = structure.path_matrix();
    let pe = structure.index_of("PE").unwrap();
    let ee = structure.index_of("EE").unwrap();
    let bi = structure.index_of("BI").unwrap();
    let ub = structure.index_of("UB").unwrap();

    assert_eq!(m[[bi, pe]], 1);
    assert_eq!(m[[pe, bi]], 0);
    assert_eq!(m[[pe, ee]], 1);
    assert_eq!(m[[ub, bi]], 1);
    assert_eq!(m.sum() as usize, 5);

    let adj = structure.adjacency();
    assert!(adj[[pe, bi]] && adj[[bi, pe]]);
    assert!(!adj[[pe, ub]]);
    assert!(!adj[[pe, pe]]);
}

#[test]
fn test_blocks_list_item_codes_per_construct() {
    let model = utaut();
    let mut questionnaire = Questionnaire::new(5).unwrap();
    questionnaire.sync_blocks(&model);
    let pe = model.find_by_abbreviation("PE").unwrap().id;
    questionnaire.add_item(pe, "Useful", false).unwrap();
    questionnaire.add_item(pe, "Faster", false).unwrap();

    let blocks = build_blocks(&model, &questionnaire);
    assert_eq!(blocks.len(), 5);
    assert_eq!(blocks[0].name, "PE");
    assert_eq!(blocks[0].columns, vec!["PE1", "PE2"]);
    assert!(blocks[1].columns.is_empty());
}
