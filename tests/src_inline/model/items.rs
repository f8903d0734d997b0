use super::*;

fn model_and_questionnaire() -> (StructuralModel, Questionnaire, ConstructId, ConstructId) {
    let mut model = StructuralModel::new("m");
    let pe = model.add_construct("Performance Expectancy", "PE", "").unwrap();
    let ee = model.add_construct("Effort Expectancy", "EE", "").unwrap();
    let mut questionnaire = Questionnaire::new(5).unwrap();
    questionnaire.sync_blocks(&model);
    (model, questionnaire, pe, ee)
}

#[test]
fn test_item_codes_are_generated_per_block() {
    let (_, mut q, pe, ee) = model_and_questionnaire();
    assert_eq!(q.add_item(pe, "Useful in my job", false).unwrap(), "PE1");
    assert_eq!(q.add_item(pe, "Faster tasks", false).unwrap(), "PE2");
    assert_eq!(q.add_item(ee, "Easy to learn", false).unwrap(), "EE1");
    assert_eq!(q.add_item(pe, "More productive", true).unwrap(), "PE3");

    assert_eq!(q.item_codes(), vec!["PE1", "PE2", "PE3", "EE1"]);
    assert_eq!(q.block(ee).unwrap().codes(), vec!["EE1"]);
    assert!(q.item("PE3").unwrap().reversed);
}

#[test]
fn test_every_code_starts_with_its_abbreviation() {
    let (model, mut q, pe, ee) = model_and_questionnaire();
    q.add_item(pe, "a", false).unwrap();
    q.add_item(ee, "b", false).unwrap();
    for block in q.blocks() {
        let abbreviation = &model.get(block.construct).unwrap().abbreviation;
        for item in &block.items {
            assert!(item.code.starts_with(abbreviation.as_str()));
        }
    }
}

#[test]
fn test_duplicate_question_rejected() {
    let (_, mut q, pe, _) = model_and_questionnaire();
    q.add_item(pe, "Useful in my job", false).unwrap();
    assert!(matches!(
        q.add_item(pe, "Useful in my job", true),
        Err(QuestionnaireError::DuplicateQuestion { .. })
    ));
}

#[test]
fn test_sync_blocks_follows_model() {
    let (mut model, mut q, pe, ee) = model_and_questionnaire();
    q.add_item(pe, "Useful", false).unwrap();
    model.remove_construct(ee).unwrap();
    let si = model.add_construct("Social Influence", "SI", "").unwrap();
    q.sync_blocks(&model);

    assert_eq!(q.blocks().len(), 2);
    assert_eq!(q.block(pe).unwrap().items.len(), 1);
    assert!(q.block(si).unwrap().items.is_empty());
    assert_eq!(q.block(ee), Err(QuestionnaireError::UnknownBlock(ee)));
    assert_eq!(
        q.validate_blocks(),
        Err(QuestionnaireError::EmptyBlock("SI".to_string()))
    );
}

#[test]
fn test_reverse_value_and_scale() {
    assert_eq!(reverse_value(1, 5), 5);
    assert_eq!(reverse_value(5, 5), 1);
    assert_eq!(reverse_value(3, 5), 3);
    assert_eq!(reverse_value(2, 7), 6);
    assert_eq!(Questionnaire::new(1).unwrap_err(), QuestionnaireError::InvalidScale(1));
}
