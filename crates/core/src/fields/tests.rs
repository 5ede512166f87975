#![forbid(unsafe_code)]

use super::*;
use crate::model::InspectionResult;
use serde_json::json;

#[test]
fn kind_parts_round_trip_choice_options() {
    let kind = FieldKind::from_parts(
        "select",
        json!({"choices": ["Yes", "Partial", "No"], "allowOther": false}),
    )
    .expect("decode select");
    assert_eq!(kind.type_tag(), "select");
    let FieldKind::Select(ref opts) = kind else {
        panic!("expected select kind");
    };
    assert_eq!(opts.choices, vec!["Yes", "Partial", "No"]);

    let encoded = kind.options_value();
    assert_eq!(encoded["choices"], json!(["Yes", "Partial", "No"]));
    let decoded = FieldKind::from_parts("select", encoded).expect("re-decode");
    assert_eq!(decoded, kind);
}

#[test]
fn kind_defaults_apply_when_options_missing() {
    let kind = FieldKind::from_parts("rating", serde_json::Value::Null).expect("decode rating");
    let FieldKind::Rating(opts) = kind else {
        panic!("expected rating kind");
    };
    assert_eq!(opts.max_rating, 5);
    assert!(!opts.allow_half_stars);
}

#[test]
fn unknown_tag_is_preserved_not_rejected() {
    let options = json!({"signatureKind": "drawn"});
    let kind = FieldKind::from_parts("signature", options.clone()).expect("decode unknown");
    assert!(!kind.is_known());
    assert_eq!(kind.type_tag(), "signature");
    assert_eq!(kind.options_value(), options);
    // Unknown kinds still count as inputs so their answers are never dropped.
    assert!(kind.is_input());
}

#[test]
fn malformed_options_are_an_error() {
    let result = FieldKind::from_parts("number", json!({"minValue": "not a number"}));
    assert!(result.is_err());
}

#[test]
fn required_is_forced_off_for_presentation_kinds() {
    let section = FieldDef::new("FLD-1", "Checks", FieldKind::Section).required(true);
    assert!(!section.required);
    let text = FieldDef::new("FLD-2", "Name", FieldKind::Text(TextOptions::default()))
        .required(true);
    assert!(text.required);
}

#[test]
fn list_move_renumbers_every_sibling() {
    let mut list = FieldList::from_vec(vec![
        FieldDef::new("a", "A", FieldKind::Text(TextOptions::default())),
        FieldDef::new("b", "B", FieldKind::Checkbox),
        FieldDef::new("c", "C", FieldKind::Divider),
    ]);
    list.move_field(2, 0).expect("move");
    assert_eq!(list.ids(), vec!["c", "a", "b"]);
    assert_eq!(list.position_of("c"), Some(0));
    assert_eq!(list.position_of("b"), Some(2));
}

#[test]
fn list_rejects_out_of_bounds() {
    let mut list = FieldList::from_vec(vec![FieldDef::new(
        "a",
        "A",
        FieldKind::Text(TextOptions::default()),
    )]);
    assert!(matches!(
        list.move_field(0, 3),
        Err(FieldListError::IndexOutOfBounds { index: 3, len: 1 })
    ));
    assert!(list.remove(5).is_err());
    assert!(
        list.insert(2, FieldDef::new("b", "B", FieldKind::Checkbox))
            .is_err()
    );
}

#[test]
fn answers_round_trip_every_shape() {
    let mut answers = Answers::new();
    answers.insert("f1", AnswerValue::Text("ok".to_string()));
    answers.insert("f2", AnswerValue::Number(21.5));
    answers.insert("f3", AnswerValue::Bool(true));
    answers.insert(
        "f4",
        AnswerValue::List(vec!["a".to_string(), "b".to_string()]),
    );
    answers.insert(
        "f5",
        AnswerValue::Inspection {
            result: InspectionResult::Fail,
            comment: Some("belt worn".to_string()),
        },
    );

    let round_tripped = Answers::from_value(&answers.to_value()).expect("decode answers");
    assert_eq!(round_tripped, answers);
}

#[test]
fn answers_reject_non_string_arrays() {
    let result = Answers::from_value(&json!({"f1": [1, 2]}));
    assert!(result.is_err());
}

#[test]
fn inspection_answer_requires_known_result() {
    let result = Answers::from_value(&json!({"f1": {"value": "maybe"}}));
    assert!(matches!(
        result,
        Err(AnswerDecodeError::BadInspectionValue { .. })
    ));
}
