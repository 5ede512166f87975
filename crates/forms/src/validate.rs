#![forbid(unsafe_code)]

//! Answer validation against a procedure's field list.
//!
//! This is the single place that knows what a well-formed answer-set looks
//! like. The persistence gateway does not call it; the service surface runs
//! it before submitting an execution and refuses on issues.

use pk_core::fields::{AnswerValue, Answers, FieldDef, FieldKind, FieldList};
use time::macros::format_description;
use time::{Date, PrimitiveDateTime, Time};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field_id: String,
    pub code: &'static str,
    pub message: String,
}

impl ValidationIssue {
    fn new(field_id: &str, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            field_id: field_id.to_string(),
            code,
            message: message.into(),
        }
    }
}

/// Validates a full answer-set: every answer key must belong to the field
/// list, required inputs must be answered, and each answer must satisfy its
/// field's constraints.
pub fn validate_answers(fields: &FieldList, answers: &Answers) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for field_id in answers.keys() {
        if !fields.contains_id(field_id) {
            issues.push(ValidationIssue::new(
                field_id,
                "unknown_field",
                "answer does not match any field of the procedure",
            ));
        }
    }

    for field in fields {
        issues.extend(validate_answer(field, answers.get(&field.id)));
    }

    issues
}

/// Validates one field's answer (or its absence).
pub fn validate_answer(field: &FieldDef, answer: Option<&AnswerValue>) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let Some(answer) = answer else {
        if field.required && !is_blank_allowed(&field.kind) {
            issues.push(ValidationIssue::new(
                &field.id,
                "required",
                format!("\"{}\" is required", field.label),
            ));
        }
        return issues;
    };

    if !field.kind.is_input() {
        issues.push(ValidationIssue::new(
            &field.id,
            "not_an_input",
            format!("\"{}\" does not take an answer", field.label),
        ));
        return issues;
    }

    match &field.kind {
        FieldKind::Text(_) | FieldKind::Textarea(_) => {
            if let Some(text) = expect_text(field, answer, &mut issues)
                && field.required
                && text.trim().is_empty()
            {
                issues.push(ValidationIssue::new(
                    &field.id,
                    "required",
                    format!("\"{}\" is required", field.label),
                ));
            }
        }
        FieldKind::Email(_) => {
            if let Some(text) = expect_text(field, answer, &mut issues) {
                let (local, domain) = text.split_once('@').unwrap_or(("", ""));
                if local.is_empty() || domain.is_empty() || !domain.contains('.') {
                    issues.push(ValidationIssue::new(
                        &field.id,
                        "bad_email",
                        "not a valid email address",
                    ));
                }
            }
        }
        FieldKind::Url(_) => {
            if let Some(text) = expect_text(field, answer, &mut issues)
                && !(text.starts_with("http://") || text.starts_with("https://"))
            {
                issues.push(ValidationIssue::new(
                    &field.id,
                    "bad_url",
                    "url must start with http:// or https://",
                ));
            }
        }
        FieldKind::Phone(_) => {
            if let Some(text) = expect_text(field, answer, &mut issues) {
                let digits = text.chars().filter(char::is_ascii_digit).count();
                let shape_ok = text
                    .chars()
                    .all(|ch| ch.is_ascii_digit() || matches!(ch, '+' | '-' | '(' | ')' | ' '));
                if digits < 5 || !shape_ok {
                    issues.push(ValidationIssue::new(
                        &field.id,
                        "bad_phone",
                        "not a valid phone number",
                    ));
                }
            }
        }
        FieldKind::Number(opts) | FieldKind::Slider(opts) => {
            if let AnswerValue::Number(number) = answer {
                check_numeric_bounds(field, *number, opts, &mut issues);
            } else {
                issues.push(type_mismatch(field, "a numeric answer"));
            }
        }
        FieldKind::Checkbox => {
            if !matches!(answer, AnswerValue::Bool(_)) {
                issues.push(type_mismatch(field, "a boolean answer"));
            }
        }
        FieldKind::Select(opts) | FieldKind::Radio(opts) => {
            if let Some(text) = expect_text(field, answer, &mut issues)
                && !opts.choices.iter().any(|choice| choice == text)
            {
                issues.push(ValidationIssue::new(
                    &field.id,
                    "bad_choice",
                    format!("\"{text}\" is not one of the configured choices"),
                ));
            }
        }
        FieldKind::Multiselect(opts) => {
            if let AnswerValue::List(selected) = answer {
                if !opts.allow_other {
                    for entry in selected {
                        if !opts.choices.iter().any(|choice| choice == entry) {
                            issues.push(ValidationIssue::new(
                                &field.id,
                                "bad_choice",
                                format!("\"{entry}\" is not one of the configured choices"),
                            ));
                        }
                    }
                }
                if field.required && selected.is_empty() {
                    issues.push(ValidationIssue::new(
                        &field.id,
                        "required",
                        format!("\"{}\" is required", field.label),
                    ));
                }
            } else {
                issues.push(type_mismatch(field, "a list answer"));
            }
        }
        FieldKind::Date(opts) => {
            if let Some(text) = expect_text(field, answer, &mut issues) {
                check_temporal(field, text, opts, parse_date, "date", &mut issues);
            }
        }
        FieldKind::Time(opts) => {
            if let Some(text) = expect_text(field, answer, &mut issues) {
                check_temporal(field, text, opts, parse_time, "time", &mut issues);
            }
        }
        FieldKind::Datetime(opts) => {
            if let Some(text) = expect_text(field, answer, &mut issues) {
                check_temporal(field, text, opts, parse_datetime, "datetime", &mut issues);
            }
        }
        FieldKind::File(opts) | FieldKind::Image(opts) => {
            let names: Vec<&str> = match answer {
                AnswerValue::Text(name) => vec![name.as_str()],
                AnswerValue::List(names) => names.iter().map(String::as_str).collect(),
                _ => {
                    issues.push(type_mismatch(field, "a file answer"));
                    return issues;
                }
            };
            if !opts.allow_multiple_files && names.len() > 1 {
                issues.push(ValidationIssue::new(
                    &field.id,
                    "too_many_files",
                    "field does not allow multiple files",
                ));
            }
            for name in names {
                if !file_name_allowed(name, &opts.allowed_types) {
                    issues.push(ValidationIssue::new(
                        &field.id,
                        "bad_file_type",
                        format!("\"{name}\" is not an allowed file type"),
                    ));
                }
            }
        }
        FieldKind::Rating(opts) => {
            if let AnswerValue::Number(number) = answer {
                let doubled = number * 2.0;
                let step_ok = if opts.allow_half_stars {
                    doubled.fract() == 0.0
                } else {
                    number.fract() == 0.0
                };
                if !step_ok || *number < 1.0 || *number > f64::from(opts.max_rating) {
                    issues.push(ValidationIssue::new(
                        &field.id,
                        "bad_rating",
                        format!("rating must be between 1 and {}", opts.max_rating),
                    ));
                }
            } else {
                issues.push(type_mismatch(field, "a numeric answer"));
            }
        }
        FieldKind::Inspection(opts) => {
            if let AnswerValue::Inspection { result, comment } = answer {
                let comment_missing =
                    comment.as_deref().map(str::trim).unwrap_or("").is_empty();
                if opts.allow_comments
                    && opts.require_comment_on_fail
                    && result.needs_attention()
                    && comment_missing
                {
                    issues.push(ValidationIssue::new(
                        &field.id,
                        "comment_required",
                        format!("a comment is required when the result is {}", result.as_str()),
                    ));
                }
            } else {
                issues.push(type_mismatch(field, "an inspection answer"));
            }
        }
        // Unknown kinds accept whatever was stored; flagging them is the
        // renderer's job.
        FieldKind::Unknown { .. } => {}
        FieldKind::Section | FieldKind::Divider | FieldKind::Info(_) => {}
    }

    issues
}

fn is_blank_allowed(kind: &FieldKind) -> bool {
    !kind.is_input()
}

fn type_mismatch(field: &FieldDef, expected: &str) -> ValidationIssue {
    ValidationIssue::new(
        &field.id,
        "type_mismatch",
        format!("\"{}\" expects {expected}", field.label),
    )
}

fn expect_text<'a>(
    field: &FieldDef,
    answer: &'a AnswerValue,
    issues: &mut Vec<ValidationIssue>,
) -> Option<&'a str> {
    match answer {
        AnswerValue::Text(text) => Some(text.as_str()),
        _ => {
            issues.push(type_mismatch(field, "a text answer"));
            None
        }
    }
}

fn check_numeric_bounds(
    field: &FieldDef,
    number: f64,
    opts: &pk_core::fields::NumberOptions,
    issues: &mut Vec<ValidationIssue>,
) {
    if let Some(min) = opts.min_value
        && number < min
    {
        issues.push(ValidationIssue::new(
            &field.id,
            "below_minimum",
            format!("value must be at least {min}"),
        ));
    }
    if let Some(max) = opts.max_value
        && number > max
    {
        issues.push(ValidationIssue::new(
            &field.id,
            "above_maximum",
            format!("value must be at most {max}"),
        ));
    }
    if let Some(step) = opts.step
        && step > 0.0
    {
        let origin = opts.min_value.unwrap_or(0.0);
        let steps = (number - origin) / step;
        if (steps - steps.round()).abs() > 1e-9 {
            issues.push(ValidationIssue::new(
                &field.id,
                "off_step",
                format!("value must move in steps of {step}"),
            ));
        }
    }
}

fn check_temporal<T: PartialOrd>(
    field: &FieldDef,
    text: &str,
    opts: &pk_core::fields::DateOptions,
    parse: fn(&str) -> Option<T>,
    what: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    let Some(value) = parse(text) else {
        issues.push(ValidationIssue::new(
            &field.id,
            "bad_format",
            format!("\"{text}\" is not a valid {what}"),
        ));
        return;
    };
    if let Some(min) = opts.min_date.as_deref().and_then(parse)
        && value < min
    {
        issues.push(ValidationIssue::new(
            &field.id,
            "before_minimum",
            format!("{what} is before the earliest allowed"),
        ));
    }
    if let Some(max) = opts.max_date.as_deref().and_then(parse)
        && value > max
    {
        issues.push(ValidationIssue::new(
            &field.id,
            "after_maximum",
            format!("{what} is after the latest allowed"),
        ));
    }
}

fn parse_date(text: &str) -> Option<Date> {
    Date::parse(text, format_description!("[year]-[month]-[day]")).ok()
}

fn parse_time(text: &str) -> Option<Time> {
    Time::parse(text, format_description!("[hour]:[minute]")).ok()
}

fn parse_datetime(text: &str) -> Option<PrimitiveDateTime> {
    PrimitiveDateTime::parse(
        text,
        format_description!("[year]-[month]-[day]T[hour]:[minute]"),
    )
    .ok()
}

fn file_name_allowed(name: &str, allowed: &[String]) -> bool {
    if allowed.is_empty() {
        return true;
    }
    let name_lower = name.to_ascii_lowercase();
    allowed.iter().any(|entry| {
        let entry = entry.trim();
        if let Some(suffix) = entry.strip_prefix('.') {
            name_lower.ends_with(&format!(".{}", suffix.to_ascii_lowercase()))
        } else {
            // MIME entries cannot be checked against a bare file name.
            entry.contains('/')
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pk_core::fields::{
        AnswerValue, Answers, ChoiceOptions, DateOptions, FieldDef, FieldKind, FileOptions,
        InspectionOptions, NumberOptions, RatingOptions, TextOptions,
    };
    use pk_core::model::InspectionResult;

    fn codes(issues: &[ValidationIssue]) -> Vec<&'static str> {
        issues.iter().map(|issue| issue.code).collect()
    }

    #[test]
    fn missing_required_answer_is_an_issue() {
        let field = FieldDef::new("f1", "Equipment ID", FieldKind::Text(TextOptions::default()))
            .required(true);
        let issues = validate_answer(&field, None);
        assert_eq!(codes(&issues), vec!["required"]);
    }

    #[test]
    fn optional_fields_accept_absence() {
        let field = FieldDef::new("f1", "Notes", FieldKind::Textarea(TextOptions::default()));
        assert!(validate_answer(&field, None).is_empty());
    }

    #[test]
    fn answer_keys_must_be_a_subset_of_field_ids() {
        let fields = FieldList::from_vec(vec![FieldDef::new(
            "f1",
            "Notes",
            FieldKind::Text(TextOptions::default()),
        )]);
        let mut answers = Answers::new();
        answers.insert("ghost", AnswerValue::Text("boo".to_string()));
        let issues = validate_answers(&fields, &answers);
        assert_eq!(codes(&issues), vec!["unknown_field"]);
    }

    #[test]
    fn choice_answers_must_match_configured_choices() {
        let field = FieldDef::new(
            "f1",
            "Guards",
            FieldKind::Select(ChoiceOptions {
                choices: vec!["Yes".to_string(), "No".to_string()],
                allow_other: false,
            }),
        );
        let issues = validate_answer(&field, Some(&AnswerValue::Text("Maybe".to_string())));
        assert_eq!(codes(&issues), vec!["bad_choice"]);
    }

    #[test]
    fn multiselect_allow_other_admits_free_text() {
        let field = FieldDef::new(
            "f1",
            "Symptoms",
            FieldKind::Multiselect(ChoiceOptions {
                choices: vec!["Noise".to_string()],
                allow_other: true,
            }),
        );
        let answer = AnswerValue::List(vec!["Noise".to_string(), "Smoke".to_string()]);
        assert!(validate_answer(&field, Some(&answer)).is_empty());
    }

    #[test]
    fn number_bounds_and_step_are_enforced() {
        let field = FieldDef::new(
            "f1",
            "Pressure",
            FieldKind::Number(NumberOptions {
                min_value: Some(0.0),
                max_value: Some(10.0),
                step: Some(0.5),
            }),
        );
        assert!(validate_answer(&field, Some(&AnswerValue::Number(7.5))).is_empty());
        assert_eq!(
            codes(&validate_answer(&field, Some(&AnswerValue::Number(10.2)))),
            vec!["above_maximum", "off_step"]
        );
        assert_eq!(
            codes(&validate_answer(&field, Some(&AnswerValue::Number(-1.0)))),
            vec!["below_minimum"]
        );
    }

    #[test]
    fn date_bounds_are_enforced() {
        let field = FieldDef::new(
            "f1",
            "Service date",
            FieldKind::Date(DateOptions {
                min_date: Some("2024-01-01".to_string()),
                max_date: Some("2024-12-31".to_string()),
                default_today: false,
            }),
        );
        assert!(
            validate_answer(&field, Some(&AnswerValue::Text("2024-06-15".to_string())))
                .is_empty()
        );
        assert_eq!(
            codes(&validate_answer(
                &field,
                Some(&AnswerValue::Text("2025-01-01".to_string()))
            )),
            vec!["after_maximum"]
        );
        assert_eq!(
            codes(&validate_answer(
                &field,
                Some(&AnswerValue::Text("15/06/2024".to_string()))
            )),
            vec!["bad_format"]
        );
    }

    #[test]
    fn rating_respects_half_star_configuration() {
        let whole = FieldDef::new("f1", "Condition", FieldKind::Rating(RatingOptions::default()));
        assert_eq!(
            codes(&validate_answer(&whole, Some(&AnswerValue::Number(3.5)))),
            vec!["bad_rating"]
        );
        let halves = FieldDef::new(
            "f1",
            "Condition",
            FieldKind::Rating(RatingOptions {
                max_rating: 5,
                allow_half_stars: true,
            }),
        );
        assert!(validate_answer(&halves, Some(&AnswerValue::Number(3.5))).is_empty());
        assert_eq!(
            codes(&validate_answer(&halves, Some(&AnswerValue::Number(5.5)))),
            vec!["bad_rating"]
        );
    }

    #[test]
    fn inspection_fail_without_comment_is_rejected_when_configured() {
        let field = FieldDef::new(
            "f1",
            "Belt guard",
            FieldKind::Inspection(InspectionOptions {
                allow_comments: true,
                require_comment_on_fail: true,
            }),
        );
        let silent_fail = AnswerValue::Inspection {
            result: InspectionResult::Fail,
            comment: None,
        };
        assert_eq!(
            codes(&validate_answer(&field, Some(&silent_fail))),
            vec!["comment_required"]
        );

        let explained_fail = AnswerValue::Inspection {
            result: InspectionResult::Fail,
            comment: Some("belt cracked".to_string()),
        };
        assert!(validate_answer(&field, Some(&explained_fail)).is_empty());

        let pass = AnswerValue::Inspection {
            result: InspectionResult::Pass,
            comment: None,
        };
        assert!(validate_answer(&field, Some(&pass)).is_empty());
    }

    #[test]
    fn file_multiplicity_and_extensions_are_checked() {
        let field = FieldDef::new(
            "f1",
            "Report",
            FieldKind::File(FileOptions {
                max_file_size: None,
                allow_multiple_files: false,
                allowed_types: vec![".pdf".to_string()],
            }),
        );
        let two = AnswerValue::List(vec!["a.pdf".to_string(), "b.pdf".to_string()]);
        assert_eq!(codes(&validate_answer(&field, Some(&two))), vec!["too_many_files"]);
        let wrong = AnswerValue::Text("scan.png".to_string());
        assert_eq!(codes(&validate_answer(&field, Some(&wrong))), vec!["bad_file_type"]);
        let ok = AnswerValue::Text("scan.PDF".to_string());
        assert!(validate_answer(&field, Some(&ok)).is_empty());
    }

    #[test]
    fn answering_a_presentation_field_is_an_issue() {
        let field = FieldDef::new("f1", "Section", FieldKind::Section);
        let issues = validate_answer(&field, Some(&AnswerValue::Text("stray".to_string())));
        assert_eq!(codes(&issues), vec!["not_an_input"]);
    }
}
