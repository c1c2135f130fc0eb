//! Field rule interpreter.

use crate::domain::Record;
use crate::validation::result::ValidationResult;
use crate::validation::rule::{Constraint, FieldRule, FieldType};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as JsonValue;

static DATE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date shape regex"));
static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email shape regex"));

/// Evaluates `record` against `rules` in declaration order.
pub fn validate(record: &Record, rules: &[FieldRule]) -> ValidationResult {
    let mut errors = Vec::new();
    for rule in rules {
        check_field(record, rule, &mut errors);
    }
    ValidationResult::from_errors(errors)
}

/// Derives the update-mode rule set: every rule kept, none required.
pub fn to_optional(rules: &[FieldRule]) -> Vec<FieldRule> {
    rules.iter().map(FieldRule::as_optional).collect()
}

/// Absent, `null` and blank strings all count as "no value".
pub fn is_blank(value: Option<&JsonValue>) -> bool {
    match value {
        None | Some(JsonValue::Null) => true,
        Some(JsonValue::String(s)) => s.trim().is_empty(),
        _ => false,
    }
}

/// Numeric view of a value. Numeric strings are accepted since form posts send them.
pub fn as_number(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        JsonValue::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Strict `YYYY-MM-DD` that round-trips through calendar parsing.
pub fn parse_date(value: &JsonValue) -> Option<NaiveDate> {
    let s = value.as_str()?;
    if !DATE_SHAPE.is_match(s) {
        return None;
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    (date.format("%Y-%m-%d").to_string() == s).then_some(date)
}

/// Text form used by pattern checks and messages (strings unquoted).
pub fn value_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn check_field(record: &Record, rule: &FieldRule, errors: &mut Vec<String>) {
    let value = match record.get(rule.field) {
        Some(v) if !is_blank(Some(v)) => v,
        present => {
            // an update may omit a required field but never blank it out
            if rule.required || (rule.was_required && present.is_some()) {
                errors.push(format!("{} is required", rule.field));
            }
            return;
        }
    };

    let mut ordered: Vec<&Constraint> = rule.constraints.iter().collect();
    ordered.sort_by_key(|c| c.stage());

    for constraint in ordered {
        if let Some(error) = apply(constraint, rule.field, value, record) {
            errors.push(error);
        }
    }
}

fn apply(constraint: &Constraint, field: &str, value: &JsonValue, record: &Record) -> Option<String> {
    match constraint {
        Constraint::Type(field_type) => (!matches_type(*field_type, value))
            .then(|| format!("{} must be a valid {}", field, field_type.label())),
        Constraint::Length { min, max } => {
            let len = value.as_str()?.chars().count();
            if let Some(min) = min.filter(|m| len < *m) {
                return Some(format!("{} must be at least {} characters", field, min));
            }
            max.filter(|m| len > *m)
                .map(|max| format!("{} must be at most {} characters", field, max))
        }
        Constraint::Range { min, max } => {
            let n = as_number(value)?;
            if let Some(min) = min.filter(|m| n < *m) {
                return Some(format!("{} must be at least {}", field, format_number(min)));
            }
            max.filter(|m| n > *m)
                .map(|max| format!("{} must be at most {}", field, format_number(max)))
        }
        Constraint::Pattern { regex, message } => (!regex.is_match(&value_text(value))).then(|| {
            message
                .map(str::to_string)
                .unwrap_or_else(|| format!("{} has an invalid format", field))
        }),
        Constraint::OneOf(allowed) => {
            let ok = value.as_str().map(|s| allowed.contains(&s)).unwrap_or(false);
            (!ok).then(|| format!("{} must be one of: {}", field, allowed.join(", ")))
        }
        Constraint::Custom(predicate) => predicate(value, record),
    }
}

fn matches_type(field_type: FieldType, value: &JsonValue) -> bool {
    match field_type {
        FieldType::String => value.is_string(),
        FieldType::Number => as_number(value).is_some(),
        FieldType::Integer => as_number(value).map(|n| n.fract() == 0.0).unwrap_or(false),
        FieldType::Boolean => matches!(value, JsonValue::Bool(_))
            || matches!(value.as_str(), Some("true") | Some("false")),
        FieldType::Date => parse_date(value).is_some(),
        FieldType::Email => value.as_str().map(|s| EMAIL_SHAPE.is_match(s)).unwrap_or(false),
        FieldType::Phone => {
            if !(value.is_string() || value.is_number()) {
                return false;
            }
            let digits = value_text(value).chars().filter(|c| c.is_ascii_digit()).count();
            (8..=15).contains(&digits)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());

    fn record(value: JsonValue) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn no_dashes(value: &JsonValue, _record: &Record) -> Option<String> {
        value_text(value)
            .contains('-')
            .then(|| "codigo cannot contain dashes".to_string())
    }

    fn rules() -> Vec<FieldRule> {
        vec![
            FieldRule::required("nombre").of_type(FieldType::String).length(2, 10),
            FieldRule::required("codigo")
                .of_type(FieldType::String)
                .length(3, 6)
                .pattern(&DIGITS, "codigo must contain only digits"),
            FieldRule::optional("peso").of_type(FieldType::Number).range(0.0, 15.0),
            FieldRule::optional("sexo").of_type(FieldType::String).one_of(&["macho", "hembra"]),
        ]
    }

    #[test]
    fn passing_record_is_valid() {
        let result = validate(
            &record(json!({ "nombre": "Clara", "codigo": "1234", "peso": 2.5, "sexo": "hembra" })),
            &rules(),
        );
        assert!(result.is_valid());
        assert!(result.errors().is_empty());
    }

    #[test]
    fn missing_required_yields_exactly_one_error() {
        let result = validate(&record(json!({ "codigo": "1234" })), &rules());
        assert!(!result.is_valid());
        assert_eq!(result.errors(), ["nombre is required"]);
    }

    #[test]
    fn blank_and_null_count_as_missing() {
        let result = validate(&record(json!({ "nombre": "   ", "codigo": null })), &rules());
        assert_eq!(result.errors(), ["nombre is required", "codigo is required"]);
    }

    #[test]
    fn absent_optional_field_is_skipped() {
        let result = validate(&record(json!({ "nombre": "Clara", "codigo": "123" })), &rules());
        assert!(result.is_valid());
    }

    #[test]
    fn every_failed_category_reports_once() {
        let result = validate(&record(json!({ "nombre": "Clara", "codigo": "ab" })), &rules());
        assert_eq!(
            result.errors(),
            [
                "codigo must be at least 3 characters",
                "codigo must contain only digits"
            ]
        );
    }

    #[test]
    fn wrong_type_and_enum_both_reported() {
        let result = validate(&record(json!({ "nombre": "Clara", "codigo": "123", "sexo": 7 })), &rules());
        assert_eq!(
            result.errors(),
            [
                "sexo must be a valid string",
                "sexo must be one of: macho, hembra"
            ]
        );
    }

    #[test]
    fn numeric_range_bounds() {
        let too_heavy = validate(
            &record(json!({ "nombre": "Clara", "codigo": "123", "peso": 16 })),
            &rules(),
        );
        assert_eq!(too_heavy.errors(), ["peso must be at most 15"]);

        let negative = validate(
            &record(json!({ "nombre": "Clara", "codigo": "123", "peso": "-0.5" })),
            &rules(),
        );
        assert_eq!(negative.errors(), ["peso must be at least 0"]);
    }

    #[test]
    fn constraints_apply_in_fixed_stage_order() {
        let rules = vec![FieldRule::required("codigo")
            .custom(no_dashes)
            .pattern(&DIGITS, "codigo must contain only digits")
            .of_type(FieldType::String)];
        let result = validate(&record(json!({ "codigo": 12 })), &rules);
        assert_eq!(
            result.errors(),
            ["codigo must be a valid string"],
            "pattern sees the text form of 12"
        );

        let result = validate(&record(json!({ "codigo": "1-2" })), &rules);
        assert_eq!(
            result.errors(),
            ["codigo must contain only digits", "codigo cannot contain dashes"]
        );
    }

    #[test]
    fn date_must_round_trip() {
        let rules = vec![FieldRule::required("fecha").of_type(FieldType::Date)];
        for ok in ["2024-02-29", "2023-12-31"] {
            assert!(validate(&record(json!({ "fecha": ok })), &rules).is_valid(), "{ok}");
        }
        for bad in ["2023-02-29", "2024-2-3", "2024-13-01", "01/02/2024", "2024-01-01T00:00:00Z"] {
            let result = validate(&record(json!({ "fecha": bad })), &rules);
            assert_eq!(result.errors(), ["fecha must be a valid date (YYYY-MM-DD)"], "{bad}");
        }
    }

    #[test]
    fn email_and_phone_shapes() {
        let rules = vec![
            FieldRule::required("email").of_type(FieldType::Email),
            FieldRule::required("telefono").of_type(FieldType::Phone),
        ];
        let ok = validate(
            &record(json!({ "email": "ana@granja.ec", "telefono": "+593 (99) 123-4567" })),
            &rules,
        );
        assert!(ok.is_valid(), "{:?}", ok.errors());

        let bad = validate(&record(json!({ "email": "ana@granja", "telefono": "1234" })), &rules);
        assert_eq!(
            bad.errors(),
            ["email must be a valid email", "telefono must be a valid phone number"]
        );

        let too_long = validate(
            &record(json!({ "email": "a@b.co", "telefono": "1234567890123456" })),
            &rules,
        );
        assert_eq!(too_long.errors(), ["telefono must be a valid phone number"]);
    }

    #[test]
    fn number_and_integer_types() {
        let rules = vec![
            FieldRule::required("precio").of_type(FieldType::Number),
            FieldRule::required("cantidad").of_type(FieldType::Integer),
        ];
        assert!(validate(&record(json!({ "precio": "12.5", "cantidad": 3 })), &rules).is_valid());
        let bad = validate(&record(json!({ "precio": "abc", "cantidad": 2.5 })), &rules);
        assert_eq!(
            bad.errors(),
            ["precio must be a valid number", "cantidad must be a valid integer"]
        );
    }

    #[test]
    fn to_optional_relaxes_without_touching_original() {
        let base = rules();
        let relaxed = to_optional(&base);

        assert!(validate(&Record::new(), &relaxed).is_valid());
        assert!(base.iter().take(2).all(|r| r.required));
        assert_eq!(base.len(), relaxed.len());

        let still_checked = validate(&record(json!({ "codigo": "ab" })), &relaxed);
        assert_eq!(still_checked.errors().len(), 2);
    }

    #[test]
    fn relaxed_required_field_cannot_be_cleared() {
        let relaxed = to_optional(&rules());
        let result = validate(
            &record(json!({ "nombre": "", "codigo": null, "peso": null })),
            &relaxed,
        );
        assert_eq!(result.errors(), ["nombre is required", "codigo is required"]);
    }
}
