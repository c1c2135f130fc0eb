use crate::domain::Record;
use crate::validation::engine::{to_optional, validate};
use crate::validation::result::ValidationResult;
use crate::validation::rule::{Constraint, FieldRule, FieldType};
use serde_json::Value as JsonValue;

/// Whole-record check run once every field rule has passed.
pub type RecordCheck = fn(&Record) -> Option<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    Create,
    Update,
}

/// Field rules bound to one entity.
///
/// The update-mode rules are derived once from the create rules through
/// [`to_optional`], so both modes share one definition.
#[derive(Debug, Clone)]
pub struct Schema {
    entity: &'static str,
    rules: Vec<FieldRule>,
    update_rules: Vec<FieldRule>,
    record_checks: Vec<RecordCheck>,
}

impl Schema {
    pub fn new(entity: &'static str, rules: Vec<FieldRule>) -> Self {
        let update_rules = to_optional(&rules);
        Self {
            entity,
            rules,
            update_rules,
            record_checks: Vec::new(),
        }
    }

    pub fn with_record_check(mut self, check: RecordCheck) -> Self {
        self.record_checks.push(check);
        self
    }

    pub fn entity(&self) -> &'static str {
        self.entity
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.rules.iter().any(|r| r.field == field)
    }

    /// Declared type of `field`, if its rule carries one.
    pub fn field_type(&self, field: &str) -> Option<FieldType> {
        self.rules
            .iter()
            .find(|r| r.field == field)?
            .constraints
            .iter()
            .find_map(|c| match c {
                Constraint::Type(t) => Some(*t),
                _ => None,
            })
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|r| r.field)
    }

    pub fn validate(&self, record: &Record, mode: ValidationMode) -> ValidationResult {
        let rules = match mode {
            ValidationMode::Create => &self.rules,
            ValidationMode::Update => &self.update_rules,
        };
        let mut result = validate(record, rules);
        if !result.is_valid() {
            return result;
        }
        for check in &self.record_checks {
            if let Some(error) = check(record) {
                result.push_error(error);
            }
        }
        result
    }

    pub fn validate_create(&self, record: &Record) -> ValidationResult {
        self.validate(record, ValidationMode::Create)
    }

    pub fn validate_update(&self, record: &Record) -> ValidationResult {
        self.validate(record, ValidationMode::Update)
    }

    /// Cross-field checks over a stored row with an update applied.
    ///
    /// Only custom predicates and record checks run here; plain field rules
    /// already passed on the patch itself.
    pub fn validate_merged(&self, merged: &Record) -> ValidationResult {
        let predicates: Vec<FieldRule> = self
            .rules
            .iter()
            .map(FieldRule::predicates_only)
            .filter(|r| !r.constraints.is_empty())
            .collect();
        let mut result = validate(merged, &predicates);
        for check in &self.record_checks {
            if let Some(error) = check(merged) {
                result.push_error(error);
            }
        }
        result
    }

    /// Keeps only the fields this schema declares. Dropped fields come back as warnings.
    pub fn project(&self, payload: &JsonValue) -> Result<(Record, Vec<String>), ValidationResult> {
        let obj = payload
            .as_object()
            .ok_or_else(|| ValidationResult::invalid("Payload must be a JSON object"))?;

        let mut record = Record::new();
        let mut warnings = Vec::new();
        for (key, value) in obj {
            if self.has_field(key) {
                record.insert(key.clone(), value.clone());
            } else {
                warnings.push(format!("Unknown field '{}' ignored for {}", key, self.entity));
            }
        }
        Ok((record, warnings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ordered_pair(record: &Record) -> Option<String> {
        let low = record.get("minimo")?.as_f64()?;
        let high = record.get("maximo")?.as_f64()?;
        (low > high).then(|| "minimo cannot exceed maximo".to_string())
    }

    fn schema() -> Schema {
        Schema::new(
            "rangos",
            vec![
                FieldRule::required("minimo").of_type(FieldType::Number),
                FieldRule::required("maximo").of_type(FieldType::Number),
            ],
        )
        .with_record_check(ordered_pair)
    }

    #[test]
    fn record_check_runs_after_field_rules_pass() {
        let s = schema();
        let bad_order = json!({ "minimo": 5, "maximo": 1 });
        let result = s.validate_create(bad_order.as_object().unwrap());
        assert_eq!(result.errors(), ["minimo cannot exceed maximo"]);
    }

    #[test]
    fn record_check_skipped_when_fields_fail() {
        let s = schema();
        let result = s.validate_create(json!({ "minimo": "x", "maximo": 1 }).as_object().unwrap());
        assert_eq!(result.errors(), ["minimo must be a valid number"]);
    }

    #[test]
    fn update_mode_accepts_empty_record() {
        let s = schema();
        assert!(s.validate_update(&Record::new()).is_valid());
        assert!(!s.validate_create(&Record::new()).is_valid());
        assert!(s.rules().iter().all(|r| r.required));
    }

    #[test]
    fn merged_row_reruns_cross_field_checks() {
        let s = schema();
        let patch = json!({ "maximo": 2 });
        assert!(s.validate_update(patch.as_object().unwrap()).is_valid());

        let merged = json!({ "minimo": 5, "maximo": 2 });
        let result = s.validate_merged(merged.as_object().unwrap());
        assert_eq!(result.errors(), ["minimo cannot exceed maximo"]);
    }

    #[test]
    fn update_cannot_blank_a_required_field() {
        let result = schema().validate_update(json!({ "minimo": null }).as_object().unwrap());
        assert_eq!(result.errors(), ["minimo is required"]);
    }

    #[test]
    fn project_drops_unknown_fields_with_warning() {
        let (record, warnings) = schema()
            .project(&json!({ "minimo": 1, "hack": true }))
            .unwrap();
        assert_eq!(record.len(), 1);
        assert_eq!(warnings, ["Unknown field 'hack' ignored for rangos"]);

        let err = schema().project(&json!([1, 2])).unwrap_err();
        assert_eq!(err.errors(), ["Payload must be a JSON object"]);
    }
}
