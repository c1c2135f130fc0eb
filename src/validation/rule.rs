//! Declarative field rules.
//!
//! A [`FieldRule`] names one field of a record, whether it is required, and an
//! ordered list of [`Constraint`]s drawn from a closed set. Rules are plain data;
//! [`crate::validation::engine::validate`] is the only interpreter.

use crate::domain::Record;
use regex::Regex;
use serde_json::Value as JsonValue;

/// Custom check over a present value and the whole record.
/// Returns the error message on failure.
pub type Predicate = fn(&JsonValue, &Record) -> Option<String>;

/// Primitive type tags understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
    Date,
    Email,
    Phone,
}

impl FieldType {
    pub fn label(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date (YYYY-MM-DD)",
            FieldType::Email => "email",
            FieldType::Phone => "phone number",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Constraint {
    Type(FieldType),
    Length {
        min: Option<usize>,
        max: Option<usize>,
    },
    Range {
        min: Option<f64>,
        max: Option<f64>,
    },
    Pattern {
        regex: Regex,
        message: Option<&'static str>,
    },
    OneOf(&'static [&'static str]),
    Custom(Predicate),
}

impl Constraint {
    /// Evaluation stage; the engine applies constraints in ascending stage order.
    pub fn stage(&self) -> u8 {
        match self {
            Constraint::Type(_) => 0,
            Constraint::Length { .. } => 1,
            Constraint::Range { .. } => 2,
            Constraint::Pattern { .. } => 3,
            Constraint::OneOf(_) => 4,
            Constraint::Custom(_) => 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldRule {
    pub field: &'static str,
    pub required: bool,
    /// Set on update-mode copies of a required rule: the field may be
    /// omitted but not cleared.
    pub was_required: bool,
    pub constraints: Vec<Constraint>,
}

impl FieldRule {
    pub fn required(field: &'static str) -> Self {
        Self {
            field,
            required: true,
            was_required: false,
            constraints: Vec::new(),
        }
    }

    pub fn optional(field: &'static str) -> Self {
        Self {
            field,
            required: false,
            was_required: false,
            constraints: Vec::new(),
        }
    }

    pub fn of_type(self, field_type: FieldType) -> Self {
        self.with(Constraint::Type(field_type))
    }

    pub fn length(self, min: usize, max: usize) -> Self {
        self.with(Constraint::Length {
            min: Some(min),
            max: Some(max),
        })
    }

    pub fn max_len(self, max: usize) -> Self {
        self.with(Constraint::Length {
            min: None,
            max: Some(max),
        })
    }

    pub fn range(self, min: f64, max: f64) -> Self {
        self.with(Constraint::Range {
            min: Some(min),
            max: Some(max),
        })
    }

    pub fn min(self, min: f64) -> Self {
        self.with(Constraint::Range {
            min: Some(min),
            max: None,
        })
    }

    pub fn pattern(self, regex: &Regex, message: &'static str) -> Self {
        self.with(Constraint::Pattern {
            regex: regex.clone(),
            message: Some(message),
        })
    }

    pub fn one_of(self, allowed: &'static [&'static str]) -> Self {
        self.with(Constraint::OneOf(allowed))
    }

    pub fn custom(self, predicate: Predicate) -> Self {
        self.with(Constraint::Custom(predicate))
    }

    /// Same rule with the required flag cleared.
    pub fn as_optional(&self) -> Self {
        Self {
            required: false,
            was_required: self.required || self.was_required,
            ..self.clone()
        }
    }

    /// Only the record-aware custom predicates, without the required flag.
    pub fn predicates_only(&self) -> Self {
        Self {
            required: false,
            was_required: false,
            constraints: self
                .constraints
                .iter()
                .filter(|c| matches!(c, Constraint::Custom(_)))
                .cloned()
                .collect(),
            ..self.clone()
        }
    }

    fn with(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }
}
