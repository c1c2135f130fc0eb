//! Incubation runs (`incubaciones`).

use crate::domain::Record;
use crate::validation::engine::{as_number, format_number, parse_date};
use crate::validation::rule::{FieldRule, FieldType};
use crate::validation::schema::Schema;
use serde_json::Value as JsonValue;

pub const ESTADOS: &[&str] = &["en_proceso", "completada", "fallida"];

fn hatch_before_start(value: &JsonValue, record: &Record) -> Option<String> {
    let hatch = parse_date(value)?;
    let start = super::sibling_date(record, "fecha_inicio")?;
    (hatch <= start).then(|| "fecha_eclosion_estimada must be after fecha_inicio".to_string())
}

fn hatched_over_set(value: &JsonValue, record: &Record) -> Option<String> {
    let hatched = as_number(value)?;
    let set = super::sibling_number(record, "cantidad_huevos")?;
    (hatched > set).then(|| {
        format!(
            "huevos_eclosionados ({}) cannot exceed cantidad_huevos ({})",
            format_number(hatched),
            format_number(set)
        )
    })
}

pub fn schema() -> Schema {
    Schema::new(
        "incubaciones",
        vec![
            FieldRule::required("fecha_inicio").of_type(FieldType::Date),
            FieldRule::required("cantidad_huevos").of_type(FieldType::Integer).range(1.0, 10_000.0),
            FieldRule::optional("fecha_eclosion_estimada")
                .of_type(FieldType::Date)
                .custom(hatch_before_start),
            FieldRule::optional("huevos_eclosionados")
                .of_type(FieldType::Integer)
                .min(0.0)
                .custom(hatched_over_set),
            FieldRule::optional("temperatura").of_type(FieldType::Number).range(30.0, 40.0),
            FieldRule::optional("humedad").of_type(FieldType::Number).range(0.0, 100.0),
            FieldRule::optional("estado").of_type(FieldType::String).one_of(ESTADOS),
        ],
    )
}
