//! Egg batches (`huevos`).
//!
//! A batch records the day's collection: the declared `cantidad_total` plus
//! optional counts classified by shell color and size.

use crate::domain::Record;
use crate::rules::MAX_HUEVOS_DIARIOS;
use crate::validation::engine::{as_number, format_number};
use crate::validation::rule::{FieldRule, FieldType};
use crate::validation::schema::Schema;
use serde_json::Value as JsonValue;

/// Classified sub-category counts, all bounded by `cantidad_total`.
pub const CATEGORIAS: [&str; 8] = [
    "huevos_cafe_chico",
    "huevos_cafe_mediano",
    "huevos_cafe_grande",
    "huevos_cafe_jumbo",
    "huevos_blanco_chico",
    "huevos_blanco_mediano",
    "huevos_blanco_grande",
    "huevos_blanco_jumbo",
];

pub fn classified_sum(record: &Record) -> f64 {
    CATEGORIAS
        .iter()
        .filter_map(|field| record.get(*field).and_then(as_number))
        .sum()
}

/// Sum of classified counts against the declared total. Skipped when the
/// record carries no total (partial updates).
pub fn classified_exceeds_total(record: &Record) -> Option<String> {
    let total = record.get("cantidad_total").and_then(as_number)?;
    let sum = classified_sum(record);
    (sum > total).then(|| {
        format!(
            "Sum of classified eggs ({}) exceeds cantidad_total ({})",
            format_number(sum),
            format_number(total)
        )
    })
}

fn collected_in_future(value: &JsonValue, _record: &Record) -> Option<String> {
    super::future_date("fecha_recoleccion", value)
}

pub fn schema() -> Schema {
    let mut rules = vec![
        FieldRule::required("fecha_recoleccion")
            .of_type(FieldType::Date)
            .custom(collected_in_future),
        FieldRule::required("cantidad_total")
            .of_type(FieldType::Integer)
            .range(0.0, MAX_HUEVOS_DIARIOS as f64),
    ];
    rules.extend(
        CATEGORIAS
            .iter()
            .map(|field| FieldRule::optional(*field).of_type(FieldType::Integer).min(0.0)),
    );
    rules.push(FieldRule::optional("id_jaula").of_type(FieldType::Integer).min(1.0));
    rules.push(FieldRule::optional("observaciones").of_type(FieldType::String).max_len(500));

    Schema::new("huevos", rules).with_record_check(classified_exceeds_total)
}
