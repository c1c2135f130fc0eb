//! Vaccinations (`vacunas`).

use crate::domain::Record;
use crate::validation::engine::parse_date;
use crate::validation::rule::{FieldRule, FieldType};
use crate::validation::schema::Schema;
use serde_json::Value as JsonValue;

pub const VIAS: &[&str] = &["ocular", "nasal", "inyectable", "agua_de_bebida", "ala"];

fn next_dose_not_after_application(value: &JsonValue, record: &Record) -> Option<String> {
    let next = parse_date(value)?;
    let applied = super::sibling_date(record, "fecha_aplicacion")?;
    (next <= applied).then(|| "proxima_dosis must be after fecha_aplicacion".to_string())
}

pub fn schema() -> Schema {
    Schema::new(
        "vacunas",
        vec![
            FieldRule::required("nombre").of_type(FieldType::String).length(2, 100),
            FieldRule::required("enfermedad").of_type(FieldType::String).length(2, 100),
            FieldRule::required("fecha_aplicacion").of_type(FieldType::Date),
            FieldRule::optional("proxima_dosis")
                .of_type(FieldType::Date)
                .custom(next_dose_not_after_application),
            FieldRule::optional("via_administracion").of_type(FieldType::String).one_of(VIAS),
            FieldRule::optional("dosis").of_type(FieldType::String).max_len(50),
            FieldRule::optional("id_ave").of_type(FieldType::Integer).min(1.0),
            FieldRule::optional("id_jaula").of_type(FieldType::Integer).min(1.0),
        ],
    )
}
