//! Medication treatments (`medicamentos`).

use crate::domain::Record;
use crate::validation::engine::parse_date;
use crate::validation::rule::{FieldRule, FieldType};
use crate::validation::schema::Schema;
use serde_json::Value as JsonValue;

pub const VIAS: &[&str] = &["oral", "inyectable", "topica", "agua_de_bebida"];

fn expires_before_application(value: &JsonValue, record: &Record) -> Option<String> {
    let expires = parse_date(value)?;
    let applied = super::sibling_date(record, "fecha_aplicacion")?;
    (expires < applied).then(|| "fecha_vencimiento cannot be before fecha_aplicacion".to_string())
}

pub fn schema() -> Schema {
    Schema::new(
        "medicamentos",
        vec![
            FieldRule::required("nombre").of_type(FieldType::String).length(2, 100),
            FieldRule::required("dosis").of_type(FieldType::String).length(1, 50),
            FieldRule::required("via_administracion").of_type(FieldType::String).one_of(VIAS),
            FieldRule::required("fecha_aplicacion").of_type(FieldType::Date),
            FieldRule::optional("fecha_vencimiento")
                .of_type(FieldType::Date)
                .custom(expires_before_application),
            FieldRule::optional("id_ave").of_type(FieldType::Integer).min(1.0),
            FieldRule::optional("id_jaula").of_type(FieldType::Integer).min(1.0),
            FieldRule::optional("observaciones").of_type(FieldType::String).max_len(500),
        ],
    )
}
