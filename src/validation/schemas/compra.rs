//! Purchases (`compras`).

use crate::domain::Record;
use crate::validation::rule::{FieldRule, FieldType};
use crate::validation::schema::Schema;
use serde_json::Value as JsonValue;

pub const TIPOS: &[&str] = &["alimento", "medicamento", "vacuna", "equipo", "aves", "otro"];

fn total_matches(value: &JsonValue, record: &Record) -> Option<String> {
    super::total_mismatch(value, record, "cantidad", "costo_unitario")
}

pub fn schema() -> Schema {
    Schema::new(
        "compras",
        vec![
            FieldRule::required("proveedor").of_type(FieldType::String).length(2, 100),
            FieldRule::required("fecha_compra").of_type(FieldType::Date),
            FieldRule::required("tipo").of_type(FieldType::String).one_of(TIPOS),
            FieldRule::required("cantidad").of_type(FieldType::Number).min(0.01),
            FieldRule::required("costo_unitario").of_type(FieldType::Number).min(0.0),
            FieldRule::optional("total")
                .of_type(FieldType::Number)
                .min(0.0)
                .custom(total_matches),
            FieldRule::optional("descripcion").of_type(FieldType::String).max_len(500),
        ],
    )
}
