//! Sales (`ventas`).

use crate::domain::Record;
use crate::validation::rule::{FieldRule, FieldType};
use crate::validation::schema::Schema;
use serde_json::Value as JsonValue;

pub const PRODUCTOS: &[&str] = &["huevos", "aves", "gallinaza", "otro"];
pub const METODOS_PAGO: &[&str] = &["efectivo", "transferencia", "credito"];

fn total_matches(value: &JsonValue, record: &Record) -> Option<String> {
    super::total_mismatch(value, record, "cantidad", "precio_unitario")
}

pub fn schema() -> Schema {
    Schema::new(
        "ventas",
        vec![
            FieldRule::required("id_cliente").of_type(FieldType::Integer).min(1.0),
            FieldRule::required("fecha_venta").of_type(FieldType::Date),
            FieldRule::required("tipo_producto").of_type(FieldType::String).one_of(PRODUCTOS),
            FieldRule::required("cantidad").of_type(FieldType::Number).min(0.01),
            FieldRule::required("precio_unitario").of_type(FieldType::Number).min(0.0),
            FieldRule::optional("total")
                .of_type(FieldType::Number)
                .min(0.0)
                .custom(total_matches),
            FieldRule::optional("metodo_pago").of_type(FieldType::String).one_of(METODOS_PAGO),
            FieldRule::optional("observaciones").of_type(FieldType::String).max_len(500),
        ],
    )
}
