//! Supplies inventory (`suministros`).

use crate::validation::rule::{FieldRule, FieldType};
use crate::validation::schema::Schema;

pub const TIPOS: &[&str] = &["alimento", "cama", "limpieza", "equipo", "otro"];
pub const UNIDADES: &[&str] = &["kg", "lb", "saco", "litro", "unidad"];

pub fn schema() -> Schema {
    Schema::new(
        "suministros",
        vec![
            FieldRule::required("nombre").of_type(FieldType::String).length(2, 100),
            FieldRule::required("tipo").of_type(FieldType::String).one_of(TIPOS),
            FieldRule::required("cantidad").of_type(FieldType::Number).min(0.0),
            FieldRule::required("unidad").of_type(FieldType::String).one_of(UNIDADES),
            FieldRule::optional("stock_minimo").of_type(FieldType::Number).min(0.0),
            FieldRule::optional("fecha_ingreso").of_type(FieldType::Date),
            FieldRule::optional("proveedor").of_type(FieldType::String).max_len(100),
        ],
    )
}
