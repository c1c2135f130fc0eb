//! Cages (`jaulas`).

use crate::rules::MAX_AVES_POR_JAULA;
use crate::validation::rule::{FieldRule, FieldType};
use crate::validation::schema::Schema;
use once_cell::sync::Lazy;
use regex::Regex;

pub const ESTADOS: &[&str] = &["activa", "inactiva", "mantenimiento"];
pub const TIPOS: &[&str] = &["postura", "engorde", "reproduccion", "cuarentena"];

static CODIGO: Lazy<Regex> = Lazy::new(|| Regex::new(r"^J-\d{3}$").expect("cage code regex"));

pub fn schema() -> Schema {
    Schema::new(
        "jaulas",
        vec![
            FieldRule::required("codigo")
                .of_type(FieldType::String)
                .pattern(&CODIGO, "codigo must look like J-001"),
            FieldRule::optional("capacidad")
                .of_type(FieldType::Integer)
                .range(1.0, MAX_AVES_POR_JAULA as f64),
            FieldRule::optional("tipo").of_type(FieldType::String).one_of(TIPOS),
            FieldRule::optional("ubicacion").of_type(FieldType::String).max_len(100),
            FieldRule::optional("estado").of_type(FieldType::String).one_of(ESTADOS),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn capacity_cannot_exceed_cage_ceiling() {
        let cage = json!({ "codigo": "J-004", "capacidad": 21 });
        let result = schema().validate_create(cage.as_object().unwrap());
        assert_eq!(result.errors(), ["capacidad must be at most 20"]);
    }

    #[test]
    fn code_pattern() {
        let cage = json!({ "codigo": "jaula 4" });
        let result = schema().validate_create(cage.as_object().unwrap());
        assert_eq!(result.errors(), ["codigo must look like J-001"]);
    }
}
