//! Birds (`aves`).

use crate::domain::Record;
use crate::validation::rule::{FieldRule, FieldType};
use crate::validation::schema::Schema;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as JsonValue;

pub const SEXOS: &[&str] = &["macho", "hembra"];
pub const ESTADOS: &[&str] = &["activa", "enferma", "en_cuarentena", "vendida", "muerta"];
/// States that no longer occupy a cage.
pub const ESTADOS_FUERA_DE_JAULA: &[&str] = &["vendida", "muerta"];

/// Leg-band color tag, e.g. `ROJO-012`.
static COLOR_ANILLO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]{3,12}-\d{1,4}$").expect("color tag regex"));

fn hatched_in_future(value: &JsonValue, _record: &Record) -> Option<String> {
    super::future_date("fecha_nacimiento", value)
}

pub fn schema() -> Schema {
    Schema::new(
        "aves",
        vec![
            FieldRule::required("id_jaula").of_type(FieldType::Integer).min(1.0),
            FieldRule::required("id_raza").of_type(FieldType::Integer).min(1.0),
            FieldRule::required("color_anillo")
                .of_type(FieldType::String)
                .length(5, 17)
                .pattern(
                    &COLOR_ANILLO,
                    "color_anillo must look like COLOR-NNN (e.g. ROJO-012)",
                ),
            FieldRule::required("sexo").of_type(FieldType::String).one_of(SEXOS),
            FieldRule::required("fecha_nacimiento")
                .of_type(FieldType::Date)
                .custom(hatched_in_future),
            FieldRule::optional("estado").of_type(FieldType::String).one_of(ESTADOS),
            FieldRule::optional("peso").of_type(FieldType::Number).range(0.0, 15.0),
            FieldRule::optional("observaciones").of_type(FieldType::String).max_len(500),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid() -> JsonValue {
        json!({
            "id_jaula": 3,
            "id_raza": 1,
            "color_anillo": "ROJO-012",
            "sexo": "hembra",
            "fecha_nacimiento": "2024-03-01",
            "peso": 1.8
        })
    }

    #[test]
    fn accepts_complete_bird() {
        let result = schema().validate_create(valid().as_object().unwrap());
        assert!(result.is_valid(), "{:?}", result.errors());
    }

    #[test]
    fn color_tag_pattern_always_enforced() {
        let mut bird = valid();
        bird["color_anillo"] = json!("rojo 12");
        let result = schema().validate_create(bird.as_object().unwrap());
        assert_eq!(
            result.errors(),
            ["color_anillo must look like COLOR-NNN (e.g. ROJO-012)"]
        );

        let patch = json!({ "color_anillo": "12" });
        let result = schema().validate_update(patch.as_object().unwrap());
        assert_eq!(
            result.errors(),
            [
                "color_anillo must be at least 5 characters",
                "color_anillo must look like COLOR-NNN (e.g. ROJO-012)"
            ]
        );
    }

    #[test]
    fn rejects_unknown_sex_and_state() {
        let mut bird = valid();
        bird["sexo"] = json!("gallo");
        bird["estado"] = json!("perdida");
        let result = schema().validate_create(bird.as_object().unwrap());
        assert_eq!(
            result.errors(),
            [
                "sexo must be one of: macho, hembra",
                "estado must be one of: activa, enferma, en_cuarentena, vendida, muerta"
            ]
        );
    }
}
