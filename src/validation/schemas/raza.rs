//! Breeds (`razas`).

use crate::validation::rule::{FieldRule, FieldType};
use crate::validation::schema::Schema;

pub const PROPOSITOS: &[&str] = &["postura", "carne", "doble_proposito", "ornamental"];

pub fn schema() -> Schema {
    Schema::new(
        "razas",
        vec![
            FieldRule::required("nombre").of_type(FieldType::String).length(2, 100),
            FieldRule::optional("descripcion").of_type(FieldType::String).max_len(500),
            FieldRule::optional("origen").of_type(FieldType::String).max_len(100),
            FieldRule::optional("proposito").of_type(FieldType::String).one_of(PROPOSITOS),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Record;
    use serde_json::json;

    #[test]
    fn named_breed_is_valid() {
        let breed = json!({ "nombre": "Rhode Island", "descripcion": "x" });
        let result = schema().validate_create(breed.as_object().unwrap());
        assert!(result.is_valid());
        assert!(result.errors().is_empty());
    }

    #[test]
    fn empty_breed_mentions_nombre() {
        let result = schema().validate_create(&Record::new());
        assert!(!result.is_valid());
        assert_eq!(result.errors().len(), 1);
        assert!(result.errors()[0].contains("nombre"));
    }
}
