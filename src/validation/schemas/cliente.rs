//! Clients (`clientes`).

use crate::validation::rule::{FieldRule, FieldType};
use crate::validation::schema::Schema;
use once_cell::sync::Lazy;
use regex::Regex;

pub const ESTADOS: &[&str] = &["activo", "inactivo"];
pub const TIPOS: &[&str] = &["minorista", "mayorista"];

/// National id (10 digits) or tax id (13 digits).
static IDENTIFICACION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{10}(\d{3})?$").expect("client id regex"));

pub fn schema() -> Schema {
    Schema::new(
        "clientes",
        vec![
            FieldRule::required("nombre").of_type(FieldType::String).length(2, 100),
            FieldRule::required("identificacion").of_type(FieldType::String).pattern(
                &IDENTIFICACION,
                "identificacion must have 10 (cedula) or 13 (RUC) digits",
            ),
            FieldRule::required("telefono").of_type(FieldType::Phone),
            FieldRule::optional("email").of_type(FieldType::Email).max_len(100),
            FieldRule::optional("direccion").of_type(FieldType::String).max_len(200),
            FieldRule::optional("tipo").of_type(FieldType::String).one_of(TIPOS),
            FieldRule::optional("estado").of_type(FieldType::String).one_of(ESTADOS),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validates_contact_fields() {
        let client = json!({
            "nombre": "Tienda La Esquina",
            "identificacion": "0912345678001",
            "telefono": "0991234567",
            "email": "compras@esquina.ec"
        });
        assert!(schema().validate_create(client.as_object().unwrap()).is_valid());

        let client = json!({
            "nombre": "T",
            "identificacion": "12345",
            "telefono": "12",
            "email": "no-email"
        });
        let result = schema().validate_create(client.as_object().unwrap());
        assert_eq!(
            result.errors(),
            [
                "nombre must be at least 2 characters",
                "identificacion must have 10 (cedula) or 13 (RUC) digits",
                "telefono must be a valid phone number",
                "email must be a valid email"
            ]
        );
    }
}
