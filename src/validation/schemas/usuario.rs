//! Credentials for sign-up and sign-in.

use crate::validation::rule::{FieldRule, FieldType};
use crate::validation::schema::Schema;

pub fn signup_schema() -> Schema {
    Schema::new(
        "usuarios",
        vec![
            FieldRule::required("email").of_type(FieldType::Email).max_len(100),
            FieldRule::required("password").of_type(FieldType::String).length(8, 72),
            FieldRule::required("nombre").of_type(FieldType::String).length(2, 100),
        ],
    )
}

pub fn signin_schema() -> Schema {
    Schema::new(
        "credenciales",
        vec![
            FieldRule::required("email").of_type(FieldType::Email),
            FieldRule::required("password").of_type(FieldType::String),
        ],
    )
}
