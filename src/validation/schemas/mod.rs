//! Per-entity rule tables.

pub mod ave;
pub mod cliente;
pub mod compra;
pub mod huevo;
pub mod incubacion;
pub mod jaula;
pub mod medicamento;
pub mod raza;
pub mod suministro;
pub mod usuario;
pub mod vacuna;
pub mod venta;

use crate::domain::Record;
use crate::validation::engine::{as_number, parse_date};
use crate::validation::schema::Schema;
use chrono::{Local, NaiveDate};
use serde_json::Value as JsonValue;

/// Every entity schema served by the API, in registry order.
pub fn all() -> Vec<Schema> {
    vec![
        ave::schema(),
        jaula::schema(),
        raza::schema(),
        cliente::schema(),
        huevo::schema(),
        venta::schema(),
        compra::schema(),
        suministro::schema(),
        medicamento::schema(),
        vacuna::schema(),
        incubacion::schema(),
        usuario::signup_schema(),
        usuario::signin_schema(),
    ]
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Date held by another field of the same record, if it parses.
pub(crate) fn sibling_date(record: &Record, field: &str) -> Option<NaiveDate> {
    record.get(field).and_then(parse_date)
}

pub(crate) fn sibling_number(record: &Record, field: &str) -> Option<f64> {
    record.get(field).and_then(as_number)
}

/// `Some(message)` when `value` is a date later than today.
pub(crate) fn future_date(field: &str, value: &JsonValue) -> Option<String> {
    let date = parse_date(value)?;
    (date > today()).then(|| format!("{} cannot be in the future", field))
}

/// Checks that a declared total matches `quantity * unit_price` within a cent.
pub(crate) fn total_mismatch(
    value: &JsonValue,
    record: &Record,
    quantity_field: &str,
    price_field: &str,
) -> Option<String> {
    let total = as_number(value)?;
    let quantity = sibling_number(record, quantity_field)?;
    let price = sibling_number(record, price_field)?;
    let expected = quantity * price;
    ((total - expected).abs() > 0.01).then(|| {
        format!(
            "total ({:.2}) does not match {} x {} ({:.2})",
            total, quantity_field, price_field, expected
        )
    })
}
