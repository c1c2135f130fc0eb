//! Farm summary for a date range, composed from plain selects and counts.

use crate::app::error::{ServiceError, ServiceResult};
use crate::domain::Record;
use crate::storage::{Filter, SelectQuery, Store};
use crate::validation::engine::{as_number, parse_date};
use crate::validation::schemas::ave;
use crate::validation::ValidationResult;
use chrono::{Local, NaiveDate};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Resumen {
    pub desde: NaiveDate,
    pub hasta: NaiveDate,
    /// Birds currently housed (not sold or dead).
    pub aves: u64,
    pub jaulas_activas: u64,
    pub huevos_recolectados: f64,
    pub ventas: u64,
    pub ventas_total: f64,
}

#[derive(Clone)]
pub struct ReportService {
    store: Arc<dyn Store>,
}

fn date_param(name: &str, raw: Option<&str>, errors: &mut Vec<String>) -> Option<NaiveDate> {
    let raw = raw?;
    let parsed = parse_date(&JsonValue::String(raw.to_string()));
    if parsed.is_none() {
        errors.push(format!("{} must be a valid date (YYYY-MM-DD)", name));
    }
    parsed
}

fn in_range(field: &str, desde: NaiveDate, hasta: NaiveDate) -> SelectQuery {
    SelectQuery::new()
        .filter(Filter::gte(field, desde.to_string()))
        .filter(Filter::lte(field, hasta.to_string()))
}

/// Declared `total`, or `cantidad * precio_unitario` when the sale has none.
fn sale_amount(venta: &Record) -> Option<f64> {
    if let Some(total) = venta.get("total").and_then(as_number) {
        return Some(total);
    }
    let cantidad = venta.get("cantidad").and_then(as_number)?;
    let precio = venta.get("precio_unitario").and_then(as_number)?;
    Some(cantidad * precio)
}

impl ReportService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Both bounds are inclusive and default to today.
    #[tracing::instrument(skip(self))]
    pub async fn resumen(&self, desde: Option<&str>, hasta: Option<&str>) -> ServiceResult<Resumen> {
        let mut errors = Vec::new();
        let today = Local::now().date_naive();
        let desde = date_param("desde", desde, &mut errors).unwrap_or(today);
        let hasta = date_param("hasta", hasta, &mut errors).unwrap_or(today);
        if errors.is_empty() && desde > hasta {
            errors.push("desde cannot be after hasta".to_string());
        }
        if !errors.is_empty() {
            return Err(ServiceError::Validation(ValidationResult::from_errors(errors)));
        }

        let housed: Vec<Filter> = ave::ESTADOS_FUERA_DE_JAULA
            .iter()
            .map(|estado| Filter::neq("estado", *estado))
            .collect();
        let aves = self.store.count("aves", &housed).await?;
        let jaulas_activas = self
            .store
            .count("jaulas", &[Filter::eq("estado", "activa")])
            .await?;

        let lotes = self
            .store
            .select("huevos", &in_range("fecha_recoleccion", desde, hasta))
            .await?;
        let huevos_recolectados = lotes
            .iter()
            .filter_map(|lote| lote.get("cantidad_total").and_then(as_number))
            .sum();

        let ventas = self
            .store
            .select("ventas", &in_range("fecha_venta", desde, hasta))
            .await?;
        let ventas_total = ventas.iter().filter_map(sale_amount).fold(0.0, |acc, n| acc + n);

        Ok(Resumen {
            desde,
            hasta,
            aves,
            jaulas_activas,
            huevos_recolectados,
            ventas: ventas.len() as u64,
            ventas_total: (ventas_total * 100.0).round() / 100.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn rows(values: Vec<JsonValue>) -> Vec<Record> {
        values.into_iter().filter_map(|v| v.as_object().cloned()).collect()
    }

    #[tokio::test]
    async fn summarises_the_requested_range() {
        let store = MemoryStore::new();
        store
            .seed(
                "aves",
                rows(vec![
                    json!({ "estado": "activa" }),
                    json!({ "estado": "enferma" }),
                    json!({ "estado": "vendida" }),
                ]),
            )
            .await
            .unwrap();
        store
            .seed("jaulas", rows(vec![json!({ "estado": "activa" }), json!({ "estado": "inactiva" })]))
            .await
            .unwrap();
        store
            .seed(
                "huevos",
                rows(vec![
                    json!({ "fecha_recoleccion": "2024-05-01", "cantidad_total": 120 }),
                    json!({ "fecha_recoleccion": "2024-05-02", "cantidad_total": 80 }),
                    json!({ "fecha_recoleccion": "2024-06-01", "cantidad_total": 999 }),
                ]),
            )
            .await
            .unwrap();
        store
            .seed(
                "ventas",
                rows(vec![
                    json!({ "fecha_venta": "2024-05-02", "total": "10.10" }),
                    json!({ "fecha_venta": "2024-05-03", "total": 5.2 }),
                ]),
            )
            .await
            .unwrap();

        let report = ReportService::new(Arc::new(store))
            .resumen(Some("2024-05-01"), Some("2024-05-31"))
            .await
            .unwrap();
        assert_eq!(report.aves, 2);
        assert_eq!(report.jaulas_activas, 1);
        assert_eq!(report.huevos_recolectados, 200.0);
        assert_eq!(report.ventas, 2);
        assert_eq!(report.ventas_total, 15.3);
    }

    #[tokio::test]
    async fn sales_without_total_count_their_line_amount() {
        let store = MemoryStore::new();
        store
            .seed(
                "ventas",
                rows(vec![
                    json!({ "fecha_venta": "2024-05-02", "cantidad": 30, "precio_unitario": 0.15 }),
                    json!({ "fecha_venta": "2024-05-03", "cantidad": 2, "precio_unitario": "8", "total": 16 }),
                ]),
            )
            .await
            .unwrap();

        let reports = ReportService::new(Arc::new(store));
        let report = reports
            .resumen(Some("2024-05-01"), Some("2024-05-31"))
            .await
            .unwrap();
        assert_eq!(report.ventas, 2);
        assert_eq!(report.ventas_total, 20.5);

        let empty = reports
            .resumen(Some("2023-01-01"), Some("2023-01-31"))
            .await
            .unwrap();
        assert_eq!(empty.ventas, 0);
        assert!(empty.ventas_total == 0.0 && empty.ventas_total.is_sign_positive());
    }

    #[tokio::test]
    async fn rejects_bad_or_inverted_ranges() {
        let reports = ReportService::new(Arc::new(MemoryStore::new()));
        let err = reports.resumen(Some("mayo"), None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let err = reports
            .resumen(Some("2024-06-01"), Some("2024-05-01"))
            .await
            .unwrap_err();
        let ServiceError::Validation(result) = err else {
            panic!("expected validation failure");
        };
        assert_eq!(result.errors(), ["desde cannot be after hasta"]);
    }
}
