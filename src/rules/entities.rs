//! Which database-backed rules apply to each entity.

use crate::domain::Record;
use crate::rules::checker::{BusinessRuleChecker, BusinessRuleOutcome, CheckError, OwnRecord};
use crate::rules::MAX_AVES_POR_JAULA;
use crate::storage::{Filter, Store};
use crate::validation::schemas::ave;
use serde_json::Value as JsonValue;

const JAULA_ACTIVA: &[&str] = &["activa"];
const CLIENTE_ACTIVO: &[&str] = &["activo"];
const AVE_TRATABLE: &[&str] = &["activa", "enferma", "en_cuarentena"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSet {
    /// Schema validation only.
    None,
    Ave,
    Jaula,
    Raza,
    Cliente,
    Huevo,
    Venta,
    /// Medications and vaccines: the treated bird or cage must exist.
    Tratamiento,
    Usuario,
}

fn present<'r>(record: &'r Record, field: &str) -> Option<&'r JsonValue> {
    record.get(field).filter(|v| !v.is_null())
}

impl RuleSet {
    /// Runs every rule of this set against `record` and aggregates the violations.
    ///
    /// On update, `record` is the stored row merged with the patch and `own`
    /// identifies that row.
    pub async fn check(
        &self,
        store: &dyn Store,
        record: &Record,
        own: Option<OwnRecord<'_>>,
    ) -> Result<BusinessRuleOutcome, CheckError> {
        let mut checker = BusinessRuleChecker::new(store);

        match self {
            RuleSet::None => {}
            RuleSet::Ave => {
                if let Some(tag) = present(record, "color_anillo") {
                    checker.unique("aves", "color_anillo", tag, own).await?;
                }
                if let Some(cage) = present(record, "id_jaula") {
                    checker
                        .exists("jaulas", "Jaula", cage, Some(("estado", JAULA_ACTIVA)))
                        .await?;
                    let housed = present(record, "estado")
                        .and_then(|s| s.as_str())
                        .map(|s| !ave::ESTADOS_FUERA_DE_JAULA.contains(&s))
                        .unwrap_or(true);
                    if housed {
                        let members: Vec<Filter> = ave::ESTADOS_FUERA_DE_JAULA
                            .iter()
                            .map(|state| Filter::neq("estado", *state))
                            .collect();
                        checker
                            .capacity("aves", "id_jaula", cage, MAX_AVES_POR_JAULA, &members, own)
                            .await?;
                    }
                }
                if let Some(breed) = present(record, "id_raza") {
                    checker.exists("razas", "Raza", breed, None).await?;
                }
            }
            RuleSet::Jaula => {
                if let Some(code) = present(record, "codigo") {
                    checker.unique("jaulas", "codigo", code, own).await?;
                }
            }
            RuleSet::Raza => {
                if let Some(name) = present(record, "nombre") {
                    checker.unique("razas", "nombre", name, own).await?;
                }
            }
            RuleSet::Cliente => {
                if let Some(id) = present(record, "identificacion") {
                    checker.unique("clientes", "identificacion", id, own).await?;
                }
                if let Some(email) = present(record, "email") {
                    checker.unique("clientes", "email", email, own).await?;
                }
            }
            RuleSet::Huevo => {
                if let Some(cage) = present(record, "id_jaula") {
                    checker.exists("jaulas", "Jaula", cage, None).await?;
                }
                checker.egg_totals(record, own).await?;
            }
            RuleSet::Venta => {
                if let Some(client) = present(record, "id_cliente") {
                    checker
                        .exists("clientes", "Cliente", client, Some(("estado", CLIENTE_ACTIVO)))
                        .await?;
                }
            }
            RuleSet::Tratamiento => {
                if let Some(bird) = present(record, "id_ave") {
                    checker
                        .exists("aves", "Ave", bird, Some(("estado", AVE_TRATABLE)))
                        .await?;
                }
                if let Some(cage) = present(record, "id_jaula") {
                    checker.exists("jaulas", "Jaula", cage, None).await?;
                }
            }
            RuleSet::Usuario => {
                if let Some(email) = present(record, "email") {
                    checker.unique("usuarios", "email", email, own).await?;
                }
            }
        }

        Ok(checker.finish())
    }
}
