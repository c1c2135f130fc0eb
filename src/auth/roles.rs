//! Roles live in the `usuarios` profile table, keyed by email.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use super::normalize_email;
use crate::domain::Record;
use crate::storage::{Filter, SelectQuery, Store, StoreResult};

pub const PROFILE_TABLE: &str = "usuarios";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Empleado,
    Veterinario,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Empleado => "empleado",
            Role::Veterinario => "veterinario",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "empleado" => Ok(Role::Empleado),
            "veterinario" => Ok(Role::Veterinario),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Role of the profile with this email; `empleado` when there is no
/// profile or its `rol` is not recognised.
pub async fn resolve_role(store: &dyn Store, email: &str) -> StoreResult<Role> {
    let query = SelectQuery::new()
        .filter(Filter::eq("email", normalize_email(email)))
        .limit(1);
    let rows = store.select(PROFILE_TABLE, &query).await?;
    let role = rows
        .first()
        .and_then(|row| row.get("rol"))
        .and_then(|rol| rol.as_str())
        .and_then(|rol| rol.parse().ok())
        .unwrap_or(Role::Empleado);
    Ok(role)
}

/// Creates the profile row for a new account. The first account on an
/// empty farm becomes `admin`; everyone after that starts as `empleado`.
pub async fn provision_profile(store: &dyn Store, email: &str, nombre: Option<&str>) -> StoreResult<Record> {
    let role = if store.count(PROFILE_TABLE, &[]).await? == 0 {
        Role::Admin
    } else {
        Role::Empleado
    };

    let mut profile = Record::new();
    profile.insert("email".into(), json!(normalize_email(email)));
    if let Some(nombre) = nombre {
        profile.insert("nombre".into(), json!(nombre));
    }
    profile.insert("rol".into(), json!(role.as_str()));
    let stored = store.insert(PROFILE_TABLE, &profile).await?;
    tracing::info!(email = %email, role = %role, "profile provisioned");
    Ok(stored)
}
