//! Sign-up, sign-in and profile lookup on top of an [`AuthProvider`].

use crate::app::error::{ServiceError, ServiceResult};
use crate::auth::roles::{provision_profile, resolve_role};
use crate::auth::{normalize_email, AuthProvider, Identity, Role, Session};
use crate::domain::Record;
use crate::rules::RuleSet;
use crate::storage::Store;
use crate::validation::schemas::usuario;
use crate::validation::Schema;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

/// The caller as the rest of the API sees it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Profile {
    #[serde(flatten)]
    pub identity: Identity,
    pub rol: Role,
}

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn Store>,
    auth: Arc<dyn AuthProvider>,
    signup: Arc<Schema>,
    signin: Arc<Schema>,
}

fn field<'r>(record: &'r Record, name: &str) -> &'r str {
    record.get(name).and_then(|v| v.as_str()).unwrap_or_default()
}

impl AccountService {
    pub fn new(store: Arc<dyn Store>, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            store,
            auth,
            signup: Arc::new(usuario::signup_schema()),
            signin: Arc::new(usuario::signin_schema()),
        }
    }

    pub fn auth(&self) -> &Arc<dyn AuthProvider> {
        &self.auth
    }

    /// Validates the payload, creates credentials and the `usuarios` profile.
    #[instrument(skip(self, payload))]
    pub async fn sign_up(&self, payload: &JsonValue) -> ServiceResult<Profile> {
        let (record, _) = self.signup.project(payload).map_err(ServiceError::Validation)?;
        let validation = self.signup.validate_create(&record);
        if !validation.is_valid() {
            return Err(ServiceError::Validation(validation));
        }

        let mut profile_view = record.clone();
        profile_view.insert("email".into(), normalize_email(field(&record, "email")).into());
        let outcome = RuleSet::Usuario.check(self.store.as_ref(), &profile_view, None).await?;
        if !outcome.is_valid() {
            return Err(ServiceError::BusinessRule(outcome));
        }

        let identity = self
            .auth
            .sign_up(field(&record, "email"), field(&record, "password"))
            .await?;
        let nombre = field(&record, "nombre");
        let profile = provision_profile(self.store.as_ref(), &identity.email, Some(nombre)).await?;
        let rol = profile
            .get("rol")
            .and_then(|r| r.as_str())
            .and_then(|r| r.parse().ok())
            .unwrap_or(Role::Empleado);
        Ok(Profile { identity, rol })
    }

    #[instrument(skip(self, payload))]
    pub async fn sign_in(&self, payload: &JsonValue) -> ServiceResult<Session> {
        let (record, _) = self.signin.project(payload).map_err(ServiceError::Validation)?;
        let validation = self.signin.validate_create(&record);
        if !validation.is_valid() {
            return Err(ServiceError::Validation(validation));
        }
        Ok(self
            .auth
            .sign_in(field(&record, "email"), field(&record, "password"))
            .await?)
    }

    pub async fn sign_out(&self, token: &str) -> ServiceResult<()> {
        Ok(self.auth.sign_out(token).await?)
    }

    /// Verifies the bearer token and attaches the caller's role.
    pub async fn authenticate(&self, token: &str) -> ServiceResult<Profile> {
        let identity = self.auth.verify(token).await?;
        let rol = resolve_role(self.store.as_ref(), &identity.email).await?;
        Ok(Profile { identity, rol })
    }
}
