//! Self-contained [`AuthProvider`]: credentials in the `auth_usuarios`
//! table, stateless JWT access tokens, revocation list held in memory.

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::crypto::{hash_password, verify_password};
use super::errors::{AuthError, AuthResult};
use super::jwt::{JwtConfig, JwtManager};
use super::{normalize_email, AuthProvider, Identity, Session};
use crate::domain::Record;
use crate::storage::{Filter, SelectQuery, Store, StoreError};

pub const CREDENTIALS_TABLE: &str = "auth_usuarios";

pub struct LocalAuth {
    store: Arc<dyn Store>,
    jwt: JwtManager,
    /// Signed-out token ids with their expiry; expired entries are pruned.
    revoked: RwLock<HashMap<String, i64>>,
}

fn text(value: Option<&JsonValue>) -> String {
    match value {
        Some(JsonValue::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

impl LocalAuth {
    pub fn new(store: Arc<dyn Store>, config: JwtConfig) -> Self {
        Self {
            store,
            jwt: JwtManager::new(config),
            revoked: RwLock::new(HashMap::new()),
        }
    }

    async fn find_credentials(&self, email: &str) -> AuthResult<Option<Record>> {
        let query = SelectQuery::new().filter(Filter::eq("email", email)).limit(1);
        let rows = self.store.select(CREDENTIALS_TABLE, &query).await?;
        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl AuthProvider for LocalAuth {
    async fn verify(&self, token: &str) -> AuthResult<Identity> {
        let claims = self.jwt.validate(token)?;
        if self.revoked.read().await.contains_key(&claims.jti) {
            return Err(AuthError::TokenRevoked);
        }
        Ok(Identity {
            user_id: claims.sub,
            email: claims.email,
        })
    }

    #[tracing::instrument(skip(self, password))]
    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<Identity> {
        let email = normalize_email(email);
        if self.find_credentials(&email).await?.is_some() {
            return Err(AuthError::EmailAlreadyExists);
        }

        let password_hash = hash_password(password)?;
        let mut row = Record::new();
        row.insert("email".into(), json!(email));
        row.insert("password_hash".into(), json!(password_hash));
        let stored = match self.store.insert(CREDENTIALS_TABLE, &row).await {
            Ok(stored) => stored,
            // lost a race with a concurrent sign-up for the same email
            Err(StoreError::UniqueViolation { .. }) => return Err(AuthError::EmailAlreadyExists),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(email = %email, "account created");
        Ok(Identity {
            user_id: text(stored.get("id")),
            email,
        })
    }

    #[tracing::instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session> {
        let email = normalize_email(email);
        let Some(row) = self.find_credentials(&email).await? else {
            return Err(AuthError::InvalidCredentials);
        };
        let hash = text(row.get("password_hash"));
        if !verify_password(password, &hash)? {
            tracing::info!(email = %email, "sign-in rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let identity = Identity {
            user_id: text(row.get("id")),
            email,
        };
        let (access_token, claims) = self.jwt.issue(&identity)?;
        Ok(Session {
            access_token,
            token_type: "bearer".to_string(),
            expires_at: claims.exp,
            user: identity,
        })
    }

    async fn sign_out(&self, token: &str) -> AuthResult<()> {
        let claims = self.jwt.validate(token)?;
        let now = Utc::now().timestamp();
        let mut revoked = self.revoked.write().await;
        revoked.retain(|_, exp| *exp > now);
        revoked.insert(claims.jti, claims.exp);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn auth() -> LocalAuth {
        let store = MemoryStore::new().with_unique(CREDENTIALS_TABLE, "email");
        LocalAuth::new(Arc::new(store), JwtConfig::default())
    }

    #[tokio::test]
    async fn sign_up_then_sign_in_yields_verifiable_token() {
        let auth = auth();
        let created = auth.sign_up(" Ana@Granja.ec ", "supersecreta").await.unwrap();
        assert_eq!(created.email, "ana@granja.ec");

        let session = auth.sign_in("ana@granja.ec", "supersecreta").await.unwrap();
        assert_eq!(session.token_type, "bearer");
        let identity = auth.verify(&session.access_token).await.unwrap();
        assert_eq!(identity, created);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let auth = auth();
        auth.sign_up("ana@granja.ec", "supersecreta").await.unwrap();
        let err = auth.sign_up("ANA@granja.ec", "otraclave1").await.unwrap_err();
        assert!(matches!(err, AuthError::EmailAlreadyExists));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let auth = auth();
        auth.sign_up("ana@granja.ec", "supersecreta").await.unwrap();
        let wrong = auth.sign_in("ana@granja.ec", "incorrecta").await.unwrap_err();
        let unknown = auth.sign_in("luis@granja.ec", "supersecreta").await.unwrap_err();
        assert_eq!(wrong.to_string(), unknown.to_string());
        assert_eq!(wrong.status_code(), 401);
    }

    #[tokio::test]
    async fn signed_out_token_no_longer_verifies() {
        let auth = auth();
        auth.sign_up("ana@granja.ec", "supersecreta").await.unwrap();
        let session = auth.sign_in("ana@granja.ec", "supersecreta").await.unwrap();
        auth.sign_out(&session.access_token).await.unwrap();
        auth.sign_out(&session.access_token).await.unwrap();
        assert!(matches!(
            auth.verify(&session.access_token).await,
            Err(AuthError::TokenRevoked)
        ));
    }

    #[tokio::test]
    async fn sign_out_prunes_expired_revocations() {
        let auth = auth();
        auth.sign_up("ana@granja.ec", "supersecreta").await.unwrap();
        auth.revoked
            .write()
            .await
            .insert("caducado".to_string(), Utc::now().timestamp() - 60);

        let session = auth.sign_in("ana@granja.ec", "supersecreta").await.unwrap();
        auth.sign_out(&session.access_token).await.unwrap();

        let revoked = auth.revoked.read().await;
        assert!(!revoked.contains_key("caducado"));
        assert_eq!(revoked.len(), 1);
    }
}
