//! The acting principal: a user record carrying a stored credential.

use mixir_sheets::{BoxFuture, RequestCredentials, StoredCredential, to_request_credentials};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A signed-in user as kept by the account store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
    pub credential: StoredCredential,
}

impl UserRecord {
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        credential: StoredCredential,
    ) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            name: String::new(),
            picture: None,
            credential,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Request credentials for one store operation.
    pub fn request_credentials(&self) -> RequestCredentials {
        to_request_credentials(&self.credential)
    }
}

/// Error returned when no principal can be produced.
#[derive(Debug, Error)]
pub enum PrincipalError {
    #[error("not signed in")]
    Anonymous,

    #[error("failed to load user record: {0}")]
    Load(String),
}

/// Source of the acting user for a request.
pub trait PrincipalResolver: Send + Sync {
    fn resolve(&self) -> BoxFuture<'_, Result<UserRecord, PrincipalError>>;
}

/// Resolver that always yields the same record.
#[derive(Debug, Clone)]
pub struct FixedPrincipal(pub UserRecord);

impl PrincipalResolver for FixedPrincipal {
    fn resolve(&self) -> BoxFuture<'_, Result<UserRecord, PrincipalError>> {
        let user = self.0.clone();
        Box::pin(async move { Ok(user) })
    }
}
