//! CLI error types.

use mixir_sheets::{GatewayError, GatewayErrorCode};
use mixir_store::{PrincipalError, StoreError};
use thiserror::Error;

use crate::secret::SecretError;

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Secret(#[from] SecretError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Principal(#[from] PrincipalError),

    #[error("sign-in failed: {0}")]
    Auth(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("{0}")]
    Store(#[from] StoreError),
}

impl CliError {
    /// Hint printed under the error, if any.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Principal(PrincipalError::Anonymous) => {
                Some("run `mixir auth url`, then `mixir auth login --code <CODE> --state <STATE>`")
            }
            Self::Store(StoreError::FolderNotFound { .. }) => {
                Some("run `mixir auth login` again to recreate the root folder")
            }
            Self::Store(StoreError::UpstreamTransportFailure(err))
                if err.code() == GatewayErrorCode::AuthenticationFailed =>
            {
                Some("the stored credential was rejected, sign in again")
            }
            _ => None,
        }
    }
}
