//! Command handlers.

pub mod auth;
pub mod config;
pub mod groups;
pub mod members;
pub mod subgroups;

use std::sync::Arc;

use chrono::Utc;
use mixir_sheets::google::{GoogleGateway, OAuthClient};
use mixir_store::{PrincipalResolver, SheetStore, UserRecord};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::CliConfig;
use crate::error::CliResult;
use crate::session::Session;

/// Everything a command needs: configuration, session files and output mode.
#[derive(Debug)]
pub struct Context {
    pub config: CliConfig,
    pub session: Session,
    pub json: bool,
}

impl Context {
    pub fn new(config: CliConfig, json: bool) -> Self {
        let session = Session::new(config.data_dir());
        Self {
            config,
            session,
            json,
        }
    }

    pub fn oauth(&self) -> CliResult<OAuthClient> {
        Ok(OAuthClient::new(&self.config.google.gateway_config()?))
    }

    pub fn store(&self) -> CliResult<SheetStore> {
        let gateway = GoogleGateway::new(self.config.google.gateway_config()?)?;
        Ok(SheetStore::new(Arc::new(gateway), self.config.store.clone()))
    }

    /// Resolves the signed-in user, refreshing an expired access token first.
    ///
    /// The refreshed credential is saved so the refresh budget carries over
    /// between runs.
    pub async fn principal(&self) -> CliResult<UserRecord> {
        let mut user = self.session.resolve().await?;
        if user.credential.is_expired() {
            refresh_credential(&self.oauth()?, &mut user).await?;
            self.session.save_user(&user)?;
        }
        Ok(user)
    }

    /// Prints `value` as JSON, or runs `text` for plain output.
    pub fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce(&T)) -> CliResult<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            text(value);
        }
        Ok(())
    }

    /// Acknowledges a command that returns nothing.
    pub fn done(&self, message: &str) -> CliResult<()> {
        self.emit(&serde_json::json!({ "ok": true }), |_| println!("{message}"))
    }
}

/// Trades the stored refresh token for a new access token and books the
/// refresh against the user's budget.
pub(crate) async fn refresh_credential(oauth: &OAuthClient, user: &mut UserRecord) -> CliResult<()> {
    let refreshed = oauth.refresh(&user.credential.refresh_token).await?;
    user.credential
        .record_refresh(refreshed.access_token, refreshed.expires_at, refreshed.refresh_token);
    info!(
        user_id = %user.id,
        remaining = user.credential.refresh_count,
        expires_in_secs = (user.credential.access_token_expires_at - Utc::now()).num_seconds(),
        "refreshed access token"
    );
    if user.credential.needs_reconsent() {
        warn!(user_id = %user.id, "refresh budget spent, sign in again to renew consent");
    }
    Ok(())
}
