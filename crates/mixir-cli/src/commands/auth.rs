//! Authentication commands.
//!
//! Sign-in is split in two steps so it works without a local callback
//! server: `auth url` prints the consent URL and stores the PKCE flow,
//! `auth login` takes the code and state Google appended to the redirect.

use mixir_store::UserRecord;
use serde_json::json;
use tracing::{info, warn};

use super::{Context, refresh_credential};
use crate::error::{CliError, CliResult};

/// Starts a flow and prints its consent URL.
pub fn url(ctx: &Context, open_browser: bool) -> CliResult<()> {
    let gateway_config = ctx.config.google.gateway_config()?;
    let oauth = mixir_sheets::google::OAuthClient::new(&gateway_config);
    let flow = oauth.start_flow();
    let url = oauth.authorization_url(&flow, &gateway_config.scopes);
    ctx.session.save_flow(&flow)?;

    if open_browser && let Err(e) = open::that(&url) {
        warn!(error = %e, "could not open a browser");
    }

    ctx.emit(&json!({ "url": url, "state": flow.state }), |_| {
        println!("Open this URL and approve access:");
        println!();
        println!("  {url}");
        println!();
        println!("Then run: mixir auth login --code <CODE> --state <STATE>");
    })
}

/// Completes sign-in and makes sure the root folder exists.
pub async fn login(ctx: &Context, code: &str, state: &str) -> CliResult<()> {
    let flow = ctx
        .session
        .load_flow()?
        .ok_or_else(|| CliError::Auth("no pending sign-in, run `mixir auth url` first".to_string()))?;
    flow.verify_state(state)?;

    let oauth = ctx.oauth()?;
    let tokens = oauth.exchange_code(code, &flow).await?;
    let profile = oauth.user_info(&tokens.access_token).await?;
    let credential = tokens.into_stored()?;

    // Keep the local id stable across sign-ins of the same account.
    let id = match ctx.session.load_user()? {
        Some(previous) if previous.email == profile.email => previous.id,
        _ => uuid::Uuid::new_v4().to_string(),
    };
    let mut user = UserRecord::new(id, &profile.email, credential).with_name(&profile.name);
    user.picture = profile.picture;
    ctx.session.save_user(&user)?;
    ctx.session.clear_flow()?;
    info!(user_id = %user.id, email = %user.email, "signed in");

    let folder_id = ctx.store()?.ensure_folder(&user).await?;

    ctx.emit(&json!({ "user_id": user.id, "email": user.email, "folder_id": folder_id }), |_| {
        println!("Signed in as {}.", user.email);
        println!("Root folder: {folder_id}");
    })
}

/// Refreshes the access token regardless of its expiry.
pub async fn refresh(ctx: &Context) -> CliResult<()> {
    let mut user = ctx
        .session
        .load_user()?
        .ok_or(mixir_store::PrincipalError::Anonymous)?;
    refresh_credential(&ctx.oauth()?, &mut user).await?;
    ctx.session.save_user(&user)?;

    let credential = &user.credential;
    ctx.emit(
        &json!({
            "expires_at": credential.access_token_expires_at,
            "refresh_count": credential.refresh_count,
        }),
        |_| {
            println!(
                "Access token valid until {} ({} refreshes left).",
                credential.access_token_expires_at.format("%Y-%m-%d %H:%M:%S UTC"),
                credential.refresh_count
            );
        },
    )
}

/// Shows the signed-in user without touching the network.
pub fn whoami(ctx: &Context) -> CliResult<()> {
    let user = ctx
        .session
        .load_user()?
        .ok_or(mixir_store::PrincipalError::Anonymous)?;
    let credential = &user.credential;
    ctx.emit(
        &json!({
            "id": user.id,
            "email": user.email,
            "name": user.name,
            "expires_at": credential.access_token_expires_at,
            "expired": credential.is_expired(),
            "refresh_count": credential.refresh_count,
        }),
        |_| {
            if user.name.is_empty() {
                println!("{}", user.email);
            } else {
                println!("{} <{}>", user.name, user.email);
            }
            let status = if credential.is_expired() { "expired" } else { "valid" };
            println!("access token: {status}");
            println!("refreshes left: {}", credential.refresh_count);
            if credential.needs_reconsent() {
                println!("sign in again to renew consent");
            }
        },
    )
}
