//! OAuth 2.0 authorization-code flow for Google APIs.
//!
//! Each [`AuthorizationFlow`] carries its own random state nonce and PKCE
//! verifier. The caller keeps the flow between building the consent URL and
//! exchanging the returned code, and checks the returned state against it.
//! Nothing is shared between flows.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use rand::Rng as _;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::credentials::StoredCredential;
use crate::error::{GatewayError, GatewayResult};

use super::config::{GatewayConfig, OAuthCredentials};

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// PKCE verifier length in bytes, before encoding.
const CODE_VERIFIER_LENGTH: usize = 32;
const STATE_LENGTH: usize = 16;

/// Lifetime assumed when the token endpoint omits `expires_in`.
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// One pending authorization: state nonce, PKCE pair and redirect URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationFlow {
    pub state: String,
    pub verifier: String,
    pub challenge: String,
    pub redirect_uri: String,
}

impl AuthorizationFlow {
    pub fn new(redirect_uri: impl Into<String>) -> Self {
        let verifier = random_token(CODE_VERIFIER_LENGTH);
        let challenge = compute_challenge(&verifier);
        Self {
            state: random_token(STATE_LENGTH),
            verifier,
            challenge,
            redirect_uri: redirect_uri.into(),
        }
    }

    /// Checks the state returned with the authorization code.
    pub fn verify_state(&self, returned: &str) -> GatewayResult<()> {
        if returned == self.state {
            Ok(())
        } else {
            Err(GatewayError::authentication(
                "OAuth state mismatch, restart the authorization",
            ))
        }
    }
}

fn random_token(len: usize) -> String {
    let mut rng = rand::rng();
    let bytes: Vec<u8> = (0..len).map(|_| rng.random()).collect();
    URL_SAFE_NO_PAD.encode(&bytes)
}

fn compute_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// Tokens obtained from a code exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSet {
    pub access_token: String,
    /// Present when consent was given with offline access.
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub scopes: Vec<String>,
}

impl TokenSet {
    /// Converts into a credential suitable for storage.
    ///
    /// Fails when no refresh token was issued.
    pub fn into_stored(self) -> GatewayResult<StoredCredential> {
        let refresh_token = self.refresh_token.ok_or_else(|| {
            GatewayError::authentication("no refresh token issued, consent with offline access")
        })?;
        Ok(StoredCredential::new(
            self.access_token,
            refresh_token,
            self.expires_at,
        ))
    }
}

/// A refreshed access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshedToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    /// Set only when the provider rotated the refresh token.
    pub refresh_token: Option<String>,
}

/// Profile of the authorizing account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    scope: Option<String>,
}

impl TokenResponse {
    fn parse(body: &str) -> GatewayResult<Self> {
        serde_json::from_str(body).map_err(|e| {
            GatewayError::invalid_response("invalid token response").with_source(e)
        })
    }

    fn expires_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::seconds(self.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS))
    }

    fn into_token_set(self, now: DateTime<Utc>) -> TokenSet {
        let expires_at = self.expires_at(now);
        TokenSet {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            scopes: self
                .scope
                .map(|s| s.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
        }
    }

    fn into_refreshed(self, now: DateTime<Utc>) -> RefreshedToken {
        let expires_at = self.expires_at(now);
        RefreshedToken {
            access_token: self.access_token,
            expires_at,
            refresh_token: self.refresh_token,
        }
    }
}

/// Client for Google's authorization, token and userinfo endpoints.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    credentials: OAuthCredentials,
    redirect_uri: String,
    http_client: reqwest::Client,
}

impl OAuthClient {
    pub fn new(config: &GatewayConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .expect("failed to create HTTP client");
        Self {
            credentials: config.credentials.clone(),
            redirect_uri: config.redirect_uri.clone(),
            http_client,
        }
    }

    /// Starts a new flow against the configured redirect URI.
    pub fn start_flow(&self) -> AuthorizationFlow {
        AuthorizationFlow::new(&self.redirect_uri)
    }

    /// Builds the consent URL for a flow.
    ///
    /// Requests offline access and forces the consent prompt so a refresh
    /// token is issued every time.
    pub fn authorization_url(&self, flow: &AuthorizationFlow, scopes: &[String]) -> String {
        let scope = scopes.join(" ");
        format!(
            "{GOOGLE_AUTH_URL}?client_id={}&redirect_uri={}&response_type=code&scope={}&\
            code_challenge={}&code_challenge_method=S256&state={}&\
            access_type=offline&include_granted_scopes=true&prompt=consent",
            urlencoding::encode(&self.credentials.client_id),
            urlencoding::encode(&flow.redirect_uri),
            urlencoding::encode(&scope),
            urlencoding::encode(&flow.challenge),
            urlencoding::encode(&flow.state),
        )
    }

    /// Exchanges an authorization code for tokens.
    pub async fn exchange_code(
        &self,
        code: &str,
        flow: &AuthorizationFlow,
    ) -> GatewayResult<TokenSet> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("code", code),
            ("code_verifier", flow.verifier.as_str()),
            ("grant_type", "authorization_code"),
            ("redirect_uri", flow.redirect_uri.as_str()),
        ];
        let body = self.post_token_form(&params, "token exchange").await?;
        info!("obtained tokens from authorization code");
        Ok(TokenResponse::parse(&body)?.into_token_set(Utc::now()))
    }

    /// Trades a refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &str) -> GatewayResult<RefreshedToken> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];
        let body = self.post_token_form(&params, "token refresh").await?;
        debug!("refreshed access token");
        Ok(TokenResponse::parse(&body)?.into_refreshed(Utc::now()))
    }

    /// Reads the profile of the account owning `access_token`.
    pub async fn user_info(&self, access_token: &str) -> GatewayResult<UserInfo> {
        let response = self
            .http_client
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| GatewayError::network("userinfo request failed").with_source(e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::network("failed to read userinfo response").with_source(e))?;
        if !status.is_success() {
            return Err(GatewayError::from_status(status.as_u16(), body));
        }
        serde_json::from_str(&body).map_err(|e| {
            GatewayError::invalid_response("invalid userinfo response").with_source(e)
        })
    }

    async fn post_token_form(&self, params: &[(&str, &str)], what: &str) -> GatewayResult<String> {
        let response = self
            .http_client
            .post(GOOGLE_TOKEN_URL)
            .form(params)
            .send()
            .await
            .map_err(|e| GatewayError::network(format!("{what} request failed")).with_source(e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::network("failed to read token response").with_source(e))?;
        if !status.is_success() {
            return Err(GatewayError::authentication(format!("{what} failed"))
                .with_status(status.as_u16())
                .with_detail(body));
        }
        Ok(body)
    }
}
