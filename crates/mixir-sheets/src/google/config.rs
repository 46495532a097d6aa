//! Google gateway configuration.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{GatewayError, GatewayResult};

use super::discovery::{ApiFamily, ServiceEndpoint};

/// OAuth client id and secret registered in Google Cloud Console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Shape of the credentials JSON downloaded from Google Cloud Console.
///
/// Accepts an `installed` or `web` section, or a flat object with the two
/// fields at the root.
#[derive(Debug, Deserialize)]
struct CredentialsFile {
    installed: Option<ClientSection>,
    web: Option<ClientSection>,
    client_id: Option<String>,
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClientSection {
    client_id: String,
    client_secret: String,
}

impl OAuthCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Loads credentials from a Google Cloud Console JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> GatewayResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            GatewayError::configuration(format!(
                "failed to read credentials file {}",
                path.display()
            ))
            .with_source(e)
        })?;
        Self::from_json(&content)
    }

    /// Parses credentials from a Google Cloud Console JSON string.
    pub fn from_json(json: &str) -> GatewayResult<Self> {
        let file: CredentialsFile = serde_json::from_str(json).map_err(|e| {
            GatewayError::configuration("failed to parse credentials JSON").with_source(e)
        })?;

        if let Some(section) = file.installed.or(file.web) {
            return Ok(Self::new(section.client_id, section.client_secret));
        }
        match (file.client_id, file.client_secret) {
            (Some(id), Some(secret)) => Ok(Self::new(id, secret)),
            _ => Err(GatewayError::configuration(
                "credentials JSON needs an 'installed'/'web' section or root 'client_id'/'client_secret'",
            )),
        }
    }

    /// Checks the values look like a Google OAuth client.
    pub fn validate(&self) -> GatewayResult<()> {
        if self.client_id.is_empty() {
            return Err(GatewayError::configuration("client_id is required"));
        }
        if !self.client_id.ends_with(".apps.googleusercontent.com") {
            return Err(GatewayError::configuration(
                "client_id should end with .apps.googleusercontent.com",
            ));
        }
        if self.client_secret.is_empty() {
            return Err(GatewayError::configuration("client_secret is required"));
        }
        Ok(())
    }
}

/// Configuration for [`GoogleGateway`](super::GoogleGateway) and
/// [`OAuthClient`](super::OAuthClient).
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub credentials: OAuthCredentials,
    /// Redirect URI registered for the OAuth client.
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    /// Per-request timeout. The gateway does not retry on expiry.
    pub timeout: Duration,
    pub user_agent: String,
    /// Base URL of the discovery service.
    pub discovery_root: String,
    /// Endpoints used as-is instead of being discovered.
    pub pinned_endpoints: HashMap<ApiFamily, ServiceEndpoint>,
}

impl GatewayConfig {
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
    pub const DEFAULT_DISCOVERY_ROOT: &'static str = "https://www.googleapis.com/discovery/v1";
    pub const DEFAULT_REDIRECT_URI: &'static str = "http://127.0.0.1:8080/oauth2callback";
    pub const DEFAULT_SCOPES: [&'static str; 4] = [
        "https://www.googleapis.com/auth/userinfo.email",
        "https://www.googleapis.com/auth/userinfo.profile",
        "https://www.googleapis.com/auth/drive",
        "https://www.googleapis.com/auth/spreadsheets",
    ];

    pub fn new(credentials: OAuthCredentials) -> Self {
        Self {
            credentials,
            redirect_uri: Self::DEFAULT_REDIRECT_URI.to_string(),
            scopes: Self::DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("mixir/{}", env!("CARGO_PKG_VERSION")),
            discovery_root: Self::DEFAULT_DISCOVERY_ROOT.to_string(),
            pinned_endpoints: HashMap::new(),
        }
    }

    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = redirect_uri.into();
        self
    }

    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_discovery_root(mut self, root: impl Into<String>) -> Self {
        self.discovery_root = root.into();
        self
    }

    /// Pins the endpoint of an API family, skipping discovery for it.
    pub fn with_pinned_endpoint(mut self, family: ApiFamily, endpoint: ServiceEndpoint) -> Self {
        self.pinned_endpoints.insert(family, endpoint);
        self
    }

    pub fn validate(&self) -> GatewayResult<()> {
        self.credentials.validate()?;
        if self.scopes.is_empty() {
            return Err(GatewayError::configuration(
                "at least one OAuth scope is required",
            ));
        }
        if url::Url::parse(&self.redirect_uri).is_err() {
            return Err(GatewayError::configuration(format!(
                "invalid redirect URI: {}",
                self.redirect_uri
            )));
        }
        if url::Url::parse(&self.discovery_root).is_err() {
            return Err(GatewayError::configuration(format!(
                "invalid discovery root: {}",
                self.discovery_root
            )));
        }
        if self.timeout.is_zero() {
            return Err(GatewayError::configuration("timeout must be positive"));
        }
        Ok(())
    }
}
