//! Discovery of API service endpoints.
//!
//! Google publishes a discovery document per API version carrying the root
//! URL and service path that method paths are relative to. The cache resolves
//! each family once per process and memoizes it. Entries never expire; the
//! cache is safe to drop at any time.

use std::collections::HashMap;

use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{GatewayError, GatewayResult};

/// A remote resource family with its own discovery document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiFamily {
    /// Files, folders and permissions.
    Drive,
    /// Spreadsheet metadata, values and batch updates.
    Sheets,
}

impl ApiFamily {
    pub fn api_name(self) -> &'static str {
        match self {
            Self::Drive => "drive",
            Self::Sheets => "sheets",
        }
    }

    pub fn version(self) -> &'static str {
        match self {
            Self::Drive => "v3",
            Self::Sheets => "v4",
        }
    }
}

/// Root URL plus service path of an API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEndpoint {
    pub root_url: String,
    #[serde(default)]
    pub service_path: String,
}

impl ServiceEndpoint {
    pub fn new(root_url: impl Into<String>, service_path: impl Into<String>) -> Self {
        Self {
            root_url: root_url.into(),
            service_path: service_path.into(),
        }
    }

    /// Joins a method path onto the endpoint.
    pub fn url(&self, path: &str) -> String {
        let mut url = self.root_url.trim_end_matches('/').to_string();
        for part in [self.service_path.as_str(), path] {
            let part = part.trim_matches('/');
            if !part.is_empty() {
                url.push('/');
                url.push_str(part);
            }
        }
        url
    }
}

/// Memoizing resolver for [`ServiceEndpoint`]s.
#[derive(Debug)]
pub struct DiscoveryCache {
    root: String,
    entries: RwLock<HashMap<ApiFamily, ServiceEndpoint>>,
}

impl DiscoveryCache {
    /// Creates a cache that fetches documents under `root`, seeded with
    /// `pinned` endpoints that are never fetched.
    pub fn new(root: impl Into<String>, pinned: HashMap<ApiFamily, ServiceEndpoint>) -> Self {
        Self {
            root: root.into(),
            entries: RwLock::new(pinned),
        }
    }

    /// Returns the discovery document URL for a family.
    pub fn document_url(&self, family: ApiFamily) -> String {
        format!(
            "{}/apis/{}/{}/rest",
            self.root.trim_end_matches('/'),
            family.api_name(),
            family.version()
        )
    }

    /// Returns the cached endpoint for a family, if resolved.
    pub async fn cached(&self, family: ApiFamily) -> Option<ServiceEndpoint> {
        self.entries.read().await.get(&family).cloned()
    }

    /// Resolves a family's endpoint, fetching its discovery document on the
    /// first call.
    ///
    /// Concurrent first calls may both fetch; the last write wins and both
    /// values are identical.
    pub async fn resolve(
        &self,
        http: &reqwest::Client,
        family: ApiFamily,
    ) -> GatewayResult<ServiceEndpoint> {
        if let Some(endpoint) = self.cached(family).await {
            return Ok(endpoint);
        }

        let url = self.document_url(family);
        debug!(%url, "fetching discovery document");
        let response = http.get(&url).send().await.map_err(|e| {
            GatewayError::network(format!("discovery request failed for {url}")).with_source(e)
        })?;
        let status = response.status();
        let body = response.text().await.map_err(|e| {
            GatewayError::network("failed to read discovery document").with_source(e)
        })?;
        if !status.is_success() {
            return Err(GatewayError::from_status(status.as_u16(), body));
        }

        let endpoint = parse_document(&body)?;
        self.entries.write().await.insert(family, endpoint.clone());
        Ok(endpoint)
    }
}

/// Extracts the service endpoint from a discovery document.
pub fn parse_document(body: &str) -> GatewayResult<ServiceEndpoint> {
    let endpoint: ServiceEndpoint = serde_json::from_str(body).map_err(|e| {
        GatewayError::invalid_response("invalid discovery document").with_source(e)
    })?;
    if url::Url::parse(&endpoint.root_url).is_err() {
        return Err(GatewayError::invalid_response(format!(
            "discovery document has invalid rootUrl: {}",
            endpoint.root_url
        )));
    }
    Ok(endpoint)
}
