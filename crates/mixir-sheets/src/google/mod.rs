//! Google implementation of the gateway.
//!
//! - [`GoogleGateway`]: reqwest client over Drive v3 and Sheets v4
//! - [`OAuthClient`]: consent URL, code exchange, refresh and userinfo
//! - [`DiscoveryCache`]: memoized service endpoints per API family
//!
//! # Example
//!
//! ```ignore
//! use mixir_sheets::google::{GatewayConfig, GoogleGateway, OAuthCredentials};
//!
//! let credentials = OAuthCredentials::from_file("client_secret.json")?;
//! let gateway = GoogleGateway::new(GatewayConfig::new(credentials))?;
//! let files = gateway.list_files(&creds, &FileQuery::folder_named("Mixir-팀빌딩")).await?;
//! ```

mod client;
mod config;
pub mod discovery;
mod oauth;

pub use client::GoogleGateway;
pub use config::{GatewayConfig, OAuthCredentials};
pub use discovery::{ApiFamily, DiscoveryCache, ServiceEndpoint};
pub use oauth::{AuthorizationFlow, OAuthClient, RefreshedToken, TokenSet, UserInfo};
