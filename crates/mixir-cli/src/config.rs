//! CLI configuration.
//!
//! All settings live in `~/.config/mixir/config.toml` by default:
//!
//! ```toml
//! [google]
//! client_id = "env::MIXIR_CLIENT_ID"
//! client_secret = "pass::google/mixir"
//!
//! [store]
//! template_file_id = "1AbC..."
//! ```
//!
//! `client_id` and `client_secret` accept `pass::` and `env::` references.

use std::path::{Path, PathBuf};
use std::time::Duration;

use mixir_sheets::google::{GatewayConfig, OAuthCredentials};
use mixir_store::StoreConfig;
use serde::{Deserialize, Serialize};

use crate::error::{CliError, CliResult};
use crate::secret;

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub google: GoogleSettings,
    pub store: StoreConfig,
    /// Where the signed-in user record is kept. Defaults to the data dir.
    pub data_dir: Option<PathBuf>,
}

/// OAuth client and HTTP settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Google Cloud Console JSON, used when the inline values are absent.
    pub credentials_file: Option<PathBuf>,
    pub redirect_uri: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl CliConfig {
    /// Loads the default file, or defaults when it does not exist.
    pub fn load() -> CliResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CliError::Config(format!("failed to read {}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| CliError::Config(format!("failed to parse {}: {e}", path.display())))
    }

    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mixir")
            .join("config.toml")
    }

    /// Directory holding the user record and pending sign-in state.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("mixir")
        })
    }

    /// Checks everything a store command needs.
    pub fn validate(&self) -> CliResult<()> {
        self.google.gateway_config()?;
        if self.store.template_file_id.trim().is_empty() {
            return Err(CliError::Config(
                "store.template_file_id is not set".to_string(),
            ));
        }
        Ok(())
    }
}

impl GoogleSettings {
    /// Resolves the OAuth client from inline values or the credentials file.
    pub fn resolve_credentials(&self) -> CliResult<OAuthCredentials> {
        let credentials = match (&self.client_id, &self.client_secret, &self.credentials_file) {
            (Some(id), Some(secret), _) => {
                OAuthCredentials::new(secret::resolve(id)?, secret::resolve(secret)?)
            }
            (None, None, Some(path)) => OAuthCredentials::from_file(path)?,
            (Some(_), None, _) | (None, Some(_), _) => {
                return Err(CliError::Config(
                    "google.client_id and google.client_secret must be set together".to_string(),
                ));
            }
            (None, None, None) => {
                return Err(CliError::Config(format!(
                    "Google credentials not found. Add to {}:\n  \
                     [google]\n  \
                     client_id = \"YOUR_ID.apps.googleusercontent.com\"\n  \
                     client_secret = \"YOUR_SECRET\"",
                    CliConfig::default_path().display()
                )));
            }
        };
        credentials.validate()?;
        Ok(credentials)
    }

    pub fn gateway_config(&self) -> CliResult<GatewayConfig> {
        let mut config = GatewayConfig::new(self.resolve_credentials()?);
        if let Some(ref uri) = self.redirect_uri {
            config = config.with_redirect_uri(uri);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config: CliConfig = toml::from_str("").unwrap();
        assert_eq!(config.store.naming.folder_name, "Mixir-팀빌딩");
        assert_eq!(config.store.share_message, StoreConfig::DEFAULT_SHARE_MESSAGE);
        assert!(config.google.client_id.is_none());
    }

    #[test]
    fn store_section_overrides_naming() {
        let config: CliConfig = toml::from_str(
            r#"
[store]
template_file_id = "tmpl"
folder_name = "Rosters"
file_prefix = "[R] "
"#,
        )
        .unwrap();
        assert_eq!(config.store.template_file_id, "tmpl");
        assert_eq!(config.store.naming.folder_name, "Rosters");
        assert_eq!(config.store.naming.file_prefix, "[R] ");
        assert_eq!(config.store.naming.reserved_tab, "Mixir 팀빌딩");
    }

    #[test]
    fn inline_credentials() {
        let settings = GoogleSettings {
            client_id: Some("id.apps.googleusercontent.com".to_string()),
            client_secret: Some("secret".to_string()),
            ..Default::default()
        };
        let creds = settings.resolve_credentials().unwrap();
        assert_eq!(creds.client_id, "id.apps.googleusercontent.com");
        assert_eq!(creds.client_secret, "secret");
    }

    #[test]
    fn env_credentials() {
        unsafe {
            std::env::set_var("_MIXIR_CFG_ID", "env-id.apps.googleusercontent.com");
            std::env::set_var("_MIXIR_CFG_SECRET", "env-secret");
        }
        let config: CliConfig = toml::from_str(
            r#"
[google]
client_id = "env::_MIXIR_CFG_ID"
client_secret = "env::_MIXIR_CFG_SECRET"
"#,
        )
        .unwrap();
        let creds = config.google.resolve_credentials().unwrap();
        assert_eq!(creds.client_id, "env-id.apps.googleusercontent.com");
        assert_eq!(creds.client_secret, "env-secret");
        unsafe {
            std::env::remove_var("_MIXIR_CFG_ID");
            std::env::remove_var("_MIXIR_CFG_SECRET");
        }
    }

    #[test]
    fn credentials_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.json");
        std::fs::write(
            &path,
            r#"{"installed": {"client_id": "file-id.apps.googleusercontent.com", "client_secret": "file-secret"}}"#,
        )
        .unwrap();
        let settings = GoogleSettings {
            credentials_file: Some(path),
            ..Default::default()
        };
        let creds = settings.resolve_credentials().unwrap();
        assert_eq!(creds.client_id, "file-id.apps.googleusercontent.com");
    }

    #[test]
    fn half_configured_credentials_fail() {
        let settings = GoogleSettings {
            client_id: Some("id".to_string()),
            ..Default::default()
        };
        let err = settings.resolve_credentials().unwrap_err();
        assert!(err.to_string().contains("must be set together"));
        assert!(GoogleSettings::default().resolve_credentials().is_err());
    }

    #[test]
    fn gateway_config_applies_overrides() {
        let settings = GoogleSettings {
            client_id: Some("id.apps.googleusercontent.com".to_string()),
            client_secret: Some("secret".to_string()),
            redirect_uri: Some("http://localhost:9000/cb".to_string()),
            timeout_secs: Some(5),
            ..Default::default()
        };
        let config = settings.gateway_config().unwrap();
        assert_eq!(config.redirect_uri, "http://localhost:9000/cb");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn validate_requires_template() {
        let mut config = CliConfig {
            google: GoogleSettings {
                client_id: Some("id.apps.googleusercontent.com".to_string()),
                client_secret: Some("secret".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
        config.store.template_file_id = "tmpl".to_string();
        config.validate().unwrap();
    }
}
