//! Store configuration.

use mixir_core::Naming;
use serde::{Deserialize, Serialize};

/// Settings the store needs besides the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// File copied for every new group. Must carry the reserved tab.
    #[serde(default)]
    pub template_file_id: String,
    #[serde(flatten)]
    pub naming: Naming,
    /// Text of the Drive notification sent when a group is shared.
    #[serde(default = "default_share_message")]
    pub share_message: String,
}

fn default_share_message() -> String {
    StoreConfig::DEFAULT_SHARE_MESSAGE.to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            template_file_id: String::new(),
            naming: Naming::default(),
            share_message: default_share_message(),
        }
    }
}

impl StoreConfig {
    pub const DEFAULT_SHARE_MESSAGE: &'static str = "Mixir 팀빌딩 스프레드시트가 공유되었습니다.";

    pub fn new(template_file_id: impl Into<String>) -> Self {
        Self {
            template_file_id: template_file_id.into(),
            ..Default::default()
        }
    }

    pub fn with_naming(mut self, naming: Naming) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_share_message(mut self, message: impl Into<String>) -> Self {
        self.share_message = message.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = StoreConfig::new("template-1");
        assert_eq!(config.template_file_id, "template-1");
        assert_eq!(config.naming, Naming::default());
        assert_eq!(config.share_message, StoreConfig::DEFAULT_SHARE_MESSAGE);
    }

    #[test]
    fn flattened_naming() {
        let json = r#"{"template_file_id": "t", "folder_name": "Rosters"}"#;
        let config: StoreConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.naming.folder_name, "Rosters");
        assert_eq!(config.naming.file_prefix, Naming::DEFAULT_FILE_PREFIX);
        assert_eq!(config.share_message, StoreConfig::DEFAULT_SHARE_MESSAGE);
    }
}
