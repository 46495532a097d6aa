//! Naming conventions that mark files and tabs as owned by mixir.

use serde::{Deserialize, Serialize};

/// Header row written to every sub-group tab: id, name, gender, level.
pub const HEADER_LABELS: [&str; 4] = ["번호", "이름", "성별", "수준"];

/// Display-name conventions for the root folder, group files and tabs.
///
/// The file prefix is the only marker separating mixir groups from other
/// spreadsheets that happen to live in the same folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Naming {
    /// Name of the root folder holding every group.
    pub folder_name: String,
    /// Prefix applied to every group file name.
    pub file_prefix: String,
    /// Tab carried over from the template that is never a sub-group.
    pub reserved_tab: String,
}

impl Default for Naming {
    fn default() -> Self {
        Self {
            folder_name: Self::DEFAULT_FOLDER_NAME.to_string(),
            file_prefix: Self::DEFAULT_FILE_PREFIX.to_string(),
            reserved_tab: Self::DEFAULT_RESERVED_TAB.to_string(),
        }
    }
}

impl Naming {
    pub const DEFAULT_FOLDER_NAME: &'static str = "Mixir-팀빌딩";
    pub const DEFAULT_FILE_PREFIX: &'static str = "[Mixir 팀빌딩] ";
    pub const DEFAULT_RESERVED_TAB: &'static str = "Mixir 팀빌딩";

    /// Returns the stored file name for a group name.
    ///
    /// Group creation and group rename both go through here.
    pub fn file_name(&self, group_name: &str) -> String {
        format!("{}{}", self.file_prefix, group_name)
    }

    /// Returns the group name for a stored file name, or `None` when the
    /// file does not carry the prefix.
    pub fn group_name<'a>(&self, file_name: &'a str) -> Option<&'a str> {
        file_name.strip_prefix(self.file_prefix.as_str())
    }

    /// Returns true if a tab with this title is never listed as a sub-group.
    pub fn is_reserved_tab(&self, title: &str) -> bool {
        title == self.reserved_tab
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_applies_prefix() {
        let naming = Naming::default();
        assert_eq!(naming.file_name("Foo"), "[Mixir 팀빌딩] Foo");
    }

    #[test]
    fn group_name_strips_prefix() {
        let naming = Naming::default();
        assert_eq!(naming.group_name("[Mixir 팀빌딩] Foo"), Some("Foo"));
        assert_eq!(naming.group_name("Budget 2024"), None);
        // Only a leading prefix counts.
        assert_eq!(naming.group_name("Copy of [Mixir 팀빌딩] Foo"), None);
    }

    #[test]
    fn file_name_round_trips_through_group_name() {
        let naming = Naming::default();
        let stored = naming.file_name("2학년 3반");
        assert_eq!(naming.group_name(&stored), Some("2학년 3반"));
    }

    #[test]
    fn reserved_tab() {
        let naming = Naming::default();
        assert!(naming.is_reserved_tab("Mixir 팀빌딩"));
        assert!(!naming.is_reserved_tab("Mixir-팀빌딩"));
        assert!(!naming.is_reserved_tab("1조"));
    }

    #[test]
    fn partial_naming_keeps_defaults() {
        let naming: Naming = serde_json::from_str(r#"{"folder_name": "Rosters"}"#).unwrap();
        assert_eq!(naming.folder_name, "Rosters");
        assert_eq!(naming.file_prefix, Naming::DEFAULT_FILE_PREFIX);
        assert_eq!(naming.reserved_tab, Naming::DEFAULT_RESERVED_TAB);
    }
}
