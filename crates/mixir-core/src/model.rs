//! Roster domain types.
//!
//! A *group* is one spreadsheet file, a *sub-group* is a tab inside it, and a
//! *student* is a data row inside a tab. These types carry no knowledge of the
//! remote API; the store converts them to and from sheet rows.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Student gender, stored in the sheet as a single display glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Returns the glyph written to the gender column.
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Male => "남",
            Self::Female => "여",
        }
    }

    /// Maps a gender column glyph back to a gender.
    ///
    /// Returns `None` for anything outside the two known glyphs; callers
    /// treat that as corrupt data rather than picking a default.
    pub fn from_glyph(glyph: &str) -> Option<Self> {
        match glyph {
            "남" => Some(Self::Male),
            "여" => Some(Self::Female),
            _ => None,
        }
    }

    /// Returns the API name (`male` / `female`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown gender name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown gender '{0}', expected 'male' or 'female'")]
pub struct ParseGenderError(pub String);

impl FromStr for Gender {
    type Err = ParseGenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Self::Male),
            "female" | "f" => Ok(Self::Female),
            _ => Err(ParseGenderError(s.to_string())),
        }
    }
}

/// The editable fields of a member row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberFields {
    pub name: String,
    pub gender: Gender,
    #[serde(default)]
    pub level: Option<String>,
}

impl MemberFields {
    pub fn new(name: impl Into<String>, gender: Gender) -> Self {
        Self {
            name: name.into(),
            gender,
            level: None,
        }
    }

    /// Builder method to set the level column.
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }
}

/// A member row as read from a sub-group tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Column 0. Dense, 1-based, derived from the row count at insert time.
    pub student_id: String,
    pub name: String,
    pub gender: Gender,
    /// `None` when the row has no fourth cell.
    pub level: Option<String>,
}

impl Student {
    /// Combines an id with member fields.
    pub fn from_fields(student_id: impl Into<String>, fields: MemberFields) -> Self {
        Self {
            student_id: student_id.into(),
            name: fields.name,
            gender: fields.gender,
            level: fields.level,
        }
    }
}

/// A group as listed from the root folder, with the file prefix removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub group_id: String,
    pub name: String,
}

/// A sub-group tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subgroup {
    pub sheet_id: i64,
    pub name: String,
}

/// A group with its sub-groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupInfo {
    pub group_id: String,
    pub name: String,
    pub subgroups: Vec<Subgroup>,
}
