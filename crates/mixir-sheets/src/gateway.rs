//! The [`TabularGateway`] trait and the resources it returns.
//!
//! The gateway covers two resource families: Drive files and folders, and
//! spreadsheet metadata, values and structural updates. Every method takes
//! explicit [`RequestCredentials`]; implementations keep no session.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::credentials::RequestCredentials;
use crate::error::GatewayResult;
use crate::requests::Request;

/// MIME type of a Drive folder.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// MIME type of a Google spreadsheet.
pub const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

/// A boxed future for the object-safe gateway trait.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Search filter for [`TabularGateway::list_files`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileQuery {
    /// Exact display name.
    pub name: Option<String>,
    pub mime_type: Option<String>,
    /// Id of a folder the file must be in.
    pub parent: Option<String>,
    /// Include files in the trash. Off by default.
    pub include_trashed: bool,
    /// Drive `orderBy` expression, e.g. `name`.
    pub order_by: Option<String>,
}

impl FileQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Query for folders with an exact name.
    pub fn folder_named(name: impl Into<String>) -> Self {
        Self::new()
            .with_name(name)
            .with_mime_type(FOLDER_MIME_TYPE)
    }

    /// Query for spreadsheets inside a folder, sorted by name.
    pub fn spreadsheets_in(folder_id: impl Into<String>) -> Self {
        Self::new()
            .with_mime_type(SPREADSHEET_MIME_TYPE)
            .with_parent(folder_id)
            .with_order_by("name")
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    /// Renders the Drive `q` search expression.
    pub fn to_query(&self) -> String {
        let mut clauses = Vec::new();
        if let Some(ref name) = self.name {
            clauses.push(format!("name = '{}'", escape_literal(name)));
        }
        if let Some(ref mime_type) = self.mime_type {
            clauses.push(format!("mimeType = '{}'", escape_literal(mime_type)));
        }
        if let Some(ref parent) = self.parent {
            clauses.push(format!("'{}' in parents", escape_literal(parent)));
        }
        if !self.include_trashed {
            clauses.push("trashed = false".to_string());
        }
        clauses.join(" and ")
    }
}

/// Escapes a string literal for a Drive search expression.
fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// A Drive file or folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
}

/// Access level granted by a permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionRole {
    Reader,
    Commenter,
    Writer,
}

/// A permission grant to a single user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    pub role: PermissionRole,
    pub email_address: String,
    /// Send Drive's share notification email.
    pub notify: bool,
    /// Message included in the notification email.
    pub message: Option<String>,
}

impl Permission {
    /// Grants `writer` to a user and notifies them.
    pub fn writer(email_address: impl Into<String>) -> Self {
        Self {
            role: PermissionRole::Writer,
            email_address: email_address.into(),
            notify: true,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Spreadsheet metadata: title and tabs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spreadsheet {
    pub spreadsheet_id: String,
    #[serde(default)]
    pub properties: SpreadsheetProperties,
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

impl Spreadsheet {
    /// Finds a tab by exact title.
    pub fn find_sheet(&self, title: &str) -> Option<&SheetProperties> {
        self.sheets
            .iter()
            .map(|sheet| &sheet.properties)
            .find(|props| props.title == title)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreadsheetProperties {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    pub properties: SheetProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    /// Sheet 0 is omitted from the JSON by the API.
    #[serde(default)]
    pub sheet_id: i64,
    pub title: String,
    #[serde(default)]
    pub index: i64,
}

/// Cell values of a range, row-major.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default)]
    pub range: Option<String>,
    /// Absent when the range is empty.
    #[serde(default)]
    pub values: Vec<Vec<String>>,
}

/// Result of a batch update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateResponse {
    #[serde(default)]
    pub spreadsheet_id: String,
    /// One reply per request, in request order.
    #[serde(default)]
    pub replies: Vec<Reply>,
}

impl BatchUpdateResponse {
    /// Returns the properties of the first sheet added by this batch.
    pub fn added_sheet(&self) -> Option<&SheetProperties> {
        self.replies
            .iter()
            .find_map(|reply| reply.add_sheet.as_ref())
            .map(|added| &added.properties)
    }
}

/// A single batch update reply. Only `addSheet` replies carry data we use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    #[serde(default)]
    pub add_sheet: Option<AddSheetReply>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddSheetReply {
    pub properties: SheetProperties,
}

/// Typed client over Drive and Sheets.
///
/// Implementations never retry. The only extra remote call a method may make
/// is an access-token refresh when the credentials are expired and carry a
/// refresh token.
pub trait TabularGateway: Send + Sync {
    /// Lists files matching `query`, following pagination.
    fn list_files<'a>(
        &'a self,
        creds: &'a RequestCredentials,
        query: &'a FileQuery,
    ) -> BoxFuture<'a, GatewayResult<Vec<DriveFile>>>;

    /// Creates a folder at the root of the user's Drive.
    fn create_folder<'a>(
        &'a self,
        creds: &'a RequestCredentials,
        name: &'a str,
    ) -> BoxFuture<'a, GatewayResult<DriveFile>>;

    /// Copies a file into `parent_id` under a new name.
    fn copy_file<'a>(
        &'a self,
        creds: &'a RequestCredentials,
        file_id: &'a str,
        name: &'a str,
        parent_id: &'a str,
    ) -> BoxFuture<'a, GatewayResult<DriveFile>>;

    /// Permanently deletes a file.
    fn delete_file<'a>(
        &'a self,
        creds: &'a RequestCredentials,
        file_id: &'a str,
    ) -> BoxFuture<'a, GatewayResult<()>>;

    /// Grants a permission on a file; returns the permission id.
    fn create_permission<'a>(
        &'a self,
        creds: &'a RequestCredentials,
        file_id: &'a str,
        permission: &'a Permission,
    ) -> BoxFuture<'a, GatewayResult<String>>;

    /// Reads spreadsheet title and tab properties.
    fn get_spreadsheet<'a>(
        &'a self,
        creds: &'a RequestCredentials,
        spreadsheet_id: &'a str,
    ) -> BoxFuture<'a, GatewayResult<Spreadsheet>>;

    /// Reads the values of an A1 range.
    fn get_values<'a>(
        &'a self,
        creds: &'a RequestCredentials,
        spreadsheet_id: &'a str,
        range: &'a str,
    ) -> BoxFuture<'a, GatewayResult<ValueRange>>;

    /// Applies structural requests atomically.
    fn batch_update<'a>(
        &'a self,
        creds: &'a RequestCredentials,
        spreadsheet_id: &'a str,
        requests: Vec<Request>,
    ) -> BoxFuture<'a, GatewayResult<BatchUpdateResponse>>;
}
