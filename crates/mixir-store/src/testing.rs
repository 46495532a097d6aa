//! In-memory gateway used by the store tests.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{Duration, Utc};
use mixir_sheets::gateway::{AddSheetReply, Reply};
use mixir_sheets::requests::Request;
use mixir_sheets::{
    BatchUpdateResponse, BoxFuture, DriveFile, FOLDER_MIME_TYPE, FileQuery, GatewayError,
    GatewayResult, Permission, RequestCredentials, SPREADSHEET_MIME_TYPE, Sheet, SheetProperties,
    Spreadsheet, SpreadsheetProperties, StoredCredential, TabularGateway, ValueRange,
};

use crate::principal::UserRecord;

pub const TEMPLATE_ID: &str = "template";

#[derive(Debug, Clone)]
struct MemFile {
    id: String,
    name: String,
    mime_type: String,
    parent: Option<String>,
}

#[derive(Debug, Clone)]
struct MemTab {
    sheet_id: i64,
    title: String,
    rows: Vec<Vec<String>>,
}

#[derive(Debug, Default)]
struct State {
    files: Vec<MemFile>,
    books: HashMap<String, Vec<MemTab>>,
    permissions: Vec<(String, Permission)>,
    next_id: i64,
    calls: Vec<String>,
    failures: HashMap<String, GatewayError>,
    /// When set, ranges that are not quoted fail with 400.
    reject_bare_ranges: bool,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn take_failure(&mut self, op: &str) -> GatewayResult<()> {
        match self.failures.remove(op) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn book(&mut self, id: &str) -> GatewayResult<&mut Vec<MemTab>> {
        self.books
            .get_mut(id)
            .ok_or_else(|| GatewayError::from_status(404, format!("Requested entity was not found: {id}")))
    }
}

/// Drive and Sheets held in memory, with a call log and one-shot failure
/// injection per operation name.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    state: Mutex<State>,
}

impl MemoryGateway {
    /// A gateway holding the template file with its reserved tab.
    pub fn new() -> Self {
        let gateway = Self::default();
        {
            let mut state = gateway.state.lock().unwrap();
            state.files.push(MemFile {
                id: TEMPLATE_ID.to_string(),
                name: "template".to_string(),
                mime_type: SPREADSHEET_MIME_TYPE.to_string(),
                parent: None,
            });
            state.books.insert(
                TEMPLATE_ID.to_string(),
                vec![MemTab {
                    sheet_id: 0,
                    title: "Mixir 팀빌딩".to_string(),
                    rows: Vec::new(),
                }],
            );
        }
        gateway
    }

    pub fn add_folder(&self, name: &str) -> String {
        let mut state = self.state.lock().unwrap();
        let id = format!("folder-{}", state.next_id());
        state.files.push(MemFile {
            id: id.clone(),
            name: name.to_string(),
            mime_type: FOLDER_MIME_TYPE.to_string(),
            parent: None,
        });
        id
    }

    /// Adds a spreadsheet with the given title and tabs.
    pub fn add_spreadsheet(&self, parent: &str, name: &str, tabs: &[&str]) -> String {
        let mut state = self.state.lock().unwrap();
        let id = format!("sheet-{}", state.next_id());
        state.files.push(MemFile {
            id: id.clone(),
            name: name.to_string(),
            mime_type: SPREADSHEET_MIME_TYPE.to_string(),
            parent: Some(parent.to_string()),
        });
        let mut book = Vec::new();
        for title in tabs {
            let sheet_id = state.next_id();
            book.push(MemTab {
                sheet_id,
                title: title.to_string(),
                rows: Vec::new(),
            });
        }
        state.books.insert(id.clone(), book);
        id
    }

    /// Replaces the rows of a tab.
    pub fn set_rows(&self, spreadsheet_id: &str, tab: &str, rows: &[&[&str]]) {
        let mut state = self.state.lock().unwrap();
        let book = state.books.get_mut(spreadsheet_id).unwrap();
        let tab = book.iter_mut().find(|t| t.title == tab).unwrap();
        tab.rows = rows
            .iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect();
    }

    pub fn rows(&self, spreadsheet_id: &str, tab: &str) -> Vec<Vec<String>> {
        let state = self.state.lock().unwrap();
        state.books[spreadsheet_id]
            .iter()
            .find(|t| t.title == tab)
            .map(|t| t.rows.clone())
            .unwrap_or_default()
    }

    pub fn tab_titles(&self, spreadsheet_id: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.books[spreadsheet_id]
            .iter()
            .map(|t| t.title.clone())
            .collect()
    }

    pub fn file_name(&self, file_id: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .files
            .iter()
            .find(|f| f.id == file_id)
            .map(|f| f.name.clone())
    }

    pub fn permissions(&self) -> Vec<(String, Permission)> {
        self.state.lock().unwrap().permissions.clone()
    }

    /// Makes the next call of `op` fail with `err`.
    pub fn fail_next(&self, op: &str, err: GatewayError) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(op.to_string(), err);
    }

    pub fn reject_bare_ranges(&self) {
        self.state.lock().unwrap().reject_bare_ranges = true;
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    /// Returns true if any batch update was issued since the last clear.
    pub fn wrote(&self) -> bool {
        self.calls().iter().any(|c| c.starts_with("batch_update"))
    }

    fn list_files_sync(&self, query: &FileQuery) -> GatewayResult<Vec<DriveFile>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("list_files".to_string());
        state.take_failure("list_files")?;
        let mut files: Vec<DriveFile> = state
            .files
            .iter()
            .filter(|f| query.name.as_ref().is_none_or(|n| &f.name == n))
            .filter(|f| query.mime_type.as_ref().is_none_or(|m| &f.mime_type == m))
            .filter(|f| query.parent.is_none() || f.parent == query.parent)
            .map(|f| DriveFile {
                id: f.id.clone(),
                name: f.name.clone(),
                mime_type: Some(f.mime_type.clone()),
            })
            .collect();
        if query.order_by.as_deref() == Some("name") {
            files.sort_by(|a, b| a.name.cmp(&b.name));
        }
        Ok(files)
    }

    fn create_folder_sync(&self, name: &str) -> GatewayResult<DriveFile> {
        {
            let mut state = self.state.lock().unwrap();
            state.calls.push("create_folder".to_string());
            state.take_failure("create_folder")?;
        }
        let id = self.add_folder(name);
        Ok(DriveFile {
            id,
            name: name.to_string(),
            mime_type: Some(FOLDER_MIME_TYPE.to_string()),
        })
    }

    fn copy_file_sync(&self, file_id: &str, name: &str, parent_id: &str) -> GatewayResult<DriveFile> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("copy_file".to_string());
        state.take_failure("copy_file")?;
        let tabs = state.book(file_id)?.clone();
        let id = format!("sheet-{}", state.next_id());
        state.files.push(MemFile {
            id: id.clone(),
            name: name.to_string(),
            mime_type: SPREADSHEET_MIME_TYPE.to_string(),
            parent: Some(parent_id.to_string()),
        });
        state.books.insert(id.clone(), tabs);
        Ok(DriveFile {
            id,
            name: name.to_string(),
            mime_type: Some(SPREADSHEET_MIME_TYPE.to_string()),
        })
    }

    fn delete_file_sync(&self, file_id: &str) -> GatewayResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("delete_file".to_string());
        state.take_failure("delete_file")?;
        let before = state.files.len();
        state.files.retain(|f| f.id != file_id);
        if state.files.len() == before {
            return Err(GatewayError::from_status(404, "File not found"));
        }
        state.books.remove(file_id);
        Ok(())
    }

    fn create_permission_sync(&self, file_id: &str, permission: &Permission) -> GatewayResult<String> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("create_permission".to_string());
        state.take_failure("create_permission")?;
        state.book(file_id)?;
        state
            .permissions
            .push((file_id.to_string(), permission.clone()));
        Ok(format!("perm-{}", state.permissions.len()))
    }

    fn get_spreadsheet_sync(&self, spreadsheet_id: &str) -> GatewayResult<Spreadsheet> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("get_spreadsheet".to_string());
        state.take_failure("get_spreadsheet")?;
        let title = state
            .files
            .iter()
            .find(|f| f.id == spreadsheet_id)
            .map(|f| f.name.clone())
            .unwrap_or_default();
        let sheets = state
            .book(spreadsheet_id)?
            .iter()
            .enumerate()
            .map(|(index, tab)| Sheet {
                properties: SheetProperties {
                    sheet_id: tab.sheet_id,
                    title: tab.title.clone(),
                    index: index as i64,
                },
            })
            .collect();
        Ok(Spreadsheet {
            spreadsheet_id: spreadsheet_id.to_string(),
            properties: SpreadsheetProperties { title },
            sheets,
        })
    }

    fn get_values_sync(&self, spreadsheet_id: &str, range: &str) -> GatewayResult<ValueRange> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("get_values:{range}"));
        state.take_failure("get_values")?;
        let (title, column_a) = match parse_quoted(range) {
            Some((title, cells)) => (title, cells == "A:A"),
            None if state.reject_bare_ranges => {
                return Err(GatewayError::from_status(400, format!("Unable to parse range: {range}")));
            }
            None => (range.to_string(), false),
        };
        let tab = state
            .book(spreadsheet_id)?
            .iter()
            .find(|t| t.title == title)
            .ok_or_else(|| GatewayError::from_status(400, format!("Unable to parse range: {range}")))?;
        let values = if column_a {
            tab.rows
                .iter()
                .map(|row| row.iter().take(1).cloned().collect())
                .collect()
        } else {
            tab.rows.clone()
        };
        Ok(ValueRange {
            range: Some(range.to_string()),
            values,
        })
    }

    fn batch_update_sync(
        &self,
        spreadsheet_id: &str,
        requests: Vec<Request>,
    ) -> GatewayResult<BatchUpdateResponse> {
        let mut state = self.state.lock().unwrap();
        let kinds: Vec<&str> = requests.iter().map(Request::kind).collect();
        state.calls.push(format!("batch_update:{}", kinds.join(",")));
        state.take_failure("batch_update")?;
        for kind in &kinds {
            state.take_failure(&format!("batch_update:{kind}"))?;
        }
        let new_id = state.next_id();
        let mut replies = Vec::new();
        for request in requests {
            let mut reply = Reply::default();
            match request {
                Request::UpdateSpreadsheetProperties(update) => {
                    let file = state
                        .files
                        .iter_mut()
                        .find(|f| f.id == spreadsheet_id)
                        .ok_or_else(|| GatewayError::from_status(404, "not found"))?;
                    file.name = update.properties.title;
                }
                other => {
                    let book = state.book(spreadsheet_id)?;
                    reply.add_sheet = apply(book, other, new_id)?;
                }
            }
            replies.push(reply);
        }
        Ok(BatchUpdateResponse {
            spreadsheet_id: spreadsheet_id.to_string(),
            replies,
        })
    }
}

fn tab_mut(book: &mut [MemTab], sheet_id: i64) -> GatewayResult<&mut MemTab> {
    book.iter_mut()
        .find(|t| t.sheet_id == sheet_id)
        .ok_or_else(|| GatewayError::from_status(400, format!("No grid with id: {sheet_id}")))
}

fn cells(row: &mixir_sheets::requests::RowData) -> Vec<String> {
    let mut cells: Vec<String> = row
        .values
        .iter()
        .map(|c| c.user_entered_value.string_value.clone())
        .collect();
    // The values API omits trailing empty cells.
    while cells.last().is_some_and(|c| c.is_empty()) {
        cells.pop();
    }
    cells
}

fn apply(book: &mut Vec<MemTab>, request: Request, new_id: i64) -> GatewayResult<Option<AddSheetReply>> {
    match request {
        Request::AddSheet(add) => {
            if book.iter().any(|t| t.title == add.properties.title) {
                return Err(GatewayError::from_status(400, "A sheet with this name already exists"));
            }
            let properties = SheetProperties {
                sheet_id: new_id,
                title: add.properties.title,
                index: book.len() as i64,
            };
            book.push(MemTab {
                sheet_id: new_id,
                title: properties.title.clone(),
                rows: Vec::new(),
            });
            return Ok(Some(AddSheetReply { properties }));
        }
        Request::DeleteSheet(delete) => {
            tab_mut(book, delete.sheet_id)?;
            book.retain(|t| t.sheet_id != delete.sheet_id);
        }
        Request::UpdateSheetProperties(update) => {
            tab_mut(book, update.properties.sheet_id)?.title = update.properties.title;
        }
        Request::AppendCells(append) => {
            let tab = tab_mut(book, append.sheet_id)?;
            tab.rows.extend(append.rows.iter().map(cells));
        }
        Request::UpdateCells(update) => {
            let tab = tab_mut(book, update.range.sheet_id)?;
            let index = update.range.start_row_index as usize;
            if index >= tab.rows.len() {
                tab.rows.resize(index + 1, Vec::new());
            }
            if let Some(row) = update.rows.first() {
                tab.rows[index] = cells(row);
            }
        }
        Request::DeleteDimension(delete) => {
            let tab = tab_mut(book, delete.range.sheet_id)?;
            let start = delete.range.start_index as usize;
            let end = (delete.range.end_index as usize).min(tab.rows.len());
            if start < end {
                tab.rows.drain(start..end);
            }
        }
        Request::UpdateSpreadsheetProperties(_) => {}
    }
    Ok(None)
}

/// Splits `'<title>'!<cells>` into the unquoted title and the cell part.
fn parse_quoted(range: &str) -> Option<(String, String)> {
    let rest = range.strip_prefix('\'')?;
    let mut title = String::new();
    let mut chars = rest.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\'' {
            if chars.peek() == Some(&'\'') {
                chars.next();
                title.push('\'');
                continue;
            }
            let remainder: String = chars.collect();
            return remainder
                .strip_prefix('!')
                .map(|cells| (title, cells.to_string()));
        }
        title.push(c);
    }
    None
}

impl TabularGateway for MemoryGateway {
    fn list_files<'a>(
        &'a self,
        _creds: &'a RequestCredentials,
        query: &'a FileQuery,
    ) -> BoxFuture<'a, GatewayResult<Vec<DriveFile>>> {
        Box::pin(async move { self.list_files_sync(query) })
    }

    fn create_folder<'a>(
        &'a self,
        _creds: &'a RequestCredentials,
        name: &'a str,
    ) -> BoxFuture<'a, GatewayResult<DriveFile>> {
        Box::pin(async move { self.create_folder_sync(name) })
    }

    fn copy_file<'a>(
        &'a self,
        _creds: &'a RequestCredentials,
        file_id: &'a str,
        name: &'a str,
        parent_id: &'a str,
    ) -> BoxFuture<'a, GatewayResult<DriveFile>> {
        Box::pin(async move { self.copy_file_sync(file_id, name, parent_id) })
    }

    fn delete_file<'a>(
        &'a self,
        _creds: &'a RequestCredentials,
        file_id: &'a str,
    ) -> BoxFuture<'a, GatewayResult<()>> {
        Box::pin(async move { self.delete_file_sync(file_id) })
    }

    fn create_permission<'a>(
        &'a self,
        _creds: &'a RequestCredentials,
        file_id: &'a str,
        permission: &'a Permission,
    ) -> BoxFuture<'a, GatewayResult<String>> {
        Box::pin(async move { self.create_permission_sync(file_id, permission) })
    }

    fn get_spreadsheet<'a>(
        &'a self,
        _creds: &'a RequestCredentials,
        spreadsheet_id: &'a str,
    ) -> BoxFuture<'a, GatewayResult<Spreadsheet>> {
        Box::pin(async move { self.get_spreadsheet_sync(spreadsheet_id) })
    }

    fn get_values<'a>(
        &'a self,
        _creds: &'a RequestCredentials,
        spreadsheet_id: &'a str,
        range: &'a str,
    ) -> BoxFuture<'a, GatewayResult<ValueRange>> {
        Box::pin(async move { self.get_values_sync(spreadsheet_id, range) })
    }

    fn batch_update<'a>(
        &'a self,
        _creds: &'a RequestCredentials,
        spreadsheet_id: &'a str,
        requests: Vec<Request>,
    ) -> BoxFuture<'a, GatewayResult<BatchUpdateResponse>> {
        Box::pin(async move { self.batch_update_sync(spreadsheet_id, requests) })
    }
}

pub fn user() -> UserRecord {
    let credential = StoredCredential::new("access", "refresh", Utc::now() + Duration::hours(1));
    UserRecord::new("user-1", "owner@example.com", credential)
}

#[test]
fn parse_quoted_ranges() {
    assert_eq!(
        parse_quoted("'1조'!A1:Z1000"),
        Some(("1조".to_string(), "A1:Z1000".to_string()))
    );
    assert_eq!(
        parse_quoted("'Kim''s'!A:A"),
        Some(("Kim's".to_string(), "A:A".to_string()))
    );
    assert_eq!(parse_quoted("1조"), None);
}
