//! The spreadsheet-backed entity store.
//!
//! Groups are spreadsheet files in a fixed-name root folder, sub-groups are
//! tabs, students are rows. Every operation re-resolves what it needs (folder
//! id, sheet id, row index) from the remote API; nothing is cached between
//! calls.

mod groups;
mod members;
mod subgroups;

use std::sync::Arc;

use mixir_core::Subgroup;
use mixir_sheets::{DriveFile, FileQuery, RequestCredentials, Spreadsheet, TabularGateway, a1};
use tracing::{debug, error, warn};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult, error_chain};
use crate::locks::TabLocks;
use crate::principal::UserRecord;

/// Maps roster operations onto gateway calls.
pub struct SheetStore {
    gateway: Arc<dyn TabularGateway>,
    config: StoreConfig,
    locks: TabLocks,
}

impl std::fmt::Debug for SheetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SheetStore {
    pub fn new(gateway: Arc<dyn TabularGateway>, config: StoreConfig) -> Self {
        Self {
            gateway,
            config,
            locks: TabLocks::new(),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Logs a failed operation once, with the acting user and the error chain.
    fn observe<T>(&self, user: &UserRecord, op: &'static str, result: StoreResult<T>) -> StoreResult<T> {
        if let Err(ref err) = result {
            error!(
                user_id = %user.id,
                op,
                kind = err.kind(),
                error = %error_chain(err),
                "store operation failed"
            );
        }
        result
    }

    /// Looks the root folder up by exact name.
    async fn find_folder(&self, creds: &RequestCredentials) -> StoreResult<Option<DriveFile>> {
        let query = FileQuery::folder_named(&self.config.naming.folder_name);
        let mut folders = self.gateway.list_files(creds, &query).await?;
        if folders.len() > 1 {
            warn!(
                count = folders.len(),
                folder = %self.config.naming.folder_name,
                "several root folders match, using the first"
            );
        }
        Ok(if folders.is_empty() {
            None
        } else {
            Some(folders.swap_remove(0))
        })
    }

    async fn spreadsheet(&self, creds: &RequestCredentials, group_id: &str) -> StoreResult<Spreadsheet> {
        Ok(self.gateway.get_spreadsheet(creds, group_id).await?)
    }

    /// Tabs of a spreadsheet minus the reserved one.
    fn subgroups_of(&self, spreadsheet: &Spreadsheet) -> Vec<Subgroup> {
        spreadsheet
            .sheets
            .iter()
            .map(|sheet| &sheet.properties)
            .filter(|props| !self.config.naming.is_reserved_tab(&props.title))
            .map(|props| Subgroup {
                sheet_id: props.sheet_id,
                name: props.title.clone(),
            })
            .collect()
    }

    /// Resolves a tab title to its numeric sheet id.
    async fn sheet_id(&self, creds: &RequestCredentials, group_id: &str, name: &str) -> StoreResult<i64> {
        let spreadsheet = self.spreadsheet(creds, group_id).await?;
        spreadsheet
            .find_sheet(name)
            .map(|props| props.sheet_id)
            .ok_or_else(|| StoreError::SheetNotFound {
                name: name.to_string(),
            })
    }

    /// Reads every row of a tab.
    ///
    /// The bare tab name is tried first. When the API rejects it (400/404)
    /// the tab is looked up in the spreadsheet metadata and read once more
    /// through the explicit quoted range. Rejections in that second tier
    /// mean the id is invalid; transport, auth and 5xx failures are passed
    /// through as upstream failures in both tiers.
    async fn fetch_rows(
        &self,
        creds: &RequestCredentials,
        group_id: &str,
        tab: &str,
    ) -> StoreResult<Vec<Vec<String>>> {
        let first = match self.gateway.get_values(creds, group_id, tab).await {
            Ok(range) => return Ok(range.values),
            Err(err) if err.code().is_client_error() => err,
            Err(err) => return Err(err.into()),
        };
        debug!(group_id, tab, error = %first, "bare range rejected, retrying with quoted range");

        let spreadsheet = self.gateway.get_spreadsheet(creds, group_id).await?;
        let Some(props) = spreadsheet.find_sheet(tab) else {
            return Err(StoreError::invalid_id(first));
        };
        let range = a1::roster_range(&props.title);
        Ok(self.gateway.get_values(creds, group_id, &range).await?.values)
    }
}
