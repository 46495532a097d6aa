//! Group (spreadsheet file) operations.

use mixir_core::{GroupInfo, GroupSummary};
use mixir_sheets::{FileQuery, Permission, RequestCredentials, Request};
use tracing::info;

use super::SheetStore;
use crate::error::{StoreError, StoreResult};
use crate::principal::UserRecord;

/// Marker Drive puts in the error body when the address cannot receive a
/// share.
const INVALID_SHARING_MARKER: &str = "invalidSharingRequest";

impl SheetStore {
    /// Lists the user's groups, sorted by stored file name.
    ///
    /// Returns an empty list when the root folder does not exist. Files
    /// without the group prefix are skipped.
    pub async fn list_groups(&self, user: &UserRecord) -> StoreResult<Vec<GroupSummary>> {
        let creds = user.request_credentials();
        let result = self.list_groups_with(&creds).await;
        self.observe(user, "list_groups", result)
    }

    async fn list_groups_with(&self, creds: &RequestCredentials) -> StoreResult<Vec<GroupSummary>> {
        let Some(folder) = self.find_folder(creds).await? else {
            return Ok(Vec::new());
        };
        let files = self
            .gateway
            .list_files(creds, &FileQuery::spreadsheets_in(&folder.id))
            .await?;
        let naming = &self.config.naming;
        Ok(files
            .into_iter()
            .filter_map(|file| {
                let name = naming.group_name(&file.name)?.to_string();
                Some(GroupSummary {
                    group_id: file.id,
                    name,
                })
            })
            .collect())
    }

    /// Copies the template into the root folder as a new group and returns
    /// its id.
    pub async fn create_group(&self, user: &UserRecord, name: &str) -> StoreResult<String> {
        let creds = user.request_credentials();
        let result = self.create_group_with(&creds, name).await;
        self.observe(user, "create_group", result)
    }

    async fn create_group_with(&self, creds: &RequestCredentials, name: &str) -> StoreResult<String> {
        let folder = self
            .find_folder(creds)
            .await?
            .ok_or_else(|| StoreError::FolderNotFound {
                name: self.config.naming.folder_name.clone(),
            })?;
        let file_name = self.config.naming.file_name(name);
        let copy = self
            .gateway
            .copy_file(creds, &self.config.template_file_id, &file_name, &folder.id)
            .await?;
        info!(group_id = %copy.id, name, "created group");
        Ok(copy.id)
    }

    /// Returns the root folder id, creating the folder when absent.
    pub async fn ensure_folder(&self, user: &UserRecord) -> StoreResult<String> {
        let creds = user.request_credentials();
        let result = self.ensure_folder_with(&creds).await;
        self.observe(user, "ensure_folder", result)
    }

    async fn ensure_folder_with(&self, creds: &RequestCredentials) -> StoreResult<String> {
        if let Some(folder) = self.find_folder(creds).await? {
            return Ok(folder.id);
        }
        let folder = self
            .gateway
            .create_folder(creds, &self.config.naming.folder_name)
            .await?;
        info!(folder_id = %folder.id, "created root folder");
        Ok(folder.id)
    }

    /// Permanently deletes a group file.
    pub async fn delete_group(&self, user: &UserRecord, group_id: &str) -> StoreResult<()> {
        let creds = user.request_credentials();
        let result = self
            .gateway
            .delete_file(&creds, group_id)
            .await
            .map_err(StoreError::from);
        self.observe(user, "delete_group", result)
    }

    /// Returns the group name and its sub-groups.
    pub async fn get_group_info(&self, user: &UserRecord, group_id: &str) -> StoreResult<GroupInfo> {
        let creds = user.request_credentials();
        let result = self.get_group_info_with(&creds, group_id).await;
        self.observe(user, "get_group_info", result)
    }

    async fn get_group_info_with(
        &self,
        creds: &RequestCredentials,
        group_id: &str,
    ) -> StoreResult<GroupInfo> {
        let spreadsheet = self.spreadsheet(creds, group_id).await?;
        let title = &spreadsheet.properties.title;
        let name = self
            .config
            .naming
            .group_name(title)
            .unwrap_or(title)
            .to_string();
        Ok(GroupInfo {
            group_id: spreadsheet.spreadsheet_id.clone(),
            name,
            subgroups: self.subgroups_of(&spreadsheet),
        })
    }

    /// Renames a group, re-applying the file prefix.
    pub async fn rename_group(
        &self,
        user: &UserRecord,
        group_id: &str,
        new_name: &str,
    ) -> StoreResult<()> {
        let creds = user.request_credentials();
        let title = self.config.naming.file_name(new_name);
        let result = self
            .gateway
            .batch_update(&creds, group_id, vec![Request::rename_spreadsheet(title)])
            .await
            .map(drop)
            .map_err(StoreError::from);
        self.observe(user, "rename_group", result)
    }

    /// Grants `writer` on a group to an email address, with notification.
    pub async fn share_group(
        &self,
        user: &UserRecord,
        group_id: &str,
        email: &str,
    ) -> StoreResult<()> {
        let creds = user.request_credentials();
        let permission = Permission::writer(email).with_message(&self.config.share_message);
        let result = match self
            .gateway
            .create_permission(&creds, group_id, &permission)
            .await
        {
            Ok(permission_id) => {
                info!(group_id, permission_id = %permission_id, "shared group");
                Ok(())
            }
            Err(err) if err.mentions(INVALID_SHARING_MARKER) => Err(StoreError::InvalidEmail {
                email: email.to_string(),
                source: err,
            }),
            Err(err) => Err(err.into()),
        };
        self.observe(user, "share_group", result)
    }
}
