//! Sub-group (tab) operations.

use mixir_core::Subgroup;
use mixir_sheets::{GatewayError, Request, RequestCredentials};
use tracing::{info, warn};

use super::SheetStore;
use crate::error::{StoreError, StoreResult};
use crate::principal::UserRecord;
use crate::rows;

impl SheetStore {
    /// Adds a tab and writes its header row.
    ///
    /// The two writes are separate calls. When the header write fails the
    /// tab stays behind without a header and `IncompleteSubgroup` names it.
    pub async fn create_subgroup(
        &self,
        user: &UserRecord,
        group_id: &str,
        name: &str,
    ) -> StoreResult<Subgroup> {
        let creds = user.request_credentials();
        let result = self.create_subgroup_with(&creds, group_id, name).await;
        self.observe(user, "create_subgroup", result)
    }

    async fn create_subgroup_with(
        &self,
        creds: &RequestCredentials,
        group_id: &str,
        name: &str,
    ) -> StoreResult<Subgroup> {
        let spreadsheet = self.spreadsheet(creds, group_id).await?;
        if spreadsheet.find_sheet(name).is_some() {
            return Err(StoreError::SheetNameExists {
                name: name.to_string(),
            });
        }

        let response = self
            .gateway
            .batch_update(creds, group_id, vec![Request::add_sheet(name)])
            .await?;
        let sheet_id = response
            .added_sheet()
            .map(|props| props.sheet_id)
            .ok_or_else(|| GatewayError::invalid_response("addSheet reply missing"))?;

        let header = Request::append_row(sheet_id, &rows::header_row());
        if let Err(source) = self.gateway.batch_update(creds, group_id, vec![header]).await {
            warn!(group_id, sheet_id, "sub-group added without header row");
            return Err(StoreError::IncompleteSubgroup {
                name: name.to_string(),
                sheet_id,
                source,
            });
        }

        info!(group_id, sheet_id, name, "created sub-group");
        Ok(Subgroup {
            sheet_id,
            name: name.to_string(),
        })
    }

    /// Lists the tabs of a group, without the reserved tab.
    pub async fn list_subgroups(&self, user: &UserRecord, group_id: &str) -> StoreResult<Vec<Subgroup>> {
        let creds = user.request_credentials();
        let result = self
            .spreadsheet(&creds, group_id)
            .await
            .map(|spreadsheet| self.subgroups_of(&spreadsheet));
        self.observe(user, "list_subgroups", result)
    }

    /// Renames a tab. Fails before any write when `new_name` is taken.
    pub async fn rename_subgroup(
        &self,
        user: &UserRecord,
        group_id: &str,
        name: &str,
        new_name: &str,
    ) -> StoreResult<()> {
        let creds = user.request_credentials();
        let result = self
            .rename_subgroup_with(&creds, group_id, name, new_name)
            .await;
        self.observe(user, "rename_subgroup", result)
    }

    async fn rename_subgroup_with(
        &self,
        creds: &RequestCredentials,
        group_id: &str,
        name: &str,
        new_name: &str,
    ) -> StoreResult<()> {
        let spreadsheet = self.spreadsheet(creds, group_id).await?;
        let sheet_id = spreadsheet
            .find_sheet(name)
            .map(|props| props.sheet_id)
            .ok_or_else(|| StoreError::SheetNotFound {
                name: name.to_string(),
            })?;
        if spreadsheet.find_sheet(new_name).is_some() {
            return Err(StoreError::SheetNameExists {
                name: new_name.to_string(),
            });
        }
        self.gateway
            .batch_update(creds, group_id, vec![Request::rename_sheet(sheet_id, new_name)])
            .await?;
        Ok(())
    }

    /// Deletes a tab and every row in it.
    pub async fn delete_subgroup(&self, user: &UserRecord, group_id: &str, name: &str) -> StoreResult<()> {
        let creds = user.request_credentials();
        let result = self.delete_subgroup_with(&creds, group_id, name).await;
        self.observe(user, "delete_subgroup", result)
    }

    async fn delete_subgroup_with(
        &self,
        creds: &RequestCredentials,
        group_id: &str,
        name: &str,
    ) -> StoreResult<()> {
        let sheet_id = self.sheet_id(creds, group_id, name).await?;
        self.gateway
            .batch_update(creds, group_id, vec![Request::delete_sheet(sheet_id)])
            .await?;
        Ok(())
    }
}
