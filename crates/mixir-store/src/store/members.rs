//! Member (row) operations.
//!
//! Rows have no stable identity. Writers lock the tab for the whole
//! read-locate-write sequence, and index-based writes re-read column A just
//! before writing to confirm the row has not shifted.

use mixir_core::{MemberFields, Student};
use mixir_sheets::{Request, RequestCredentials, a1};
use tracing::info;

use super::SheetStore;
use crate::error::{StoreError, StoreResult};
use crate::principal::UserRecord;
use crate::rows;

/// Resolved target of an index-based write.
struct RowTarget {
    sheet_id: i64,
    row: usize,
}

impl SheetStore {
    /// Reads every student of a sub-group.
    pub async fn list_members(
        &self,
        user: &UserRecord,
        group_id: &str,
        subgroup: &str,
    ) -> StoreResult<Vec<Student>> {
        let creds = user.request_credentials();
        let result = self
            .fetch_rows(&creds, group_id, subgroup)
            .await
            .and_then(|values| rows::parse_students(&values));
        self.observe(user, "list_members", result)
    }

    /// Appends a student with the next sequential id.
    pub async fn add_member(
        &self,
        user: &UserRecord,
        group_id: &str,
        subgroup: &str,
        fields: MemberFields,
    ) -> StoreResult<Student> {
        let creds = user.request_credentials();
        let _guard = self.locks.lock(group_id, subgroup).await;
        let result = self.add_member_with(&creds, group_id, subgroup, fields).await;
        self.observe(user, "add_member", result)
    }

    async fn add_member_with(
        &self,
        creds: &RequestCredentials,
        group_id: &str,
        subgroup: &str,
        fields: MemberFields,
    ) -> StoreResult<Student> {
        let values = self.fetch_rows(creds, group_id, subgroup).await?;
        let student_id = rows::next_student_id(&values);
        let sheet_id = self.sheet_id(creds, group_id, subgroup).await?;
        let cells = rows::encode_student(&student_id, &fields);
        self.gateway
            .batch_update(creds, group_id, vec![Request::append_row(sheet_id, &cells)])
            .await?;
        info!(group_id, subgroup, student_id = %student_id, "added member");
        Ok(Student::from_fields(student_id, fields))
    }

    /// Overwrites a student's row in place.
    pub async fn edit_member(
        &self,
        user: &UserRecord,
        group_id: &str,
        subgroup: &str,
        student_id: &str,
        fields: MemberFields,
    ) -> StoreResult<Student> {
        let creds = user.request_credentials();
        let _guard = self.locks.lock(group_id, subgroup).await;
        let result = self
            .edit_member_with(&creds, group_id, subgroup, student_id, fields)
            .await;
        self.observe(user, "edit_member", result)
    }

    async fn edit_member_with(
        &self,
        creds: &RequestCredentials,
        group_id: &str,
        subgroup: &str,
        student_id: &str,
        fields: MemberFields,
    ) -> StoreResult<Student> {
        let target = self.locate_row(creds, group_id, subgroup, student_id).await?;
        let cells = rows::encode_student(student_id, &fields);
        let request = Request::update_row(target.sheet_id, target.row as i64, &cells);
        self.gateway
            .batch_update(creds, group_id, vec![request])
            .await?;
        info!(group_id, subgroup, student_id, row = target.row, "edited member");
        Ok(Student::from_fields(student_id, fields))
    }

    /// Removes a student's row. Later students keep their ids.
    pub async fn delete_member(
        &self,
        user: &UserRecord,
        group_id: &str,
        subgroup: &str,
        student_id: &str,
    ) -> StoreResult<()> {
        let creds = user.request_credentials();
        let _guard = self.locks.lock(group_id, subgroup).await;
        let result = self
            .delete_member_with(&creds, group_id, subgroup, student_id)
            .await;
        self.observe(user, "delete_member", result)
    }

    async fn delete_member_with(
        &self,
        creds: &RequestCredentials,
        group_id: &str,
        subgroup: &str,
        student_id: &str,
    ) -> StoreResult<()> {
        let target = self.locate_row(creds, group_id, subgroup, student_id).await?;
        let request = Request::delete_row(target.sheet_id, target.row as i64);
        self.gateway
            .batch_update(creds, group_id, vec![request])
            .await?;
        info!(group_id, subgroup, student_id, row = target.row, "deleted member");
        Ok(())
    }

    /// Finds the row of `student_id` and confirms it is still there right
    /// before the caller writes.
    async fn locate_row(
        &self,
        creds: &RequestCredentials,
        group_id: &str,
        subgroup: &str,
        student_id: &str,
    ) -> StoreResult<RowTarget> {
        let values = self.fetch_rows(creds, group_id, subgroup).await?;
        let row = rows::locate(&values, student_id).ok_or_else(|| StoreError::StudentNotFound {
            student_id: student_id.to_string(),
        })?;

        let spreadsheet = self.spreadsheet(creds, group_id).await?;
        let props = spreadsheet
            .find_sheet(subgroup)
            .ok_or_else(|| StoreError::SheetNotFound {
                name: subgroup.to_string(),
            })?;

        let column = self
            .gateway
            .get_values(creds, group_id, &a1::id_column_range(&props.title))
            .await?;
        if !rows::id_at(&column.values, row, student_id) {
            return Err(StoreError::RowMoved {
                student_id: student_id.to_string(),
                row,
            });
        }

        Ok(RowTarget {
            sheet_id: props.sheet_id,
            row,
        })
    }
}
