//! Typed `spreadsheets.batchUpdate` requests.
//!
//! Only the request kinds the roster store issues are modelled. Each variant
//! serializes to the single-key object the API expects, for example
//! `{"deleteSheet": {"sheetId": 3}}`.

use serde::Serialize;

/// Field mask for cell writes: value plus centered alignment.
pub const CELL_FIELDS: &str = "userEnteredValue,userEnteredFormat(horizontalAlignment,verticalAlignment)";

/// Number of columns a member row spans.
pub const ROW_WIDTH: i64 = 4;

/// A structural update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    AddSheet(AddSheet),
    DeleteSheet(DeleteSheet),
    UpdateSheetProperties(UpdateSheetProperties),
    UpdateSpreadsheetProperties(UpdateSpreadsheetProperties),
    AppendCells(AppendCells),
    UpdateCells(UpdateCells),
    DeleteDimension(DeleteDimension),
}

impl Request {
    /// Adds a tab with the given title.
    pub fn add_sheet(title: impl Into<String>) -> Self {
        Self::AddSheet(AddSheet {
            properties: TitleProperties {
                title: title.into(),
            },
        })
    }

    pub fn delete_sheet(sheet_id: i64) -> Self {
        Self::DeleteSheet(DeleteSheet { sheet_id })
    }

    /// Renames a tab.
    pub fn rename_sheet(sheet_id: i64, title: impl Into<String>) -> Self {
        Self::UpdateSheetProperties(UpdateSheetProperties {
            properties: SheetTitle {
                sheet_id,
                title: title.into(),
            },
            fields: "title".to_string(),
        })
    }

    /// Renames the spreadsheet file.
    pub fn rename_spreadsheet(title: impl Into<String>) -> Self {
        Self::UpdateSpreadsheetProperties(UpdateSpreadsheetProperties {
            properties: TitleProperties {
                title: title.into(),
            },
            fields: "title".to_string(),
        })
    }

    /// Appends one centered row of text cells after the last row with data.
    pub fn append_row<S: AsRef<str>>(sheet_id: i64, cells: &[S]) -> Self {
        Self::AppendCells(AppendCells {
            sheet_id,
            rows: vec![RowData::centered(cells)],
            fields: CELL_FIELDS.to_string(),
        })
    }

    /// Overwrites the first [`ROW_WIDTH`] columns of a row.
    pub fn update_row<S: AsRef<str>>(sheet_id: i64, row_index: i64, cells: &[S]) -> Self {
        Self::UpdateCells(UpdateCells {
            range: GridRange {
                sheet_id,
                start_row_index: row_index,
                end_row_index: row_index + 1,
                start_column_index: 0,
                end_column_index: ROW_WIDTH,
            },
            rows: vec![RowData::centered(cells)],
            fields: CELL_FIELDS.to_string(),
        })
    }

    /// Removes a single row; rows below shift up.
    pub fn delete_row(sheet_id: i64, row_index: i64) -> Self {
        Self::DeleteDimension(DeleteDimension {
            range: DimensionRange {
                sheet_id,
                dimension: Dimension::Rows,
                start_index: row_index,
                end_index: row_index + 1,
            },
        })
    }

    /// Returns the request's API name, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AddSheet(_) => "addSheet",
            Self::DeleteSheet(_) => "deleteSheet",
            Self::UpdateSheetProperties(_) => "updateSheetProperties",
            Self::UpdateSpreadsheetProperties(_) => "updateSpreadsheetProperties",
            Self::AppendCells(_) => "appendCells",
            Self::UpdateCells(_) => "updateCells",
            Self::DeleteDimension(_) => "deleteDimension",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddSheet {
    pub properties: TitleProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleProperties {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSheet {
    pub sheet_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateSheetProperties {
    pub properties: SheetTitle,
    pub fields: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetTitle {
    pub sheet_id: i64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateSpreadsheetProperties {
    pub properties: TitleProperties,
    pub fields: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendCells {
    pub sheet_id: i64,
    pub rows: Vec<RowData>,
    pub fields: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateCells {
    pub range: GridRange,
    pub rows: Vec<RowData>,
    pub fields: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRange {
    pub sheet_id: i64,
    pub start_row_index: i64,
    pub end_row_index: i64,
    pub start_column_index: i64,
    pub end_column_index: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteDimension {
    pub range: DimensionRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionRange {
    pub sheet_id: i64,
    pub dimension: Dimension,
    pub start_index: i64,
    pub end_index: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Dimension {
    Rows,
    Columns,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowData {
    pub values: Vec<CellData>,
}

impl RowData {
    fn centered<S: AsRef<str>>(cells: &[S]) -> Self {
        Self {
            values: cells
                .iter()
                .map(|cell| CellData::centered(cell.as_ref()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellData {
    pub user_entered_value: ExtendedValue,
    pub user_entered_format: CellFormat,
}

impl CellData {
    /// A text cell centered both ways.
    pub fn centered(text: &str) -> Self {
        Self {
            user_entered_value: ExtendedValue {
                string_value: text.to_string(),
            },
            user_entered_format: CellFormat {
                horizontal_alignment: "CENTER".to_string(),
                vertical_alignment: "MIDDLE".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedValue {
    pub string_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellFormat {
    pub horizontal_alignment: String,
    pub vertical_alignment: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn delete_row_body() {
        insta::assert_json_snapshot!(Request::delete_row(42, 3), @r#"
        {
          "deleteDimension": {
            "range": {
              "sheetId": 42,
              "dimension": "ROWS",
              "startIndex": 3,
              "endIndex": 4
            }
          }
        }
        "#);
    }

    #[test]
    fn append_row_body() {
        insta::assert_json_snapshot!(Request::append_row(7, &["1", "Kim"]), @r#"
        {
          "appendCells": {
            "sheetId": 7,
            "rows": [
              {
                "values": [
                  {
                    "userEnteredValue": {
                      "stringValue": "1"
                    },
                    "userEnteredFormat": {
                      "horizontalAlignment": "CENTER",
                      "verticalAlignment": "MIDDLE"
                    }
                  },
                  {
                    "userEnteredValue": {
                      "stringValue": "Kim"
                    },
                    "userEnteredFormat": {
                      "horizontalAlignment": "CENTER",
                      "verticalAlignment": "MIDDLE"
                    }
                  }
                ]
              }
            ],
            "fields": "userEnteredValue,userEnteredFormat(horizontalAlignment,verticalAlignment)"
          }
        }
        "#);
    }

    #[test]
    fn update_row_spans_four_columns() {
        let request = Request::update_row(5, 2, &["2", "Lee", "여", "B"]);
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body["updateCells"]["range"],
            json!({
                "sheetId": 5,
                "startRowIndex": 2,
                "endRowIndex": 3,
                "startColumnIndex": 0,
                "endColumnIndex": 4
            })
        );
        assert_eq!(
            body["updateCells"]["rows"][0]["values"][2]["userEnteredValue"]["stringValue"],
            "여"
        );
        assert_eq!(body["updateCells"]["fields"], CELL_FIELDS);
    }

    #[test]
    fn sheet_requests() {
        assert_eq!(
            serde_json::to_value(Request::add_sheet("1조")).unwrap(),
            json!({"addSheet": {"properties": {"title": "1조"}}})
        );
        assert_eq!(
            serde_json::to_value(Request::delete_sheet(9)).unwrap(),
            json!({"deleteSheet": {"sheetId": 9}})
        );
        assert_eq!(
            serde_json::to_value(Request::rename_sheet(9, "2조")).unwrap(),
            json!({
                "updateSheetProperties": {
                    "properties": {"sheetId": 9, "title": "2조"},
                    "fields": "title"
                }
            })
        );
        assert_eq!(
            serde_json::to_value(Request::rename_spreadsheet("[Mixir 팀빌딩] Bar")).unwrap(),
            json!({
                "updateSpreadsheetProperties": {
                    "properties": {"title": "[Mixir 팀빌딩] Bar"},
                    "fields": "title"
                }
            })
        );
    }

    #[test]
    fn request_kinds() {
        assert_eq!(Request::add_sheet("x").kind(), "addSheet");
        assert_eq!(Request::delete_row(0, 1).kind(), "deleteDimension");
        assert_eq!(Request::update_row(0, 1, &["1"]).kind(), "updateCells");
    }
}
