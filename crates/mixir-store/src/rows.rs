//! Conversion between tab rows and students.
//!
//! Row 0 is the header; data rows start at index 1. A student's data offset
//! `d` is its position among data rows, so its absolute row index is `d + 1`.

use mixir_core::{Gender, HEADER_LABELS, MemberFields, Student};

use crate::error::{StoreError, StoreResult};

/// Minimum cells of a data row: id, name, gender.
const MIN_CELLS: usize = 3;

/// The header row written to new tabs.
pub fn header_row() -> [&'static str; 4] {
    HEADER_LABELS
}

/// Number of rows below the header.
pub fn data_row_count(rows: &[Vec<String>]) -> usize {
    rows.len().saturating_sub(1)
}

/// Id assigned to the next appended student.
///
/// Ids are dense: after a delete the next id can repeat an existing one.
pub fn next_student_id(rows: &[Vec<String>]) -> String {
    (data_row_count(rows) + 1).to_string()
}

/// Parses every data row into a student.
///
/// Fully empty rows are skipped. Rows with fewer than three cells or an
/// unknown gender glyph fail the whole read.
pub fn parse_students(rows: &[Vec<String>]) -> StoreResult<Vec<Student>> {
    rows.iter()
        .enumerate()
        .skip(1)
        .filter(|(_, row)| !row.iter().all(|cell| cell.is_empty()))
        .map(|(index, row)| parse_row(index, row))
        .collect()
}

fn parse_row(index: usize, row: &[String]) -> StoreResult<Student> {
    if row.len() < MIN_CELLS {
        return Err(StoreError::CorruptRow {
            row: index,
            reason: format!("expected at least {MIN_CELLS} cells, found {}", row.len()),
        });
    }
    let gender = Gender::from_glyph(&row[2]).ok_or_else(|| StoreError::CorruptRow {
        row: index,
        reason: format!("unknown gender glyph '{}'", row[2]),
    })?;
    Ok(Student {
        student_id: row[0].clone(),
        name: row[1].clone(),
        gender,
        level: row.get(3).cloned(),
    })
}

/// Cells written for a student: id, name, gender glyph, level.
///
/// A missing level is written as an empty cell, which reads back as `None`.
pub fn encode_student(student_id: &str, fields: &MemberFields) -> [String; 4] {
    [
        student_id.to_string(),
        fields.name.clone(),
        fields.gender.glyph().to_string(),
        fields.level.clone().unwrap_or_default(),
    ]
}

/// Returns the absolute row index of the first data row whose column 0 is
/// exactly `student_id`.
///
/// First match wins: when a reused id appears twice, the upper row is the
/// one edited or deleted.
pub fn locate(rows: &[Vec<String>], student_id: &str) -> Option<usize> {
    rows.iter()
        .skip(1)
        .position(|row| row.first().map(String::as_str) == Some(student_id))
        .map(|offset| offset + 1)
}

/// Returns true if column A at `row` still holds `student_id`.
pub fn id_at(column_a: &[Vec<String>], row: usize, student_id: &str) -> bool {
    column_a
        .get(row)
        .and_then(|cells| cells.first())
        .is_some_and(|id| id == student_id)
}
