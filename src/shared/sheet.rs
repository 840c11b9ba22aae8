//! # Sheet Rows
//!
//! The row store answers a full read with a JSON object mapping each sheet name
//! to a 2D array: row 0 holds the headers, every later row holds values aligned
//! positionally to those headers. This module turns that payload into
//! [`SheetSnapshot`], the in-memory collection the views read from.
//!
//! A row's `row_index` is its position in the sheet at fetch time (headers
//! excluded). It is not a stable key: an insert or delete on the remote side
//! shifts every later row. [`Item::fingerprint`] gives a content-derived key
//! that survives such shifts as long as the row's text does not change.

use crate::shared::error::SyncError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Header of the completion column
pub const DONE_COLUMN: &str = "Done";

/// One row of a sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Zero-based position within the sheet at fetch time
    pub row_index: usize,
    /// Completion flag
    pub done: bool,
    /// Every other column, keyed by header
    pub fields: BTreeMap<String, Value>,
}

impl Item {
    /// Text value of a column, if it holds a string
    pub fn text(&self, column: &str) -> Option<&str> {
        self.fields.get(column).and_then(Value::as_str)
    }

    /// Content fingerprint of the row, ignoring `Done` and position.
    ///
    /// Two rows with identical text produce the same fingerprint.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for (column, value) in &self.fields {
            hasher.update(column.as_bytes());
            hasher.update([0x1f]);
            hasher.update(value.to_string().as_bytes());
            hasher.update([0x1e]);
        }
        format!("{:x}", hasher.finalize())
    }
}

/// Interpret a `Done` cell
fn parse_done(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(done)) => *done,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn header_name(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Convert one sheet's 2D array into items.
///
/// Cells past the end of a short row are left out of `fields`.
pub fn parse_sheet(sheet_name: &str, rows: &[Value]) -> Result<Vec<Item>, SyncError> {
    let Some((header_row, data_rows)) = rows.split_first() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header_row
        .as_array()
        .ok_or_else(|| SyncError::parse(format!("sheet '{}': header row is not an array", sheet_name)))?
        .iter()
        .map(header_name)
        .collect();

    data_rows
        .iter()
        .enumerate()
        .map(|(row_index, row)| {
            let cells = row.as_array().ok_or_else(|| {
                SyncError::parse(format!("sheet '{}': row {} is not an array", sheet_name, row_index))
            })?;
            let mut fields = BTreeMap::new();
            let mut done = false;
            for (header, cell) in headers.iter().zip(cells) {
                if header == DONE_COLUMN {
                    done = parse_done(Some(cell));
                } else {
                    fields.insert(header.clone(), cell.clone());
                }
            }
            Ok(Item { row_index, done, fields })
        })
        .collect()
}

/// All sheets of one fetch, replaced wholesale on every refetch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SheetSnapshot {
    sheets: BTreeMap<String, Vec<Item>>,
}

impl SheetSnapshot {
    /// Parse the row store's read-all payload.
    ///
    /// Any malformed sheet fails the whole parse; no partial data is kept.
    pub fn from_json(payload: &Value) -> Result<Self, SyncError> {
        let object = payload
            .as_object()
            .ok_or_else(|| SyncError::parse("expected a JSON object of sheets"))?;

        let mut sheets = BTreeMap::new();
        for (name, rows) in object {
            let rows = rows
                .as_array()
                .ok_or_else(|| SyncError::parse(format!("sheet '{}' is not an array", name)))?;
            sheets.insert(name.clone(), parse_sheet(name, rows)?);
        }
        Ok(Self { sheets })
    }

    pub fn from_sheets(sheets: BTreeMap<String, Vec<Item>>) -> Self {
        Self { sheets }
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.keys().map(String::as_str)
    }

    pub fn sheet(&self, name: &str) -> Option<&[Item]> {
        self.sheets.get(name).map(Vec::as_slice)
    }

    pub fn sheets(&self) -> impl Iterator<Item = (&str, &[Item])> {
        self.sheets.iter().map(|(name, items)| (name.as_str(), items.as_slice()))
    }

    /// Look up a row by its recorded `row_index` (not by slice position)
    pub fn item(&self, sheet_name: &str, row_index: usize) -> Option<&Item> {
        self.sheets
            .get(sheet_name)?
            .iter()
            .find(|item| item.row_index == row_index)
    }

    pub fn item_mut(&mut self, sheet_name: &str, row_index: usize) -> Option<&mut Item> {
        self.sheets
            .get_mut(sheet_name)?
            .iter_mut()
            .find(|item| item.row_index == row_index)
    }

    /// Set the completion flag; returns false if the row is not present
    pub fn set_done(&mut self, sheet_name: &str, row_index: usize, done: bool) -> bool {
        match self.item_mut(sheet_name, row_index) {
            Some(item) => {
                item.done = done;
                true
            }
            None => false,
        }
    }

    /// Drop a row, leaving the other rows' indices untouched until the next fetch
    pub fn remove_item(&mut self, sheet_name: &str, row_index: usize) -> Option<Item> {
        let items = self.sheets.get_mut(sheet_name)?;
        let position = items.iter().position(|item| item.row_index == row_index)?;
        Some(items.remove(position))
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}
