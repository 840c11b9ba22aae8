//! # Mutations
//!
//! A [`Mutation`] is one pending intent to change remote rows. It is the body of
//! a write request and the element type of the persisted action queue, so its
//! JSON shape is the wire shape:
//!
//! ```json
//! { "action": "toggleCheckbox", "sheetName": "Daily_Plan", "rowIndex": 3, "value": true }
//! ```
//!
//! Action tags follow the row store script (`toggleCheckbox`, `addTopic`,
//! `deleteTopic`); the kebab-case names `toggle-item`, `add-item` and
//! `delete-item` are accepted when decoding.
//!
//! Toggles carry the absolute target value, so delivering the same toggle twice
//! leaves the row in the same state.

use crate::shared::sheet::SheetSnapshot;
use serde::{Deserialize, Serialize};

/// A single write intent awaiting remote persistence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Mutation {
    /// Set a row's `Done` flag
    #[serde(rename = "toggleCheckbox", alias = "toggle-item", rename_all = "camelCase")]
    ToggleItem {
        sheet_name: String,
        row_index: usize,
        /// Absolute target value
        value: bool,
        /// Fingerprint of the target row when the intent was created
        #[serde(default, skip_serializing_if = "Option::is_none")]
        row_key: Option<String>,
    },
    /// Append a topic to a module
    #[serde(rename = "addTopic", alias = "add-item", rename_all = "camelCase")]
    AddItem {
        sheet_name: String,
        module_num: u32,
        topic_name: String,
    },
    /// Delete a row
    #[serde(rename = "deleteTopic", alias = "delete-item", rename_all = "camelCase")]
    DeleteItem {
        sheet_name: String,
        row_index: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        row_key: Option<String>,
    },
}

impl Mutation {
    /// Toggle without a row fingerprint
    pub fn toggle(sheet_name: impl Into<String>, row_index: usize, value: bool) -> Self {
        Mutation::ToggleItem {
            sheet_name: sheet_name.into(),
            row_index,
            value,
            row_key: None,
        }
    }

    pub fn add(sheet_name: impl Into<String>, module_num: u32, topic_name: impl Into<String>) -> Self {
        Mutation::AddItem {
            sheet_name: sheet_name.into(),
            module_num,
            topic_name: topic_name.into(),
        }
    }

    /// Delete without a row fingerprint
    pub fn delete(sheet_name: impl Into<String>, row_index: usize) -> Self {
        Mutation::DeleteItem {
            sheet_name: sheet_name.into(),
            row_index,
            row_key: None,
        }
    }

    /// Attach a row fingerprint (ignored for adds)
    pub fn with_row_key(mut self, key: impl Into<String>) -> Self {
        match &mut self {
            Mutation::ToggleItem { row_key, .. } | Mutation::DeleteItem { row_key, .. } => {
                *row_key = Some(key.into());
            }
            Mutation::AddItem { .. } => {}
        }
        self
    }

    /// Action tag as sent on the wire
    pub fn action(&self) -> &'static str {
        match self {
            Mutation::ToggleItem { .. } => "toggleCheckbox",
            Mutation::AddItem { .. } => "addTopic",
            Mutation::DeleteItem { .. } => "deleteTopic",
        }
    }

    pub fn sheet_name(&self) -> &str {
        match self {
            Mutation::ToggleItem { sheet_name, .. }
            | Mutation::AddItem { sheet_name, .. }
            | Mutation::DeleteItem { sheet_name, .. } => sheet_name,
        }
    }

    pub fn row_index(&self) -> Option<usize> {
        match self {
            Mutation::ToggleItem { row_index, .. } | Mutation::DeleteItem { row_index, .. } => {
                Some(*row_index)
            }
            Mutation::AddItem { .. } => None,
        }
    }

    pub fn row_key(&self) -> Option<&str> {
        match self {
            Mutation::ToggleItem { row_key, .. } | Mutation::DeleteItem { row_key, .. } => {
                row_key.as_deref()
            }
            Mutation::AddItem { .. } => None,
        }
    }

    /// Copy of this mutation pointing at another row
    pub fn with_row_index(&self, index: usize) -> Self {
        let mut moved = self.clone();
        match &mut moved {
            Mutation::ToggleItem { row_index, .. } | Mutation::DeleteItem { row_index, .. } => {
                *row_index = index;
            }
            Mutation::AddItem { .. } => {}
        }
        moved
    }

    /// Whether applying this mutation shifts the row layout of its sheet
    pub fn is_structural(&self) -> bool {
        matches!(self, Mutation::AddItem { .. } | Mutation::DeleteItem { .. })
    }

    /// Default optimistic mutator.
    ///
    /// An add has no local effect: its row index is only known after a refetch.
    pub fn apply_locally(&self, snapshot: &mut SheetSnapshot) {
        match self {
            Mutation::ToggleItem { sheet_name, row_index, value, .. } => {
                snapshot.set_done(sheet_name, *row_index, *value);
            }
            Mutation::DeleteItem { sheet_name, row_index, .. } => {
                snapshot.remove_item(sheet_name, *row_index);
            }
            Mutation::AddItem { .. } => {}
        }
    }
}
