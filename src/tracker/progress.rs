//! # Progress and View Queries
//!
//! Read-only questions the views ask of a snapshot: headline stats, the rows a
//! tab shows, and the order subject tabs appear in.

use crate::shared::sheet::{Item, SheetSnapshot};
use serde::Serialize;

/// Day-by-day plan sheet
pub const DAILY_PLAN_SHEET: &str = "Daily_Plan";

/// Suffix naming per-subject topic sheets
pub const SUBJECT_SHEET_SUFFIX: &str = "_Tracker";

const DATE_COLUMN: &str = "Date";

pub fn is_subject_sheet(name: &str) -> bool {
    name.ends_with(SUBJECT_SHEET_SUFFIX)
}

fn is_complete(items: &[Item]) -> bool {
    !items.is_empty() && items.iter().all(|item| item.done)
}

/// Dashboard numbers.
///
/// Topic totals count `*_Tracker` sheets only; `Daily_Plan` rows feed
/// `completed_days` instead of inflating the topic count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProgressSummary {
    pub completed_days: usize,
    pub total_topics: usize,
    pub completed_topics: usize,
    /// Rounded share of completed topics, 0 when there are none
    pub completion_percent: u32,
}

impl ProgressSummary {
    pub fn from_snapshot(snapshot: &SheetSnapshot) -> Self {
        let completed_days = snapshot
            .sheet(DAILY_PLAN_SHEET)
            .map(|items| items.iter().filter(|item| item.done).count())
            .unwrap_or_default();

        let (total_topics, completed_topics) = snapshot
            .sheets()
            .filter(|(name, _)| is_subject_sheet(name))
            .fold((0, 0), |(total, done), (_, items)| {
                (total + items.len(), done + items.iter().filter(|item| item.done).count())
            });

        let completion_percent = if total_topics == 0 {
            0
        } else {
            (completed_topics as f64 / total_topics as f64 * 100.0).round() as u32
        };

        Self {
            completed_days,
            total_topics,
            completed_topics,
            completion_percent,
        }
    }
}

/// Filters applied to a tab's rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewFilter {
    /// Only rows whose date contains this text; daily plan only
    pub date: Option<String>,
    /// Hide completed rows
    pub study_mode: bool,
}

/// Rows of `sheet_name` that the tab shows, in sheet order
pub fn filter_view<'a>(snapshot: &'a SheetSnapshot, sheet_name: &str, filter: &ViewFilter) -> Vec<&'a Item> {
    let Some(items) = snapshot.sheet(sheet_name) else {
        return Vec::new();
    };
    let date = filter.date.as_deref().filter(|_| sheet_name == DAILY_PLAN_SHEET);

    items
        .iter()
        .filter(|item| match date {
            Some(date) => item.text(DATE_COLUMN).is_some_and(|value| value.contains(date)),
            None => true,
        })
        .filter(|item| !(filter.study_mode && item.done))
        .collect()
}

/// Subject sheet names, fully completed ones last
pub fn sorted_subject_sheets(snapshot: &SheetSnapshot) -> Vec<&str> {
    let mut sheets: Vec<(&str, bool)> = snapshot
        .sheets()
        .filter(|(name, _)| is_subject_sheet(name))
        .map(|(name, items)| (name, is_complete(items)))
        .collect();
    // sort_by_key is stable
    sheets.sort_by_key(|(_, complete)| *complete);
    sheets.into_iter().map(|(name, _)| name).collect()
}
