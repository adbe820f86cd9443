//! Column sorting and paging for record tables.

use crate::record::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Which column a table is ordered by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub key: String,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            key: key.into(),
            direction,
        }
    }

    /// Header click. Only the same column, currently ascending, flips to
    /// descending; everything else starts over ascending.
    pub fn request_sort(&self, requested_key: &str) -> SortState {
        let direction =
            if self.key == requested_key && self.direction == SortDirection::Ascending {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
        SortState::new(requested_key, direction)
    }

    /// Direction to show on `column`'s header, if it is the active one.
    pub fn indicator(&self, column: &str) -> Option<SortDirection> {
        (self.key == column).then_some(self.direction)
    }

    pub fn apply(&self, records: &[Record]) -> Vec<Record> {
        sort_by(records, &self.key, self.direction)
    }
}

/// Free-function form of [`SortState::request_sort`].
pub fn request_sort(current: &SortState, requested_key: &str) -> SortState {
    current.request_sort(requested_key)
}

/// Sorted copy of `records` by `key`. The input is left untouched and rows
/// with equal keys keep their input order in either direction.
pub fn sort_by(records: &[Record], key: &str, direction: SortDirection) -> Vec<Record> {
    let mut sorted = records.to_vec();
    // slice::sort_by is stable; descending mirrors the comparator instead of
    // reversing the output so ties stay in input order
    sorted.sort_by(|a, b| direction.apply(compare_values(a.get(key), b.get(key))));
    sorted
}

/// Order on field values.
///
/// Missing and `null` sort first, then booleans, numbers (numeric order),
/// strings (lexicographic), and finally arrays/objects, which compare equal
/// among themselves.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(Value::Array(_)) | Some(Value::Object(_)) => 4,
        }
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.total_cmp(&y)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

// =========================================================
// Paging
// =========================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page actually returned.
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> Page<T> {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Slice out page `page` (1-based) of `per_page` items. Out-of-range pages
/// are clamped; `per_page == 0` is treated as 1. An empty input yields one
/// empty page.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * per_page;
    let end = (start + per_page).min(total_items);

    Page {
        items: items[start..end].to_vec(),
        page,
        total_pages,
        total_items,
    }
}
