//! Filtered, sorted projection of the store for display and export.
//!
//! [`project`] is a pure function of the record slice and a [`ViewState`]; it
//! borrows the records and never reorders or mutates the store.

use serde::{Deserialize, Serialize};

use crate::record_model::Record;
use crate::record_schema::Field;

/// Search criteria. Every criterion is optional (empty means "skip") and all
/// present criteria must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    /// Case-insensitive substring of `customerName`.
    pub customer: String,
    /// Case-insensitive substring of `productCodeName`.
    pub product_code: String,
    /// Inclusive lower bound on `productionDate`, compared as text.
    pub start_date: String,
    /// Inclusive upper bound on `productionDate`, compared as text.
    pub end_date: String,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.customer.trim().is_empty()
            && self.product_code.trim().is_empty()
            && self.start_date.is_empty()
            && self.end_date.is_empty()
    }

    pub fn matches(&self, record: &Record) -> bool {
        contains_folded(&record.customer_name, &self.customer)
            && contains_folded(&record.product_code_name, &self.product_code)
            && (self.start_date.is_empty() || record.production_date >= self.start_date)
            && (self.end_date.is_empty() || record.production_date <= self.end_date)
    }
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Active sort column and direction. With no key, rows keep store order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub key: Option<Field>,
    pub ascending: bool,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            key: None,
            ascending: true,
        }
    }
}

impl SortState {
    /// Same key flips the direction; a new key starts ascending.
    pub fn toggle(&mut self, key: Field) {
        if self.key == Some(key) {
            self.ascending = !self.ascending;
        } else {
            self.key = Some(key);
            self.ascending = true;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub criteria: FilterCriteria,
    pub sort: SortState,
}

/// A displayed row and the store position it came from. Edit and delete
/// commands address the store through `position`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewRow<'a> {
    pub position: usize,
    pub record: &'a Record,
}

pub fn project<'a>(records: &'a [Record], view: &ViewState) -> Vec<ViewRow<'a>> {
    let unfiltered = view.criteria.is_empty();
    let mut rows: Vec<ViewRow<'a>> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| unfiltered || view.criteria.matches(record))
        .map(|(position, record)| ViewRow { position, record })
        .collect();

    if let Some(key) = view.sort.key {
        // Plain text comparison on every field, dates included.
        rows.sort_by(|a, b| {
            let ordering = a.record.field_text(key).cmp(b.record.field_text(key));
            if view.sort.ascending {
                ordering
            } else {
                ordering.reverse()
            }
        });
    }

    rows
}
