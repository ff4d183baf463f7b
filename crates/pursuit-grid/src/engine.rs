//! The pure grid pipeline: collection -> filtered -> sorted -> page.
//!
//! Recomputed synchronously on every input change; identical inputs always
//! produce identical output ordering. The sort is stable, so ties keep the
//! original collection order, and filtering never reorders.

use pursuit_core::model::item::WorkItem;

use crate::state::{GridState, SortDirection};

/// One render-ready page plus the paging facts hosts need for chrome.
#[derive(Debug)]
pub struct GridPage<'a> {
    /// Rows of the effective page, in final render order.
    pub rows: Vec<&'a WorkItem>,
    /// Rows surviving the filter stage (pre-pagination).
    pub total_rows: usize,
    /// The clamped, effective 1-based page actually rendered.
    pub page: usize,
    /// Total pages over the filtered set; 1 when the set is empty.
    pub page_count: usize,
    pub page_size: usize,
}

impl GridPage<'_> {
    /// True when active filters eliminated every row: the explicit
    /// empty-state, rendered with a "clear filters" affordance, not an error.
    #[must_use]
    pub const fn is_filtered_empty(&self) -> bool {
        self.total_rows == 0
    }

    /// Row ids of the rendered page, the order range selection works in.
    #[must_use]
    pub fn row_ids(&self) -> Vec<String> {
        self.rows.iter().map(|item| item.id.clone()).collect()
    }
}

/// Run the full pipeline for one render pass.
#[must_use]
pub fn run<'a>(items: &'a [WorkItem], state: &GridState) -> GridPage<'a> {
    let mut rows = filter(items, state);
    sort(&mut rows, state);
    paginate(rows, state)
}

/// Keep rows whose display text contains every active filter, ANDed,
/// case-insensitively.
fn filter<'a>(items: &'a [WorkItem], state: &GridState) -> Vec<&'a WorkItem> {
    let needles: Vec<(&String, String)> = state
        .filters()
        .iter()
        .map(|(key, value)| (key, value.to_ascii_lowercase()))
        .collect();
    items
        .iter()
        .filter(|item| {
            needles.iter().all(|(key, needle)| {
                item.value(key)
                    .display()
                    .to_ascii_lowercase()
                    .contains(needle.as_str())
            })
        })
        .collect()
}

fn sort(rows: &mut [&WorkItem], state: &GridState) {
    let Some(spec) = state.sort() else {
        return;
    };
    // Vec::sort_by is stable: ties keep original collection order.
    rows.sort_by(|a, b| {
        let ordering = a.value(&spec.key).compare(&b.value(&spec.key));
        match spec.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

fn paginate<'a>(rows: Vec<&'a WorkItem>, state: &GridState) -> GridPage<'a> {
    let total_rows = rows.len();
    let page_size = state.page_size();
    let page_count = total_rows.div_ceil(page_size).max(1);
    let page = state.page().min(page_count);
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total_rows);
    let rows = if start < total_rows {
        rows[start..end].to_vec()
    } else {
        Vec::new()
    };
    GridPage {
        rows,
        total_rows,
        page,
        page_count,
        page_size,
    }
}
