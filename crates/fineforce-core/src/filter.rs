//! Search, status/type filters and pagination over the violation list.

use serde::{Deserialize, Serialize};

use crate::violation::{Violation, ViolationStatus, ViolationType};

pub const ITEMS_PER_PAGE: usize = 8;

/// `None` on a field means "All".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationFilter {
    pub search: Option<String>,
    pub status: Option<ViolationStatus>,
    pub violation_type: Option<ViolationType>,
}

impl ViolationFilter {
    /// Search matches vehicle number, id or location, case-insensitively.
    pub fn matches(&self, v: &Violation) -> bool {
        if self.status.is_some_and(|s| s != v.status) {
            return false;
        }
        if self.violation_type.is_some_and(|t| t != v.violation_type) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                [&v.vehicle_number, &v.id, &v.location]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&term))
            }
        }
    }

    pub fn apply<'a>(&self, violations: &'a [Violation]) -> Vec<&'a Violation> {
        violations.iter().filter(|v| self.matches(v)).collect()
    }
}

/// One page of a filtered list.
#[derive(Debug)]
pub struct PageWindow<'a> {
    pub items: &'a [&'a Violation],
    /// Zero-based.
    pub page: usize,
    pub page_count: usize,
    pub total: usize,
}

impl<'a> PageWindow<'a> {
    /// Slice `page` (zero-based, clamped to the last page) out of `filtered`.
    pub fn new(filtered: &'a [&'a Violation], page: usize) -> Self {
        let total = filtered.len();
        let page_count = total.div_ceil(ITEMS_PER_PAGE);
        let page = page.min(page_count.saturating_sub(1));
        let start = (page * ITEMS_PER_PAGE).min(total);
        let end = (start + ITEMS_PER_PAGE).min(total);
        Self {
            items: &filtered[start..end],
            page,
            page_count,
            total,
        }
    }

    /// "Showing a to b of n results" bounds, 1-based.
    pub fn showing(&self) -> (usize, usize) {
        let from = (self.page * ITEMS_PER_PAGE + 1).min(self.total);
        let to = ((self.page + 1) * ITEMS_PER_PAGE).min(self.total);
        (from, to)
    }

    pub fn has_next(&self) -> bool {
        self.page + 1 < self.page_count
    }

    pub fn has_previous(&self) -> bool {
        self.page > 0
    }
}
