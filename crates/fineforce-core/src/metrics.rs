//! Dashboard card metrics derived from the in-memory violation list.

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate, TimeZone};
use serde::Serialize;

use crate::violation::{Violation, ViolationStatus, ViolationType};

/// Hotspot count shown on the dashboard; not yet derived from data.
pub const ACTIVE_HOTSPOTS: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_violations_today: usize,
    /// Sum of fines for today's violations that are already paid.
    pub revenue_today: u64,
    pub pending_fines: usize,
    pub active_hotspots: usize,
}

impl DashboardMetrics {
    /// "Today" is the calendar day in the local time zone.
    pub fn compute(violations: &[Violation], today: NaiveDate) -> Self {
        Self::compute_in(violations, today, &Local)
    }

    /// As [`compute`](Self::compute), with each violation's date taken in `tz`.
    pub fn compute_in<Tz: TimeZone>(violations: &[Violation], today: NaiveDate, tz: &Tz) -> Self {
        let todays = || {
            violations
                .iter()
                .filter(move |v| v.date.with_timezone(tz).date_naive() == today)
        };
        Self {
            total_violations_today: todays().count(),
            revenue_today: todays()
                .filter(|v| v.status == ViolationStatus::Paid)
                .map(|v| u64::from(v.fine))
                .sum(),
            pending_fines: violations
                .iter()
                .filter(|v| v.status == ViolationStatus::Pending)
                .count(),
            active_hotspots: ACTIVE_HOTSPOTS,
        }
    }

    /// `(title, formatted value)` pairs in card order.
    pub fn cards(&self) -> [(&'static str, String); 4] {
        [
            ("Total Violations (Today)", format_inr(self.total_violations_today as u64)),
            ("Revenue Collected (Today)", format!("₹{}", format_inr(self.revenue_today))),
            ("Pending Fines", format_inr(self.pending_fines as u64)),
            ("Active Hotspots", format_inr(self.active_hotspots as u64)),
        ]
    }
}

/// Count of violations per type, in table order, omitting zero counts.
pub fn type_distribution(violations: &[Violation]) -> Vec<(ViolationType, usize)> {
    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    for v in violations {
        let idx = ViolationType::ALL
            .iter()
            .position(|t| *t == v.violation_type)
            .unwrap_or_default();
        *counts.entry(idx).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(idx, n)| (ViolationType::ALL[idx], n))
        .collect()
}

/// Indian digit grouping: last three digits, then groups of two (`12,34,567`).
pub fn format_inr(n: u64) -> String {
    let digits = n.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}
