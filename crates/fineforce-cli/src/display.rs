//! Terminal rendering for violations, reviews, metrics and the reference
//! analytics.
//!
//! Cards are printed as grouped `label value` sections; charts are plain
//! horizontal bars.

use fineforce_core::analytics::{
    ForecastWindow, HOTSPOTS, OFFICERS, PredictedHotspot, VIOLATION_TYPE_SHARE, WEEKLY_VIOLATIONS,
    alerts_by_urgency,
};
use fineforce_core::{
    AnalysisResult, DashboardMetrics, PageWindow, Violation, ViolationType, format_inr,
};

const BAR_WIDTH: usize = 40;
const MAX_LIST_ITEMS: usize = 10;

// ── Violations ──

/// Print a single violation as a vertical card.
pub fn print_violation_card(v: &Violation) {
    println!("=== Violation {} ===", v.id);
    println!("{} · {}", v.vehicle_number, v.violation_type);
    println!();

    println!("Details");
    field("Date & Time", &v.display_date());
    field("Location", &v.location);
    field("Fine Amount", &format!("₹{}", format_inr(u64::from(v.fine))));
    field("Status", &format!("{} ({})", v.status, v.status.description()));
    println!();

    println!("AI Analysis");
    field("Description", &v.description);
    field("Confidence", &format!("{}%", v.confidence_score.value()));
    print_list("Contributing Factors", &v.contributing_factors);
    println!();

    if !v.image_url.is_empty() {
        println!("Evidence");
        field("Image", &v.image_url);
        println!();
    }
}

/// Print one page of the violation list with its "Showing a to b" footer.
pub fn print_violation_table(window: &PageWindow<'_>) {
    if window.total == 0 {
        println!("No violations found.");
        return;
    }
    println!(
        "{:<38} {:<16} {:<20} {:<19} {:>8} {:<8}",
        "ID", "VEHICLE", "TYPE", "DATE", "FINE", "STATUS"
    );
    for v in window.items {
        println!(
            "{:<38} {:<16} {:<20} {:<19} {:>8} {:<8}",
            truncate(&v.id, 38),
            truncate(&v.vehicle_number, 16),
            v.violation_type.label(),
            v.display_date(),
            format!("₹{}", format_inr(u64::from(v.fine))),
            v.status.as_str(),
        );
    }
    let (from, to) = window.showing();
    println!();
    println!(
        "Showing {from} to {to} of {} results (page {} of {})",
        window.total,
        window.page + 1,
        window.page_count.max(1)
    );
}

// ── Upload review ──

pub fn print_review(analysis: &AnalysisResult, email: &str, advisory: Option<&str>) {
    println!("=== Review AI Analysis ===");
    if let Some(text) = advisory {
        println!("! {text}");
    }
    println!();
    field("Vehicle Number", &analysis.vehicle_number);
    field("Violation Type", analysis.violation_type.label());
    field("Fine (INR)", &format_inr(u64::from(analysis.fine)));
    field("Location", &analysis.location);
    field("Description", &analysis.description);
    print_list("Contributing Factors", &analysis.contributing_factors);
    field("Violator's Email", email);
    field(
        "AI Confidence",
        &format!("{}%", analysis.confidence_score.value()),
    );
    println!();
}

// ── Dashboard ──

pub fn print_metrics(metrics: &DashboardMetrics, distribution: &[(ViolationType, usize)]) {
    for (title, value) in metrics.cards() {
        field(title, &value);
    }
    println!();

    println!("Weekly Violation Trends");
    let weekly: Vec<(&str, u64)> = WEEKLY_VIOLATIONS
        .iter()
        .map(|(day, n)| (*day, u64::from(*n)))
        .collect();
    print_bars(&weekly);
    println!();

    println!("Violation Types (loaded records)");
    if distribution.is_empty() {
        println!("  (none)");
    } else {
        let counts: Vec<(&str, u64)> = distribution
            .iter()
            .map(|(t, n)| (t.label(), *n as u64))
            .collect();
        print_bars(&counts);
    }
    println!();

    println!("Violation Types (monthly share)");
    let share: Vec<(&str, u64)> = VIOLATION_TYPE_SHARE
        .iter()
        .map(|(label, n)| (*label, u64::from(*n)))
        .collect();
    print_bars(&share);
}

// ── Reference analytics ──

pub fn print_hotspots(window: Option<ForecastWindow>) {
    match window {
        Some(window) => print_forecast(window),
        None => {
            println!("Known Hotspots");
            for h in HOTSPOTS {
                println!(
                    "  {:<34} {:<7} {:>4}/day  {}",
                    h.location,
                    h.risk_level.to_string(),
                    h.avg_violations_per_day,
                    h.common_violation
                );
            }
            println!();
            for window in ForecastWindow::ALL {
                print_forecast(window);
            }
        }
    }
}

fn print_forecast(window: ForecastWindow) {
    println!("Predicted Hotspots: {}", window.title());
    for h in window.hotspots() {
        print_predicted(h);
    }
    println!();
}

fn print_predicted(h: &PredictedHotspot) {
    println!("  {} ({} risk, {}% confidence)", h.location, h.predicted_risk, h.confidence);
    println!("    {:<24} {}", "Key factors", h.key_factors.join(", "));
    println!("    {:<24} {}", "Expected violations", h.expected_violations.join(", "));
    println!("    {:<24} {}", "Recommended action", h.recommended_action);
    println!("    {:<24} {:.4}, {:.4}", "Coordinates", h.coords.0, h.coords.1);
}

pub fn print_officers() {
    println!("{:<8} {:<20} {:<10} {:<10} {}", "ID", "NAME", "STATUS", "ZONE", "VEHICLE");
    for o in OFFICERS {
        println!(
            "{:<8} {:<20} {:<10} {:<10} {}",
            o.id,
            o.name,
            o.status.to_string(),
            o.zone,
            o.vehicle_id
        );
    }
}

pub fn print_alerts() {
    for a in alerts_by_urgency() {
        println!("[{:?}] {} · {}", a.status, a.id, a.location);
        println!("    {:<12} {:?}", "Type", a.alert_type);
        println!("    {:<12} {}", "Reported", a.timestamp);
        println!("    {:<12} {}", "Details", a.details);
    }
}

// ── Helpers ──

fn field(label: &str, value: &str) {
    println!("  {:<26} {}", label, value);
}

fn print_list(label: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let shown: Vec<&str> = items
        .iter()
        .take(MAX_LIST_ITEMS)
        .map(String::as_str)
        .collect();
    let mut line = shown.join(", ");
    if items.len() > MAX_LIST_ITEMS {
        line.push_str(&format!(" ... and {} more", items.len() - MAX_LIST_ITEMS));
    }
    field(label, &line);
}

fn print_bars(rows: &[(&str, u64)]) {
    let max = rows.iter().map(|(_, n)| *n).max().unwrap_or(0);
    for (label, n) in rows {
        println!("  {:<22} {} {}", label, bar(*n, max), format_inr(*n));
    }
}

fn bar(value: u64, max: u64) -> String {
    if max == 0 {
        return String::new();
    }
    let len = (value * BAR_WIDTH as u64).div_ceil(max) as usize;
    "█".repeat(len.min(BAR_WIDTH))
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}
