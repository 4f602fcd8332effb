use colored::*;
use revmap_core::report::{LookupReport, QueryReport, UnitOutcome};

use crate::terminal::colors;

pub const QUERY_WIDTH: usize = 60;

/// Cuts `text` to `max` characters, marking the cut with "...".
pub fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

pub fn query_line(index: usize, total: usize, query: &str) -> String {
    let width = total.to_string().len();
    format!(
        "{} {}",
        format!("[{:>width$}/{}]", index + 1, total).color(colors::ACCENT),
        truncate(query, QUERY_WIDTH).color(colors::QUERY)
    )
}

pub fn search_outcome(report: &QueryReport) -> String {
    match &report.outcome {
        UnitOutcome::Failed(e) => format!("{} search failed: {e}", "✗".red().bold()),
        _ if report.urls == 0 => format!("{} no results", "⚠".yellow().bold()),
        UnitOutcome::Unpersisted(e) => format!(
            "{} {} URLs → {} new IPs, not saved: {e}",
            "⚠".yellow().bold(),
            report.urls,
            report.new_ips.len()
        ),
        UnitOutcome::Complete => format!(
            "{} {} URLs → {} new IPs",
            "✓".green().bold(),
            report.urls,
            report.new_ips.len().to_string().green().bold()
        ),
    }
}

pub fn lookup_outcome(report: &LookupReport) -> String {
    let ip = report.ip.to_string();
    let ip = match report.ip {
        std::net::IpAddr::V4(_) => ip.color(colors::IPV4_ADDR),
        std::net::IpAddr::V6(_) => ip.color(colors::IPV6_ADDR),
    };

    match &report.outcome {
        UnitOutcome::Failed(e) => format!("{} {ip} → {e}", "✗".red().bold()),
        UnitOutcome::Unpersisted(e) => format!(
            "{} {ip} → {} new domains, not saved: {e}",
            "⚠".yellow().bold(),
            report.new_domains.len()
        ),
        UnitOutcome::Complete if report.new_domains.is_empty() => {
            format!("{} {ip} → no new domains", "⚠".yellow())
        }
        UnitOutcome::Complete => format!(
            "{} {ip} → {} new domains",
            "✓".green().bold(),
            report.new_domains.len().to_string().color(colors::DOMAIN).bold()
        ),
    }
}
