use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use colored::*;
use tokio_util::sync::CancellationToken;

use revmap_common::config::Settings;
use revmap_common::models::Summary;
use revmap_common::{success, warn};
use revmap_core::pipeline::{self, PipelineEvents};
use revmap_core::report::{LookupReport, QueryReport};

use crate::input::KeyListener;
use crate::rprint;
use crate::terminal::{format, print, spinner};

pub async fn run(settings: &Settings) -> anyhow::Result<()> {
    let q = settings.quiet;
    print::header("environment check", q);

    settings.credentials()?;
    success!("Environment variables validated");
    match &settings.proxy_url {
        Some(proxy) => print::print_status(format!("Proxy configured: {}", proxy.cyan())),
        None => print::print_status("No proxy configured"),
    }

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("stopping: in-flight work will finish");
            ctrl_c.cancel();
        }
    });
    let keys = if settings.disable_input {
        None
    } else {
        KeyListener::start(cancel.clone())
    };

    let start_time = Instant::now();
    let events = Arc::new(TerminalEvents::new(q));
    let result = pipeline::run_once(settings, events, &cancel).await;

    spinner::get_spinner().finish_and_clear();
    drop(keys);

    let summary = result?;
    run_ends(&summary, start_time.elapsed(), q);
    Ok(())
}

fn run_ends(summary: &Summary, total_time: Duration, q: u8) {
    if summary.cancelled {
        warn!("Run cancelled; everything found so far has been saved");
    }
    if summary.queries == 0 {
        print::header("no new queries", q);
        print::no_results();
        return;
    }

    rprint!();
    let mut rows: Vec<(&str, String)> = vec![
        ("Queries searched", summary.queries.to_string()),
        ("IPs found", summary.new_ips.to_string()),
        ("Domains found", summary.new_domains.to_string()),
    ];
    if summary.failed_searches > 0 {
        rows.push(("Failed searches", summary.failed_searches.to_string()));
    }
    if summary.failed_lookups > 0 {
        rows.push(("Failed lookups", summary.failed_lookups.to_string()));
    }
    if summary.unpersisted > 0 {
        rows.push(("Unsaved batches", summary.unpersisted.to_string().red().to_string()));
    }
    rows.push(("Time", format!("{:.2}s", total_time.as_secs_f64())));
    print::summary_box("RESULTS", &rows);

    if summary.found_nothing() {
        print::no_results();
    } else if !summary.had_failures() && !summary.cancelled {
        success!("Process completed successfully");
    }
}

/// Renders pipeline progress on the terminal.
struct TerminalEvents {
    quiet: u8,
    reverse_total: AtomicUsize,
    reversed: AtomicUsize,
    new_domains: AtomicUsize,
}

impl TerminalEvents {
    fn new(quiet: u8) -> Self {
        Self {
            quiet,
            reverse_total: AtomicUsize::new(0),
            reversed: AtomicUsize::new(0),
            new_domains: AtomicUsize::new(0),
        }
    }

    fn verbose(&self) -> bool {
        self.quiet == 0
    }
}

impl PipelineEvents for TerminalEvents {
    fn generation_started(&self, requested: usize) {
        print::header("query generation", self.quiet);
        if self.verbose() {
            print::print_status(format!("Requesting {} random sentences", requested.to_string().cyan()));
        }
    }

    fn queries_generated(&self, _requested: usize, accepted: &[String], skipped: usize) {
        if skipped > 0 {
            warn!("Skipped {skipped} duplicate or malformed sentences");
        }
        if accepted.is_empty() {
            warn!("No new sentences generated");
            return;
        }
        success!("Retrieved {} new sentences", accepted.len());
        if self.verbose() {
            let lines: Vec<String> = accepted
                .iter()
                .map(|q| format::truncate(q, format::QUERY_WIDTH))
                .collect();
            print::as_tree(&lines);
        }
    }

    fn search_started(&self, index: usize, total: usize, query: &str) {
        if index == 0 {
            print::header("keyword search", self.quiet);
        }
        spinner::report_search_progress(index, total, &format::truncate(query, 40));
        if self.verbose() {
            print::print_status(format::query_line(index, total, query));
        }
    }

    fn query_searched(&self, _index: usize, _total: usize, report: &QueryReport) {
        if self.verbose() {
            print::print(&format!("    {}", format::search_outcome(report)));
        }
    }

    fn reverse_started(&self, ips: usize) {
        print::header("reverse ip lookup", self.quiet);
        self.reverse_total.store(ips, Ordering::Relaxed);
        success!("Total new IPs to reverse: {ips}");
    }

    fn ip_reversed(&self, report: &LookupReport) {
        let done = self.reversed.fetch_add(1, Ordering::Relaxed) + 1;
        let found = self.new_domains.fetch_add(report.new_domains.len(), Ordering::Relaxed)
            + report.new_domains.len();
        spinner::report_lookup_progress(done, self.reverse_total.load(Ordering::Relaxed), found);
        if self.verbose() {
            print::print(&format!("    {}", format::lookup_outcome(report)));
        }
    }
}
