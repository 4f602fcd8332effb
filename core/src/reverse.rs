//! # Reverse lookup pass
//!
//! Fans the reverse-lookup collaborator out over a batch of addresses with a
//! fixed number of workers. Each worker owns one address end to end: lookup,
//! dedup against the shared domain set, append to the log. A crash therefore
//! loses at most the addresses that were in flight.
//!
//! Cancellation stops new workers from being spawned. Workers already running
//! finish normally and keep whatever they persisted.

use std::net::IpAddr;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use revmap_common::collaborators::ReverseLookup;
use revmap_common::config::DEFAULT_MAX_CONCURRENCY;
use revmap_common::store::DedupSet;
use revmap_common::{error, warn};

use crate::report::{LookupReport, ReverseReport, UnitOutcome};

/// Called on the coordinating task for every finished address.
pub type ReportFn = Arc<dyn Fn(&LookupReport) + Send + Sync>;

pub struct ReverseLookupStage {
    lookup: Arc<dyn ReverseLookup>,
    max_concurrency: usize,
    on_report: Option<ReportFn>,
}

impl ReverseLookupStage {
    pub fn new(lookup: Arc<dyn ReverseLookup>) -> Self {
        Self {
            lookup,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            on_report: None,
        }
    }

    /// Caps simultaneous lookups. Zero is treated as one.
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max.max(1);
        self
    }

    pub fn with_reports(mut self, on_report: ReportFn) -> Self {
        self.on_report = Some(on_report);
        self
    }

    pub async fn run(
        &self,
        ips: Vec<IpAddr>,
        domains: Arc<DedupSet<String>>,
        cancel: &CancellationToken,
    ) -> ReverseReport {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut workers: JoinSet<LookupReport> = JoinSet::new();
        let mut report = ReverseReport::default();
        let total = ips.len();

        for (launched, ip) in ips.into_iter().enumerate() {
            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!(pending = total - launched, "reverse lookup cancelled");
                    report.cancelled = true;
                    break;
                }
                permit = semaphore.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let lookup = self.lookup.clone();
            let domains = domains.clone();
            workers.spawn(async move {
                let _permit = permit;
                lookup_one(lookup.as_ref(), &domains, ip).await
            });

            while let Some(joined) = workers.try_join_next() {
                self.collect(joined, &mut report);
            }
        }

        while let Some(joined) = workers.join_next().await {
            self.collect(joined, &mut report);
        }

        report
    }

    fn collect(&self, joined: Result<LookupReport, tokio::task::JoinError>, report: &mut ReverseReport) {
        let lookup = match joined {
            Ok(lookup) => lookup,
            Err(e) => {
                error!(error = %e, "reverse lookup worker died");
                report.failed += 1;
                return;
            }
        };

        if let Some(on_report) = &self.on_report {
            on_report(&lookup);
        }

        match lookup.outcome {
            UnitOutcome::Complete => report.completed += 1,
            UnitOutcome::Failed(_) => report.failed += 1,
            UnitOutcome::Unpersisted(_) => report.unpersisted += 1,
        }
        report.domains.extend(lookup.new_domains);
    }
}

async fn lookup_one(lookup: &dyn ReverseLookup, domains: &DedupSet<String>, ip: IpAddr) -> LookupReport {
    let candidates = match lookup.reverse_lookup(ip).await {
        Ok(candidates) => candidates,
        Err(e) => {
            warn!(%ip, error = %e, "reverse lookup failed");
            return LookupReport {
                ip,
                found: 0,
                new_domains: Vec::new(),
                outcome: UnitOutcome::Failed(e),
            };
        }
    };

    let new_domains = domains.insert_new(candidates.iter().filter_map(|d| normalize_domain(d)));
    let outcome = match domains.append_durable(&new_domains).await {
        Ok(()) => UnitOutcome::Complete,
        Err(e) => {
            error!(%ip, error = %e, "new domains were not saved");
            UnitOutcome::Unpersisted(e)
        }
    };

    LookupReport {
        ip,
        found: candidates.len(),
        new_domains,
        outcome,
    }
}

/// Lower-cased, without a trailing dot. Anything that cannot be a single
/// log record is dropped.
fn normalize_domain(raw: &str) -> Option<String> {
    let domain = raw.trim().trim_end_matches('.').to_ascii_lowercase();
    if domain.is_empty() || domain.chars().any(char::is_whitespace) {
        return None;
    }
    Some(domain)
}
