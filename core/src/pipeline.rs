//! # Discovery pipeline
//!
//! Drives one run end to end:
//! 1. **Generate** queries and drop the ones already used in earlier runs.
//! 2. **Search** them one after another, collecting unseen addresses.
//! 3. **Reverse** every new address at once through the worker pool.
//! 4. **Report** a [`Summary`].
//!
//! Failures of individual units are absorbed by the stages. Only bad
//! configuration and unreadable stores stop a run, and both are caught before
//! the first external call.

use std::net::IpAddr;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use revmap_common::collaborators::{QueryGenerator, ReverseLookup, SearchEngine};
use revmap_common::config::{Credentials, Settings, StorePaths};
use revmap_common::error::{CollaboratorError, StoreError};
use revmap_common::models::Summary;
use revmap_common::store::DedupSet;
use revmap_common::{error, info, warn};
use revmap_protocols::{CustomSearchClient, GeminiClient, ReverseIpClient};

use crate::error::PipelineError;
use crate::report::{LookupReport, QueryReport, UnitOutcome};
use crate::resolver::{DomainResolver, NameResolver, SystemResolver};
use crate::reverse::ReverseLookupStage;
use crate::search::SearchStage;

/// The persisted history a run deduplicates against.
pub struct Stores {
    pub ips: Arc<DedupSet<IpAddr>>,
    pub domains: Arc<DedupSet<String>>,
    pub queries: Arc<DedupSet<String>>,
}

impl Stores {
    pub async fn load(paths: &StorePaths) -> Result<Self, StoreError> {
        Ok(Self {
            ips: Arc::new(DedupSet::load(&paths.ips).await?),
            domains: Arc::new(DedupSet::load(&paths.domains).await?),
            queries: Arc::new(DedupSet::load(&paths.queries).await?),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            ips: Arc::new(DedupSet::in_memory()),
            domains: Arc::new(DedupSet::in_memory()),
            queries: Arc::new(DedupSet::in_memory()),
        }
    }
}

pub struct Collaborators {
    pub generator: Arc<dyn QueryGenerator>,
    pub search: Arc<dyn SearchEngine>,
    pub reverse: Arc<dyn ReverseLookup>,
    pub names: Arc<dyn NameResolver>,
}

impl Collaborators {
    /// The HTTP clients and the system resolver.
    pub fn from_credentials(
        credentials: &Credentials,
        proxy_url: Option<&str>,
    ) -> Result<Self, CollaboratorError> {
        Ok(Self {
            generator: Arc::new(GeminiClient::new(credentials.api_key.clone())?),
            search: Arc::new(CustomSearchClient::new(credentials)?),
            reverse: Arc::new(ReverseIpClient::new(proxy_url)?),
            names: Arc::new(SystemResolver),
        })
    }
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub query_count: RangeInclusive<usize>,
    pub max_concurrency: usize,
    pub search_delay: Duration,
}

impl From<&Settings> for RunOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            query_count: settings.query_count.clone(),
            max_concurrency: settings.max_concurrency,
            search_delay: settings.search_delay,
        }
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

/// Progress hooks for a front end. Every method defaults to doing nothing.
pub trait PipelineEvents: Send + Sync {
    fn generation_started(&self, _requested: usize) {}
    fn queries_generated(&self, _requested: usize, _accepted: &[String], _skipped: usize) {}
    fn search_started(&self, _index: usize, _total: usize, _query: &str) {}
    fn query_searched(&self, _index: usize, _total: usize, _report: &QueryReport) {}
    fn reverse_started(&self, _ips: usize) {}
    fn ip_reversed(&self, _report: &LookupReport) {}
}

pub struct NoEvents;

impl PipelineEvents for NoEvents {}

pub struct Pipeline {
    collaborators: Collaborators,
    stores: Stores,
    options: RunOptions,
    events: Arc<dyn PipelineEvents>,
}

impl Pipeline {
    pub fn new(collaborators: Collaborators, stores: Stores, options: RunOptions) -> Self {
        Self {
            collaborators,
            stores,
            options,
            events: Arc::new(NoEvents),
        }
    }

    pub fn with_events(mut self, events: Arc<dyn PipelineEvents>) -> Self {
        self.events = events;
        self
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    pub async fn run_once(&self, cancel: &CancellationToken) -> Summary {
        let mut summary = Summary::default();

        let queries = self.generate(&mut summary).await;
        if queries.is_empty() {
            warn!("no new queries this run");
            return summary;
        }
        summary.queries = queries.len();

        let new_ips = self.search_all(&queries, &mut summary, cancel).await;
        summary.new_ips = new_ips.len();

        if summary.cancelled {
            warn!(ips = new_ips.len(), "run cancelled before reverse lookup");
            return summary;
        }
        if new_ips.is_empty() {
            info!("no new addresses to reverse");
            return summary;
        }

        self.reverse_all(new_ips, &mut summary, cancel).await;
        summary
    }

    async fn generate(&self, summary: &mut Summary) -> Vec<String> {
        let range = self.options.query_count.clone();
        let requested = if range.is_empty() {
            *range.start()
        } else {
            rand::random_range(range)
        };

        self.events.generation_started(requested);
        let candidates = match self.collaborators.generator.generate(requested).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(error = %e, "query generation failed");
                Vec::new()
            }
        };

        let well_formed = candidates
            .iter()
            .map(|q| q.trim())
            .filter(|q| !q.contains(['\n', '\r']))
            .filter(|q| q.split_whitespace().nth(1).is_some())
            .map(String::from);
        let accepted = self.stores.queries.insert_new(well_formed);
        let skipped = candidates.len() - accepted.len();

        if let Err(e) = self.stores.queries.append_durable(&accepted).await {
            error!(error = %e, "query history was not saved");
            summary.unpersisted += 1;
        }

        self.events.queries_generated(requested, &accepted, skipped);
        accepted
    }

    /// Strictly sequential, in generation order.
    async fn search_all(
        &self,
        queries: &[String],
        summary: &mut Summary,
        cancel: &CancellationToken,
    ) -> Vec<IpAddr> {
        let resolver = DomainResolver::new(self.collaborators.names.clone());
        let stage = SearchStage::new(self.collaborators.search.clone(), resolver);
        let total = queries.len();
        let mut new_ips = Vec::new();

        for (index, query) in queries.iter().enumerate() {
            if index > 0 && !self.options.search_delay.is_zero() {
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    _ = tokio::time::sleep(self.options.search_delay) => {}
                }
            }
            if cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            self.events.search_started(index, total, query);
            let report = stage.run(query, &self.stores.ips).await;
            match &report.outcome {
                UnitOutcome::Complete => {}
                UnitOutcome::Failed(_) => summary.failed_searches += 1,
                UnitOutcome::Unpersisted(_) => summary.unpersisted += 1,
            }
            self.events.query_searched(index, total, &report);
            new_ips.extend(report.new_ips);
        }

        new_ips
    }

    async fn reverse_all(&self, ips: Vec<IpAddr>, summary: &mut Summary, cancel: &CancellationToken) {
        self.events.reverse_started(ips.len());

        let events = self.events.clone();
        let stage = ReverseLookupStage::new(self.collaborators.reverse.clone())
            .with_max_concurrency(self.options.max_concurrency)
            .with_reports(Arc::new(move |report: &LookupReport| events.ip_reversed(report)));

        let report = stage.run(ips, self.stores.domains.clone(), cancel).await;

        summary.new_domains = report.domains.len();
        summary.failed_lookups = report.failed;
        summary.unpersisted += report.unpersisted;
        summary.cancelled |= report.cancelled;
    }
}

/// Validates `settings`, loads the stores, builds the real collaborators and
/// runs the pipeline once.
pub async fn run_once(
    settings: &Settings,
    events: Arc<dyn PipelineEvents>,
    cancel: &CancellationToken,
) -> Result<Summary, PipelineError> {
    settings.validate()?;
    let credentials = settings.credentials()?;
    let stores = Stores::load(&settings.stores).await?;
    let collaborators = Collaborators::from_credentials(&credentials, settings.proxy_url.as_deref())?;

    info!(
        ips = stores.ips.len(),
        domains = stores.domains.len(),
        queries = stores.queries.len(),
        "history loaded"
    );

    let pipeline = Pipeline::new(collaborators, stores, RunOptions::from(settings)).with_events(events);
    Ok(pipeline.run_once(cancel).await)
}
