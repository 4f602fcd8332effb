//! Scripted collaborators that count their calls.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use revmap_common::collaborators::{QueryGenerator, ReverseLookup, SearchEngine};
use revmap_common::error::{CollaboratorError, ResolutionError};
use revmap_core::resolver::NameResolver;
use revmap_core::{Collaborators, RunOptions};

#[derive(Default)]
pub struct Calls {
    pub generate: AtomicUsize,
    pub search: AtomicUsize,
    pub reverse: AtomicUsize,
    in_flight: AtomicUsize,
    pub peak_in_flight: AtomicUsize,
}

impl Calls {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

pub struct Generator {
    pub sentences: Vec<String>,
    pub calls: Arc<Calls>,
}

#[async_trait]
impl QueryGenerator for Generator {
    async fn generate(&self, _count: usize) -> Result<Vec<String>, CollaboratorError> {
        self.calls.generate.fetch_add(1, Ordering::SeqCst);
        Ok(self.sentences.clone())
    }
}

/// Answers each query with a fixed list of URLs; unknown queries find nothing.
pub struct Search {
    pub results: HashMap<String, Vec<String>>,
    pub calls: Arc<Calls>,
}

#[async_trait]
impl SearchEngine for Search {
    async fn search(&self, query: &str) -> Result<Vec<String>, CollaboratorError> {
        self.calls.search.fetch_add(1, Ordering::SeqCst);
        Ok(self.results.get(query).cloned().unwrap_or_default())
    }
}

/// Hosts named like IP literals resolve to themselves.
pub struct LiteralNames;

#[async_trait]
impl NameResolver for LiteralNames {
    async fn lookup(&self, host: &str) -> Result<IpAddr, ResolutionError> {
        host.parse().map_err(|_| ResolutionError::NoAddress {
            host: host.to_string(),
        })
    }
}

/// Every address maps to `<ip>.example`; listed addresses fail.
pub struct Reverse {
    pub failing: Vec<IpAddr>,
    pub delay: Duration,
    pub calls: Arc<Calls>,
}

#[async_trait]
impl ReverseLookup for Reverse {
    async fn reverse_lookup(&self, ip: IpAddr) -> Result<Vec<String>, CollaboratorError> {
        self.calls.reverse.fetch_add(1, Ordering::SeqCst);
        let now = self.calls.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.calls.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.calls.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(&ip) {
            return Err(CollaboratorError::Status {
                service: "reverse-ip",
                status: 500,
                body: "upstream".into(),
            });
        }
        Ok(vec![format!("{}.example", ip.to_string().replace(':', "-"))])
    }
}

#[derive(Default)]
pub struct Scenario {
    pub sentences: Vec<String>,
    pub results: Vec<(String, Vec<String>)>,
    pub failing: Vec<IpAddr>,
    pub delay: Duration,
}

impl Scenario {
    pub fn build(self) -> (Collaborators, Arc<Calls>) {
        let calls = Arc::new(Calls::default());
        let collaborators = Collaborators {
            generator: Arc::new(Generator {
                sentences: self.sentences,
                calls: calls.clone(),
            }),
            search: Arc::new(Search {
                results: self.results.into_iter().collect(),
                calls: calls.clone(),
            }),
            reverse: Arc::new(Reverse {
                failing: self.failing,
                delay: self.delay,
                calls: calls.clone(),
            }),
            names: Arc::new(LiteralNames),
        };
        (collaborators, calls)
    }
}

pub fn options(max_concurrency: usize) -> RunOptions {
    RunOptions {
        query_count: 1..=1,
        max_concurrency,
        search_delay: Duration::ZERO,
    }
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}
