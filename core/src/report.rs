use std::net::IpAddr;

use revmap_common::error::{CollaboratorError, StoreError};

/// How one unit of stage work (a query or an IP) ended.
#[derive(Debug)]
pub enum UnitOutcome {
    Complete,
    /// The collaborator call failed; the unit produced nothing.
    Failed(CollaboratorError),
    /// New items were found but could not be appended to the store.
    Unpersisted(StoreError),
}

impl UnitOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn is_unpersisted(&self) -> bool {
        matches!(self, Self::Unpersisted(_))
    }
}

/// Result of searching a single query.
#[derive(Debug)]
pub struct QueryReport {
    pub query: String,
    /// URLs returned by the search engine.
    pub urls: usize,
    /// Addresses not seen before, in search result order.
    pub new_ips: Vec<IpAddr>,
    pub outcome: UnitOutcome,
}

/// Result of reverse-resolving a single address.
#[derive(Debug)]
pub struct LookupReport {
    pub ip: IpAddr,
    /// Domains returned by the collaborator, before deduplication.
    pub found: usize,
    pub new_domains: Vec<String>,
    pub outcome: UnitOutcome,
}

/// Aggregate of a reverse lookup pass.
#[derive(Debug, Default)]
pub struct ReverseReport {
    /// Newly discovered domains in completion order.
    pub domains: Vec<String>,
    pub completed: usize,
    pub failed: usize,
    pub unpersisted: usize,
    /// Some addresses were never looked up because the pass was cancelled.
    pub cancelled: bool,
}
