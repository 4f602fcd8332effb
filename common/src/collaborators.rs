//! Contracts for the external services the pipeline consumes.
//!
//! Implementations live in `revmap-protocols`; tests provide their own stubs.

use std::net::IpAddr;

use async_trait::async_trait;

use crate::error::CollaboratorError;

/// Produces free-text search queries.
#[async_trait]
pub trait QueryGenerator: Send + Sync {
    /// Asks for `count` queries. Implementations may return fewer.
    async fn generate(&self, count: usize) -> Result<Vec<String>, CollaboratorError>;
}

/// Turns a query into result URLs.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<String>, CollaboratorError>;
}

/// Lists the domains hosted on an address.
#[async_trait]
pub trait ReverseLookup: Send + Sync {
    async fn reverse_lookup(&self, ip: IpAddr) -> Result<Vec<String>, CollaboratorError>;
}
