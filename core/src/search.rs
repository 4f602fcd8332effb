use std::net::IpAddr;
use std::sync::Arc;

use revmap_common::collaborators::SearchEngine;
use revmap_common::store::DedupSet;
use revmap_common::{error, warn};

use crate::report::{QueryReport, UnitOutcome};
use crate::resolver::DomainResolver;

/// Query → result URLs → previously unseen addresses.
pub struct SearchStage {
    engine: Arc<dyn SearchEngine>,
    resolver: DomainResolver,
}

impl SearchStage {
    pub fn new(engine: Arc<dyn SearchEngine>, resolver: DomainResolver) -> Self {
        Self { engine, resolver }
    }

    /// Searches `query` and returns the addresses that `ips` had not seen.
    ///
    /// The new addresses are inserted into `ips` and appended to its log
    /// before this returns. A failed search yields an empty report.
    pub async fn run(&self, query: &str, ips: &DedupSet<IpAddr>) -> QueryReport {
        let urls = match self.engine.search(query).await {
            Ok(urls) => urls,
            Err(e) => {
                warn!(query, error = %e, "search failed");
                return QueryReport {
                    query: query.to_string(),
                    urls: 0,
                    new_ips: Vec::new(),
                    outcome: UnitOutcome::Failed(e),
                };
            }
        };

        let mut new_ips = Vec::new();
        for url in &urls {
            if let Some(ip) = self.resolver.resolve(url).await
                && ips.try_insert(ip)
            {
                new_ips.push(ip);
            }
        }

        let outcome = match ips.append_durable(&new_ips).await {
            Ok(()) => UnitOutcome::Complete,
            Err(e) => {
                error!(query, error = %e, "new addresses were not saved");
                UnitOutcome::Unpersisted(e)
            }
        };

        QueryReport {
            query: query.to_string(),
            urls: urls.len(),
            new_ips,
            outcome,
        }
    }
}
