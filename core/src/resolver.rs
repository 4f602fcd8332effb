//! URL → host → address resolution.
//!
//! Every failure here is expected (dead links, parked domains, NXDOMAIN) and
//! ends up as `None` from [`DomainResolver::resolve`]; the typed reason is
//! only kept for the debug log.

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use url::{Host, Url};

use revmap_common::error::ResolutionError;

/// Name lookup backend.
#[async_trait]
pub trait NameResolver: Send + Sync {
    async fn lookup(&self, host: &str) -> Result<IpAddr, ResolutionError>;
}

/// Resolves through the operating system, preferring IPv4 answers.
pub struct SystemResolver;

#[async_trait]
impl NameResolver for SystemResolver {
    async fn lookup(&self, host: &str) -> Result<IpAddr, ResolutionError> {
        let addrs: Vec<IpAddr> = tokio::net::lookup_host((host, 0))
            .await
            .map_err(|source| ResolutionError::Lookup {
                host: host.to_string(),
                source,
            })?
            .map(|sock| sock.ip())
            .collect();

        addrs
            .iter()
            .find(|ip| ip.is_ipv4())
            .or_else(|| addrs.first())
            .copied()
            .ok_or_else(|| ResolutionError::NoAddress {
                host: host.to_string(),
            })
    }
}

pub struct DomainResolver {
    names: Arc<dyn NameResolver>,
}

impl DomainResolver {
    pub fn new(names: Arc<dyn NameResolver>) -> Self {
        Self { names }
    }

    /// Best-effort address for the host of `url`.
    pub async fn resolve(&self, url: &str) -> Option<IpAddr> {
        match self.try_resolve(url).await {
            Ok(ip) => Some(ip),
            Err(e) => {
                tracing::debug!(url, error = %e, "unresolved");
                None
            }
        }
    }

    pub async fn try_resolve(&self, url: &str) -> Result<IpAddr, ResolutionError> {
        let host = extract_host(url).ok_or_else(|| ResolutionError::NoHost {
            url: url.to_string(),
        })?;

        // IP literals need no lookup.
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(ip);
        }
        self.names.lookup(&host).await
    }
}

/// Lower-cased host of `url` without a leading `www.`.
pub fn extract_host(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = match parsed.host()? {
        Host::Domain(domain) => domain.to_ascii_lowercase(),
        Host::Ipv4(ip) => ip.to_string(),
        Host::Ipv6(ip) => ip.to_string(),
    };

    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
    if host.is_empty() { None } else { Some(host) }
}
