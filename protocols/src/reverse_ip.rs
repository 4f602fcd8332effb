//! Reverse IP lookups against reverseipdomain.com.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use revmap_common::collaborators::ReverseLookup;
use revmap_common::error::CollaboratorError;

use crate::http;

const SERVICE: &str = "reverse-ip";
const BASE_URL: &str = "https://api.reverseipdomain.com/";
const TIMEOUT: Duration = Duration::from_secs(20);

pub struct ReverseIpClient {
    client: Client,
    url: String,
}

impl ReverseIpClient {
    pub fn new(proxy_url: Option<&str>) -> Result<Self, CollaboratorError> {
        Ok(Self {
            client: http::build_client(SERVICE, TIMEOUT, proxy_url)?,
            url: BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

#[async_trait]
impl ReverseLookup for ReverseIpClient {
    async fn reverse_lookup(&self, ip: IpAddr) -> Result<Vec<String>, CollaboratorError> {
        let resp = self
            .client
            .get(&self.url)
            .query(&[("ip", ip.to_string())])
            .send()
            .await
            .map_err(|e| http::transport(SERVICE, e))?;

        let parsed: ReverseResponse = http::read_json(SERVICE, resp).await?;
        Ok(parsed.result)
    }
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    result: Vec<String>,
}
