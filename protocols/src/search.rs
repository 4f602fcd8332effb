//! Google Custom Search JSON API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use revmap_common::collaborators::SearchEngine;
use revmap_common::config::Credentials;
use revmap_common::error::CollaboratorError;

use crate::http;

const SERVICE: &str = "search";
const BASE_URL: &str = "https://www.googleapis.com/customsearch/v1";
const TIMEOUT: Duration = Duration::from_secs(10);
const RESULTS_PER_QUERY: &str = "10";

pub struct CustomSearchClient {
    client: Client,
    api_key: String,
    cse_id: String,
    url: String,
}

impl CustomSearchClient {
    pub fn new(credentials: &Credentials) -> Result<Self, CollaboratorError> {
        Ok(Self {
            client: http::build_client(SERVICE, TIMEOUT, None)?,
            api_key: credentials.api_key.clone(),
            cse_id: credentials.cse_id.clone(),
            url: BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

#[async_trait]
impl SearchEngine for CustomSearchClient {
    async fn search(&self, query: &str) -> Result<Vec<String>, CollaboratorError> {
        let resp = self
            .client
            .get(&self.url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.cse_id.as_str()),
                ("q", query),
                ("num", RESULTS_PER_QUERY),
            ])
            .send()
            .await
            .map_err(|e| http::transport(SERVICE, e))?;

        let parsed: SearchResponse = http::read_json(SERVICE, resp).await?;
        Ok(parsed.links())
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    link: Option<String>,
}

impl SearchResponse {
    fn links(self) -> Vec<String> {
        self.items.into_iter().filter_map(|item| item.link).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_links_in_order() {
        let body = r#"{
            "kind": "customsearch#search",
            "items": [
                {"title": "a", "link": "https://www.a.com/x"},
                {"title": "no link"},
                {"title": "b", "link": "http://b.org"}
            ]
        }"#;
        let parsed: SearchResponse = http::decode(SERVICE, body).unwrap();
        assert_eq!(parsed.links(), vec!["https://www.a.com/x", "http://b.org"]);
    }

    #[test]
    fn missing_items_is_empty() {
        let parsed: SearchResponse = http::decode(SERVICE, r#"{"searchInformation": {}}"#).unwrap();
        assert!(parsed.links().is_empty());
    }

    fn credentials() -> Credentials {
        Credentials {
            api_key: "key".into(),
            cse_id: "engine".into(),
        }
    }

    #[tokio::test]
    async fn rate_limit_is_status_error() {
        let (base, server) = http::canned::serve_once(429, r#"{"error": "quota"}"#).await;
        let client = CustomSearchClient::new(&credentials()).unwrap().with_base_url(base);

        let err = client.search("two words").await.unwrap_err();

        assert!(matches!(
            err,
            CollaboratorError::Status { service: "search", status: 429, ref body } if body.contains("quota")
        ));
        let request_line = server.await.unwrap();
        assert!(request_line.starts_with("GET /api?"));
        assert!(request_line.contains("cx=engine"));
        assert!(request_line.contains("q=two+words"));
    }

    #[tokio::test]
    async fn success_returns_links() {
        let (base, _server) =
            http::canned::serve_once(200, r#"{"items": [{"link": "https://a.com/"}]}"#).await;
        let client = CustomSearchClient::new(&credentials()).unwrap().with_base_url(base);

        assert_eq!(client.search("two words").await.unwrap(), vec!["https://a.com/"]);
    }
}
