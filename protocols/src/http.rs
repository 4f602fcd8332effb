use std::time::Duration;

use reqwest::{Client, Proxy, Response};
use serde::de::DeserializeOwned;

use revmap_common::error::CollaboratorError;

/// Builds a client with a per-request timeout and, optionally, one proxy for
/// every scheme. Proxies from the process environment are ignored.
pub fn build_client(
    service: &'static str,
    timeout: Duration,
    proxy_url: Option<&str>,
) -> Result<Client, CollaboratorError> {
    let mut builder = Client::builder().timeout(timeout).no_proxy();
    if let Some(url) = proxy_url {
        let proxy = Proxy::all(url).map_err(|e| transport(service, e))?;
        builder = builder.proxy(proxy);
    }
    builder.build().map_err(|e| transport(service, e))
}

pub fn transport(service: &'static str, err: reqwest::Error) -> CollaboratorError {
    let message = if err.is_timeout() {
        format!("timed out: {err}")
    } else {
        err.to_string()
    };
    CollaboratorError::Transport { service, message }
}

/// Rejects non-2xx responses and decodes the body as JSON.
pub async fn read_json<T: DeserializeOwned>(
    service: &'static str,
    resp: Response,
) -> Result<T, CollaboratorError> {
    let status = resp.status();
    let body = resp.text().await.map_err(|e| transport(service, e))?;

    if !status.is_success() {
        return Err(CollaboratorError::Status {
            service,
            status: status.as_u16(),
            body,
        });
    }

    decode(service, &body)
}

pub fn decode<T: DeserializeOwned>(service: &'static str, body: &str) -> Result<T, CollaboratorError> {
    serde_json::from_str(body).map_err(|e| CollaboratorError::Malformed {
        service,
        reason: e.to_string(),
    })
}
