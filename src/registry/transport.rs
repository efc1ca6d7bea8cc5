//! HTTP transport boundary for registry requests
//!
//! A single-send capability behind a trait, so the auth negotiation can be
//! exercised against scripted responses. The production implementation wraps
//! `reqwest`; every response body is buffered eagerly, which releases the
//! underlying connection no matter how the caller disposes of the response
//! (including the 401 whose body the negotiation never looks at).

use crate::error::{RegistryError, Result};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use std::time::Duration;
use url::Url;

/// Default per-request deadline for [`ReqwestTransport`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// One outbound HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

/// One inbound HTTP response, body fully buffered.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// A header value as a string, when present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// Single-request HTTP capability.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send one request and buffer the entire response.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Production transport backed by a shared `reqwest` client.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        Self::with_options(DEFAULT_TIMEOUT, false)
    }

    pub fn with_options(timeout: Duration, accept_invalid_certs: bool) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .map_err(|e| {
                RegistryError::Configuration(format!("failed to create HTTP client: {}", e))
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = request.url.to_string();
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| RegistryError::transport(&url, e))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| RegistryError::transport(&url, e))?
            .to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Scripted transport for unit tests: hands out canned replies in order and
/// records every request it was asked to send.
#[cfg(test)]
pub(crate) struct ScriptedTransport {
    replies: std::sync::Mutex<std::collections::VecDeque<Result<HttpResponse>>>,
    requests: std::sync::Mutex<Vec<HttpRequest>>,
}

#[cfg(test)]
impl ScriptedTransport {
    pub fn new(replies: Vec<Result<HttpResponse>>) -> Self {
        Self {
            replies: std::sync::Mutex::new(replies.into_iter().collect()),
            requests: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Convenience reply: a response with the given status, headers, and body.
    pub fn reply(
        status: StatusCode,
        headers: &[(&str, &str)],
        body: &str,
    ) -> Result<HttpResponse> {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.insert(
                reqwest::header::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                value.parse().unwrap(),
            );
        }
        Ok(HttpResponse {
            status,
            headers: map,
            body: body.as_bytes().to_vec(),
        })
    }

    /// All requests sent so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[cfg(test)]
#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("scripted transport ran out of replies")
    }
}
