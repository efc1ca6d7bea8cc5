//! Bearer-challenge parsing and token exchange
//!
//! Implements the registry's two-tier authentication scheme: a static basic
//! credential is attached first, and a 401 carrying a `WWW-Authenticate:
//! Bearer ...` challenge escalates into one token-exchange round trip
//! against the realm the challenge names.

use crate::credentials::CredentialStore;
use crate::error::{RegistryError, Result};
use crate::registry::transport::{HttpRequest, HttpResponse, HttpTransport};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: Option<String>,
    access_token: Option<String>,
}

/// Parse the attribute list following the `Bearer ` prefix of a challenge.
///
/// Attributes are comma-separated `name=value` pairs whose values may be
/// double-quoted; a quoted section is atomic, so commas inside quotes do not
/// split (`foo="hello,world"` is one attribute). Each token is trimmed,
/// split at its first `=`, and the value stripped of surrounding quotes. A
/// token without `=` maps the raw token to an empty value, and a duplicated
/// name keeps its last occurrence. No attribute is required at this level;
/// a missing realm surfaces later as a URL failure.
fn parse_challenge(params: &str) -> HashMap<String, String> {
    let mut tokens: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for ch in params.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            ',' if !in_quotes => tokens.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    tokens.push(current);

    let mut attributes = HashMap::new();
    for raw in &tokens {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        match raw.split_once('=') {
            Some((name, value)) => {
                let value = value.trim().trim_matches('"');
                attributes.insert(name.trim().to_string(), value.to_string());
            }
            None => {
                attributes.insert(raw.to_string(), String::new());
            }
        }
    }
    attributes
}

pub(crate) fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| {
        RegistryError::Configuration(format!("credential not usable as a header value: {}", e))
    })
}

/// Negotiates credentials for registry requests: basic lookup, challenge
/// detection, and the token exchange itself.
pub struct AuthNegotiator {
    transport: Arc<dyn HttpTransport>,
    credentials: CredentialStore,
}

impl AuthNegotiator {
    pub fn new(transport: Arc<dyn HttpTransport>, credentials: CredentialStore) -> Self {
        Self {
            transport,
            credentials,
        }
    }

    /// The pre-encoded basic credential for the request URL's authority.
    ///
    /// A URL carrying an explicit non-default port is keyed `host:port`.
    /// Scheme-default ports are normalized away during URL parsing, so those
    /// URLs consult the bare `host` entry first and `host:<default-port>` as
    /// a fallback. Absence is not an error; the request simply goes out
    /// anonymous.
    pub fn basic_auth(&self, url: &Url) -> Option<&str> {
        let host = url.host_str()?;
        match url.port() {
            Some(port) => self.credentials.lookup(&format!("{}:{}", host, port)),
            None => self.credentials.lookup(host).or_else(|| {
                let port = url.port_or_known_default()?;
                self.credentials.lookup(&format!("{}:{}", host, port))
            }),
        }
    }

    /// The token-exchange URL named by a response's bearer challenge.
    ///
    /// Only the header matters here, not the status; the caller has already
    /// decided this response warrants escalation. The realm is the base URL
    /// and `service` and `scope` become its entire query, empty when the
    /// challenge omitted them; a query string the realm itself carried is
    /// discarded.
    pub fn challenge_url(&self, response: &HttpResponse) -> Result<Url> {
        let header = response.header("www-authenticate").unwrap_or_default();
        let Some(params) = header.strip_prefix(BEARER_PREFIX) else {
            return Err(RegistryError::NoChallenge);
        };
        let attributes = parse_challenge(params);

        let realm = attributes
            .get("realm")
            .map(String::as_str)
            .unwrap_or_default();
        let mut url =
            Url::parse(realm).map_err(|e| RegistryError::malformed_realm(realm, e))?;

        let service = attributes
            .get("service")
            .map(String::as_str)
            .unwrap_or_default();
        let scope = attributes
            .get("scope")
            .map(String::as_str)
            .unwrap_or_default();
        url.query_pairs_mut()
            .clear()
            .append_pair("service", service)
            .append_pair("scope", scope);
        Ok(url)
    }

    /// Exchange a challenge for a bearer `Authorization` value.
    ///
    /// One GET against the challenge URL, accepting JSON; the basic
    /// credential, when present, accompanies it so the authorization service
    /// mints a token for the same identity. Only a 200 will do. The token
    /// field may legitimately be empty; the registry's answer to the retried
    /// request is what decides.
    pub async fn exchange_for_token(
        &self,
        challenged: &HttpResponse,
        basic_auth: Option<&str>,
    ) -> Result<String> {
        let url = self.challenge_url(challenged)?;

        let mut request = HttpRequest::new(Method::GET, url.clone());
        request
            .headers
            .insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(basic) = basic_auth {
            request.headers.insert(AUTHORIZATION, header_value(basic)?);
        }

        let response = self.transport.send(request).await?;
        if response.status != StatusCode::OK {
            return Err(RegistryError::TokenExchangeStatus {
                url: url.to_string(),
                status: response.status,
            });
        }

        let decoded: TokenResponse = serde_json::from_slice(&response.body)
            .map_err(|e| RegistryError::decode("token response", e))?;
        let token = decoded.token.or(decoded.access_token).unwrap_or_default();
        Ok(format!("{}{}", BEARER_PREFIX, token))
    }
}
