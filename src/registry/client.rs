//! Registry manifest client
//!
//! One shared authenticated-request routine underlies both manifest
//! operations: attach the basic credential for the target host, send, and on
//! a 401 exchange the challenge for a bearer token and replay the identical
//! request exactly once. There is no second escalation and no token reuse
//! across calls.

use crate::credentials::CredentialStore;
use crate::error::{RegistryError, Result};
use crate::logging::Logger;
use crate::manifest::{MANIFEST_V2_MEDIA_TYPE, Manifest};
use crate::registry::auth::{AuthNegotiator, header_value};
use crate::registry::transport::{
    DEFAULT_TIMEOUT, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport,
};
use reqwest::Method;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

pub struct RegistryClientBuilder {
    credentials: CredentialStore,
    transport: Option<Arc<dyn HttpTransport>>,
    timeout: Duration,
    skip_tls: bool,
    logger: Logger,
}

impl RegistryClientBuilder {
    pub fn new() -> Self {
        Self {
            credentials: CredentialStore::empty(),
            transport: None,
            timeout: DEFAULT_TIMEOUT,
            skip_tls: false,
            logger: Logger::default(),
        }
    }

    /// Credentials to consult for the initial basic attempt.
    pub fn with_credentials(mut self, credentials: CredentialStore) -> Self {
        self.credentials = credentials;
        self
    }

    /// Replace the HTTP transport. Timeout and TLS settings only apply to
    /// the default transport, not a replacement.
    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_skip_tls(mut self, skip_tls: bool) -> Self {
        self.skip_tls = skip_tls;
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn build(self) -> Result<RegistryClient> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::with_options(
                self.timeout,
                self.skip_tls,
            )?),
        };
        Ok(RegistryClient {
            auth: AuthNegotiator::new(transport.clone(), self.credentials),
            transport,
            logger: self.logger,
        })
    }
}

impl Default for RegistryClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct RegistryClient {
    transport: Arc<dyn HttpTransport>,
    auth: AuthNegotiator,
    logger: Logger,
}

impl RegistryClient {
    pub fn builder() -> RegistryClientBuilder {
        RegistryClientBuilder::new()
    }

    /// Fetch and decode the V2 manifest at `url`.
    pub async fn get_manifest(&self, url: &str) -> Result<Manifest> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(MANIFEST_V2_MEDIA_TYPE));
        let response = self.execute(Method::GET, url, headers, None).await?;
        serde_json::from_slice(&response.body)
            .map_err(|e| RegistryError::decode("manifest response", e))
    }

    /// Store `manifest` at `url`.
    ///
    /// The manifest is serialized once; the retried attempt, if any, carries
    /// the identical bytes.
    pub async fn put_manifest(&self, url: &str, manifest: &Manifest) -> Result<()> {
        let body = serde_json::to_vec(manifest)
            .map_err(|e| RegistryError::decode("manifest payload", e))?;
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static(MANIFEST_V2_MEDIA_TYPE),
        );
        self.execute(Method::PUT, url, headers, Some(body)).await?;
        Ok(())
    }

    /// Shared authenticated-request routine.
    ///
    /// 200 and 201 are the success statuses on either attempt. A 401 on the
    /// first attempt triggers the one permitted escalation; any other status,
    /// on either attempt, is terminal.
    async fn execute(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> Result<HttpResponse> {
        let parsed = Url::parse(url).map_err(|e| RegistryError::transport(url, e))?;
        let basic_auth = self.auth.basic_auth(&parsed).map(str::to_owned);

        let mut request = HttpRequest::new(method.clone(), parsed.clone());
        request.headers = headers.clone();
        if let Some(basic) = basic_auth.as_deref() {
            request.headers.insert(AUTHORIZATION, header_value(basic)?);
        }
        request.body = body.clone();

        let response = self.transport.send(request).await?;
        match response.status.as_u16() {
            401 => {
                self.logger.verbose(&format!(
                    "Registry challenged request to {}, exchanging for a bearer token",
                    url
                ));
                let bearer = self
                    .auth
                    .exchange_for_token(&response, basic_auth.as_deref())
                    .await?;

                let mut retry = HttpRequest::new(method, parsed);
                retry.headers = headers;
                retry.headers.insert(AUTHORIZATION, header_value(&bearer)?);
                retry.body = body;

                let retried = self.transport.send(retry).await?;
                match retried.status.as_u16() {
                    200 | 201 => Ok(retried),
                    _ => Err(RegistryError::UnexpectedStatus {
                        url: url.to_string(),
                        status: retried.status,
                    }),
                }
            }
            200 | 201 => Ok(response),
            _ => Err(RegistryError::UnexpectedStatus {
                url: url.to_string(),
                status: response.status,
            }),
        }
    }
}
