//! HTTP client wrapper for storage service requests.

use std::future::Future;
use std::time::Duration;

use reqwest::multipart::Form;
use reqwest::{Client, Response};
use tokio::time::timeout;

use crate::error::{Result, StoreError};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

/// HTTP client for making requests to the storage service.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    /// Create a new HTTP client.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create a new HTTP client with a proxy.
    pub fn with_proxy(proxy: &str) -> Result<Self> {
        let proxy = reqwest::Proxy::all(proxy)
            .map_err(|e| StoreError::Config(format!("Invalid proxy: {}", e)))?;

        let client = Client::builder()
            .proxy(proxy)
            .build()
            .map_err(|e| StoreError::Config(format!("Failed to build client: {}", e)))?;

        Ok(Self {
            client,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Replace the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Make a POST request with JSON body.
    ///
    /// Unlike the streaming calls, a non-2xx status is not an error here:
    /// callers classify the status themselves. The timeout covers the whole
    /// exchange, body included.
    pub async fn post_json(&self, url: &str, body: &str) -> Result<HttpResponse> {
        let request = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .body(body.to_string())
            .send();
        self.collect_bounded(request).await
    }

    /// Make a POST request with a multipart form and query parameters.
    pub async fn post_multipart(
        &self,
        url: &str,
        query: &[(&str, &str)],
        form: Form,
    ) -> Result<HttpResponse> {
        let request = self.client.post(url).query(query).multipart(form).send();
        self.collect_bounded(request).await
    }

    /// Make a GET request and hand back the response for streaming.
    ///
    /// Only the time to receive headers is bounded here; callers bound each
    /// body read themselves.
    pub async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Response> {
        let request = self.client.get(url).query(query).send();
        let response = self.bounded(request).await?;

        if !response.status().is_success() {
            return Err(StoreError::HttpError(response.status().as_u16()));
        }
        Ok(response)
    }

    async fn bounded<F>(&self, request: F) -> Result<Response>
    where
        F: Future<Output = reqwest::Result<Response>>,
    {
        Ok(timeout(self.timeout, request)
            .await
            .map_err(|_| StoreError::Timeout)??)
    }

    async fn collect_bounded<F>(&self, request: F) -> Result<HttpResponse>
    where
        F: Future<Output = reqwest::Result<Response>>,
    {
        let exchange = async {
            let response = request.await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>(HttpResponse { status, body })
        };
        Ok(timeout(self.timeout, exchange)
            .await
            .map_err(|_| StoreError::Timeout)??)
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}
