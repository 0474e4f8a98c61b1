//! Storage service client with request/response handling.

use std::io::Write;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderMap, CONTENT_DISPOSITION};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::debug;

use super::outcome::Outcome;
use crate::config::ClientConfig;
use crate::error::{Result, StoreError};
use crate::fs::{Entry, EntryKind, Listing, PendingFile};
use crate::http::HttpClient;
use crate::path::Location;
use crate::progress::{DownloadProgress, ProgressCallback};

/// Default base URL of the storage HTTP adapter.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080/api";

/// Remote operations the browser depends on.
///
/// Mutating calls never fail at the type level: every response, including a
/// transport error, is folded into an [`Outcome`].
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Fetch the entries of a location.
    async fn list(&self, location: &Location) -> Result<Listing>;

    /// Create a directory at the given full path.
    async fn create_directory(&self, path: &Location) -> Outcome;

    /// Remove a file or an empty directory.
    async fn remove_entry(&self, path: &Location) -> Outcome;

    /// Store a file at the given full path.
    async fn upload_file(&self, path: &Location, file: &PendingFile) -> Outcome;
}

#[derive(Serialize)]
struct PathRequest<'a> {
    path: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct ListResponse {
    #[serde(default)]
    dirs: Option<Vec<WireEntry>>,
    #[serde(default)]
    files: Option<Vec<WireEntry>>,
}

#[derive(Debug, Deserialize)]
struct WireEntry {
    name: String,
    path: String,
}

impl ListResponse {
    fn into_listing(self, location: &Location) -> Result<Listing> {
        Ok(Listing {
            location: location.clone(),
            directories: convert(self.dirs, EntryKind::Directory)?,
            files: convert(self.files, EntryKind::File)?,
        })
    }
}

fn convert(entries: Option<Vec<WireEntry>>, kind: EntryKind) -> Result<Vec<Entry>> {
    entries
        .unwrap_or_default()
        .into_iter()
        .map(|e| {
            let path = Location::parse(&e.path).map_err(|_| StoreError::InvalidResponse)?;
            Ok(Entry {
                name: e.name,
                path,
                kind,
            })
        })
        .collect()
}

/// Parse a listing body. Missing or null `dirs`/`files` mean empty.
pub(crate) fn parse_listing(body: &str, location: &Location) -> Result<Listing> {
    let response: ListResponse = serde_json::from_str(body)?;
    response.into_listing(location)
}

/// A completed download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// File name announced by the server, or the path's leaf name
    pub file_name: String,
    /// Bytes written
    pub size: u64,
}

/// HTTP implementation of [`StorageService`].
#[derive(Debug, Clone)]
pub struct StorageClient {
    http: HttpClient,
    base_url: String,
}

impl StorageClient {
    /// Create a client against a base URL such as `http://host:8080/api`.
    pub fn new(base_url: &str) -> Self {
        Self::with_http(base_url, HttpClient::new())
    }

    /// Create a client with a preconfigured HTTP client.
    pub fn with_http(base_url: &str, http: HttpClient) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build a client from configuration (proxy and timeout included).
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let http = match &config.proxy {
            Some(proxy) => HttpClient::with_proxy(proxy)?,
            None => HttpClient::new(),
        };
        Ok(Self::with_http(
            &config.api_url,
            http.with_timeout(config.timeout),
        ))
    }

    /// Base URL requests are issued against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}/", self.base_url, name)
    }

    async fn post_path(&self, action: &str, path: &Location) -> Result<(u16, String)> {
        let url = self.endpoint(action);
        let body = serde_json::to_string(&PathRequest {
            path: path.as_str(),
        })?;
        debug!(action, path = %path, url = %url, "api request");

        let response = self.http.post_json(&url, &body).await?;
        debug!(
            action,
            status = response.status,
            bytes = response.body.len(),
            "api response"
        );
        Ok((response.status, response.body))
    }

    async fn mutate(&self, action: &str, path: &Location) -> Outcome {
        match self.post_path(action, path).await {
            Ok((status, body)) => Outcome::from_response(status, &body),
            Err(e) => {
                debug!(action, path = %path, error = %e, "api request failed");
                Outcome::from_error(&e)
            }
        }
    }

    /// Stream a file into a writer.
    ///
    /// Each body read must make progress within the client timeout. The
    /// progress callback may return `false` to abort the transfer; it is
    /// called once more with `finished` set after the body is flushed.
    pub async fn download_file<W: Write + ?Sized>(
        &self,
        path: &Location,
        writer: &mut W,
        mut progress: Option<&mut ProgressCallback>,
    ) -> Result<Download> {
        let url = self.endpoint("download");
        debug!(action = "download", path = %path, url = %url, "api request");

        let response = self.http.get(&url, &[("path", path.as_str())]).await?;
        let file_name = content_disposition_filename(response.headers())
            .unwrap_or_else(|| path.name().to_string());
        let expected = response
            .content_length()
            .or_else(|| announced_length(response.headers()));

        let idle = self.http.timeout();
        let mut stream = response.bytes_stream();
        let mut done = 0u64;
        while let Some(chunk) = timeout(idle, stream.next())
            .await
            .map_err(|_| StoreError::Timeout)?
        {
            let chunk = chunk?;
            writer.write_all(&chunk)?;
            done += chunk.len() as u64;

            if let Some(cb) = progress.as_deref_mut() {
                if !cb(&DownloadProgress::new(file_name.as_str(), done, expected)) {
                    return Err(StoreError::Custom("Download cancelled".to_string()));
                }
            }
        }
        writer.flush()?;

        if let Some(cb) = progress.as_deref_mut() {
            let mut last = DownloadProgress::new(file_name.as_str(), done, expected);
            last.finished = true;
            cb(&last);
        }

        debug!(action = "download", path = %path, bytes = done, "api response");
        Ok(Download {
            file_name,
            size: done,
        })
    }
}

#[async_trait]
impl StorageService for StorageClient {
    async fn list(&self, location: &Location) -> Result<Listing> {
        let (status, body) = self.post_path("readdir", location).await?;
        if status != super::outcome::STATUS_OK {
            return Err(StoreError::HttpError(status));
        }
        parse_listing(&body, location)
    }

    async fn create_directory(&self, path: &Location) -> Outcome {
        self.mutate("mkdir", path).await
    }

    async fn remove_entry(&self, path: &Location) -> Outcome {
        self.mutate("remove", path).await
    }

    async fn upload_file(&self, path: &Location, file: &PendingFile) -> Outcome {
        let url = self.endpoint("upload");
        debug!(action = "upload", path = %path, size = file.size(), url = %url, "api request");

        let part = Part::bytes(file.data.clone()).file_name(file.name.clone());
        let form = Form::new().part("file", part);

        match self
            .http
            .post_multipart(&url, &[("path", path.as_str())], form)
            .await
        {
            Ok(response) => {
                debug!(action = "upload", status = response.status, "api response");
                Outcome::from_response(response.status, &response.body)
            }
            Err(e) => {
                debug!(action = "upload", path = %path, error = %e, "api request failed");
                Outcome::from_error(&e)
            }
        }
    }
}

/// Extract `filename=` from a `Content-Disposition: attachment` header.
pub(crate) fn content_disposition_filename(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(CONTENT_DISPOSITION)?.to_str().ok()?;
    parse_disposition(value)
}

fn parse_disposition(value: &str) -> Option<String> {
    value
        .split(';')
        .map(str::trim)
        .find_map(|param| param.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}

// The adapter reports the size in a non-standard header when streaming.
fn announced_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get("Accept-Length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}
