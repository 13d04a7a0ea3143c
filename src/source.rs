use std::collections::HashMap;
use std::future::Future;

use log::debug;
use reqwest::{Client, StatusCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: StatusCode },
    #[error("no page stored for {0}")]
    Missing(String),
}

/// Where schedule pages come from.
pub trait ScheduleSource {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Fetches pages over HTTP. No retries and no timeout beyond reqwest's.
#[derive(Debug, Clone, Default)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScheduleSource for HttpSource {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        debug!("GET {url}");

        let request_error = |source: reqwest::Error| FetchError::Request {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        response.text().await.map_err(request_error)
    }
}

/// Serves pages from memory, keyed by URL.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    pages: HashMap<String, String>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<U: Into<String>, H: Into<String>>(&mut self, url: U, html: H) {
        self.pages.insert(url.into(), html.into());
    }

    #[must_use]
    pub fn with_page<U: Into<String>, H: Into<String>>(mut self, url: U, html: H) -> Self {
        self.insert(url, html);
        self
    }
}

impl ScheduleSource for StaticSource {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Missing(url.to_string()))
    }
}
