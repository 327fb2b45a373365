use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::info;
use url::Url;

use crate::error::FetchError;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Newest additions first, first page only.
pub fn search_url(base: &Url, keywords: &str) -> String {
    format!(
        "{}/browse.php?keywords={}&page=1&sort=4a",
        base.as_str().trim_end_matches('/'),
        keywords
    )
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let start = Instant::now();
        let request_err = |source| FetchError::Request {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(request_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(request_err)?;
        info!(
            url,
            bytes = body.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "fetched listing page"
        );
        Ok(body)
    }
}
