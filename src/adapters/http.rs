use crate::utils::error::{EtlError, Result};
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_SOURCE_URL: &str = "https://en.wikipedia.org/wiki/1975_Pacific_hurricane_season";
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!(
    "hurricane-etl/",
    env!("CARGO_PKG_VERSION"),
    " (season page extractor)"
);

/// Downloads the season page with a bounded timeout.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    timeout: Duration,
}

impl PageFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// 取得頁面原始內容，非 2xx 視為失敗；失敗時記錄錯誤
    pub async fn try_fetch(&self, url: &str) -> Result<Vec<u8>> {
        match self.send(url).await {
            Ok(body) => {
                tracing::info!("Fetched {} bytes from {}", body.len(), url);
                Ok(body)
            }
            Err(e) => {
                match &e {
                    EtlError::Timeout { url, timeout_secs } => tracing::error!(
                        "Error: The request to {} timed out after {}s.",
                        url,
                        timeout_secs
                    ),
                    _ => tracing::error!(
                        "Error: Failed to retrieve page from {} with ERROR: {}",
                        url,
                        e
                    ),
                }
                Err(e)
            }
        }
    }

    /// Single attempt; every failure is logged and mapped to `None`.
    pub async fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        self.try_fetch(url).await.ok()
    }

    async fn send(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!("Sending GET request to: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(url, e))?;

        let status = response.status();
        tracing::debug!("Page response status: {}", status);

        if !status.is_success() {
            return Err(EtlError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| self.classify(url, e))?;
        Ok(body.to_vec())
    }

    fn classify(&self, url: &str, error: reqwest::Error) -> EtlError {
        if error.is_timeout() {
            EtlError::Timeout {
                url: url.to_string(),
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            EtlError::ApiError(error)
        }
    }
}
