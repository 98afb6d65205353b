use crate::domain::model::{HurricaneRecord, PageText, ParsedReply};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Human-readable location of `path`, used in logs and the run report.
    fn location(&self, path: &str) -> String {
        path.to_string()
    }
}

pub trait ConfigProvider: Send + Sync {
    fn source_url(&self) -> &str;
    fn fetch_timeout(&self) -> Duration;
    fn output_path(&self) -> &str;
    fn output_file(&self) -> &str;
    fn model(&self) -> &str;
    fn api_base_url(&self) -> &str;
    fn api_key(&self) -> Option<&str>;
    fn llm_timeout(&self) -> Option<Duration>;
    fn season_year(&self) -> u16;
}

/// The five stages of one run, in execution order.
///
/// `request_extraction` yields `Ok(None)` when the service answered with nothing usable.
#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn fetch(&self) -> Result<Vec<u8>>;
    fn extract_text(&self, html: &[u8]) -> PageText;
    async fn request_extraction(&self, text: &str) -> Result<Option<String>>;
    fn parse_reply(&self, reply: &str) -> ParsedReply;
    async fn write(&self, records: &[HurricaneRecord]) -> Result<String>;
}
