use crate::adapters::http::PageFetcher;
use crate::adapters::llm::{ChatClient, LlmSettings, TextGenerator};
use crate::adapters::storage::LocalStorage;
use crate::core::extraction::ExtractionRequester;
use crate::core::{markup, reply_parser, tabular};
use crate::domain::model::{HurricaneRecord, PageText, ParsedReply};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::utils::error::{EtlError, Result};

/// Season page → model reply → CSV, wired from a [`ConfigProvider`].
pub struct HurricanePipeline<S: Storage, G: TextGenerator> {
    storage: S,
    fetcher: PageFetcher,
    requester: ExtractionRequester<G>,
    source_url: String,
    output_file: String,
}

impl<S: Storage, G: TextGenerator> HurricanePipeline<S, G> {
    pub fn new<C: ConfigProvider>(storage: S, generator: G, config: &C) -> Result<Self> {
        Ok(Self {
            storage,
            fetcher: PageFetcher::new(config.fetch_timeout())?,
            requester: ExtractionRequester::new(generator, config.season_year()),
            source_url: config.source_url().to_string(),
            output_file: config.output_file().to_string(),
        })
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn output_file(&self) -> &str {
        &self.output_file
    }
}

impl HurricanePipeline<LocalStorage, ChatClient> {
    /// Local filesystem output and the OpenAI-compatible client, both taken from `config`.
    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let api_key = config
            .api_key()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| EtlError::MissingConfigError {
                field: "api_key".to_string(),
            })?;

        let settings = LlmSettings::new(api_key)
            .with_base_url(config.api_base_url())
            .with_model(config.model())
            .with_timeout(config.llm_timeout());
        let client = ChatClient::new(settings)?;
        let storage = LocalStorage::new(config.output_path().to_string());

        Self::new(storage, client, config)
    }
}

#[async_trait::async_trait]
impl<S: Storage, G: TextGenerator> Pipeline for HurricanePipeline<S, G> {
    async fn fetch(&self) -> Result<Vec<u8>> {
        self.fetcher.try_fetch(&self.source_url).await
    }

    fn extract_text(&self, html: &[u8]) -> PageText {
        markup::extract_page_text(html)
    }

    async fn request_extraction(&self, text: &str) -> Result<Option<String>> {
        Ok(self.requester.try_request(text).await?)
    }

    fn parse_reply(&self, reply: &str) -> ParsedReply {
        reply_parser::parse_reply(reply)
    }

    async fn write(&self, records: &[HurricaneRecord]) -> Result<String> {
        tabular::write_records(&self.storage, &self.output_file, records).await
    }
}
