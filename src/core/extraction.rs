use crate::adapters::llm::{ChatRequest, LlmError, Message, TextGenerator};

pub const DEFAULT_SEASON_YEAR: u16 = 1975;

const SYSTEM_PROMPT: &str = "You are an assistant for extracting hurricane data.";

/// Sends the scraped season text to the model and returns its free-text reply.
pub struct ExtractionRequester<G: TextGenerator> {
    generator: G,
    season_year: u16,
}

impl<G: TextGenerator> ExtractionRequester<G> {
    pub fn new(generator: G, season_year: u16) -> Self {
        Self {
            generator,
            season_year,
        }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn task_instruction(&self, text: &str) -> String {
        let year = self.season_year;
        format!(
            "Extract details of tropical storms and hurricanes from the {year} Pacific hurricane season, \
             including their names, start dates, end dates, number of deaths, and a list of areas affected \
             from the following text: {text}. Format the output in a structured way like this: \
             'Name: [Tropical Storm or Hurricane name or Unnamed Hurricane], Start: [Month day], End: [Month day], \
             Deaths: [number], Affected Areas: [list of areas such as 'Acapulco', 'Socorro Island', 'Pacific Ocean']'. \
             If no area is mentioned, record 'Pacific Ocean'. Do not include data for Tropical Depressions. \
             For dates, omit the year {year}."
        )
    }

    /// Two-message exchange with sampling pinned to deterministic output.
    pub fn build_request(&self, text: &str) -> ChatRequest {
        ChatRequest::new(self.generator.model())
            .temperature(0.0)
            .message(Message::system(SYSTEM_PROMPT))
            .message(Message::user(self.task_instruction(text)))
    }

    /// Single attempt. A blank reply is `Ok(None)`; service failures keep their [`LlmError`] kind.
    pub async fn try_request(&self, text: &str) -> Result<Option<String>, LlmError> {
        let request = self.build_request(text);
        tracing::debug!(
            "Requesting extraction from {} ({} chars of page text)",
            request.model,
            text.len()
        );

        match self.generator.complete(request).await {
            Ok(reply) if reply.trim().is_empty() => {
                tracing::error!("LLM returned an empty reply");
                Ok(None)
            }
            Ok(reply) => {
                tracing::info!("LLM Output: {}", reply);
                Ok(Some(reply))
            }
            Err(e) => {
                tracing::error!(
                    kind = e.kind(),
                    retryable = e.is_retryable(),
                    "Error during LLM processing: {}",
                    e
                );
                Err(e)
            }
        }
    }

    /// Failures and blank replies are logged and come back as `None`.
    pub async fn request(&self, text: &str) -> Option<String> {
        self.try_request(text).await.ok().flatten()
    }
}
