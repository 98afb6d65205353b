use crate::domain::ports::Pipeline;
use crate::utils::error::EtlError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    ExtractText,
    RequestLlm,
    ParseReply,
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetch => "fetch",
            Stage::ExtractText => "parse-html",
            Stage::RequestLlm => "request-llm",
            Stage::ParseReply => "parse-reply",
            Stage::Write => "write",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub enum PipelineOutcome {
    Completed {
        output_path: String,
        records_written: usize,
        rejected_lines: usize,
    },
    Aborted {
        stage: Stage,
        reason: String,
        /// The typed failure; `None` when the stage merely produced nothing usable.
        error: Option<EtlError>,
    },
}

impl PipelineOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, PipelineOutcome::Completed { .. })
    }

    pub fn aborted_at(&self) -> Option<Stage> {
        match self {
            PipelineOutcome::Aborted { stage, .. } => Some(*stage),
            PipelineOutcome::Completed { .. } => None,
        }
    }

    fn aborted(stage: Stage, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        tracing::error!(stage = %stage, "Pipeline aborted: {}", reason);
        PipelineOutcome::Aborted {
            stage,
            reason,
            error: None,
        }
    }

    fn failed(stage: Stage, error: EtlError) -> Self {
        tracing::error!(
            stage = %stage,
            category = ?error.category(),
            severity = ?error.severity(),
            "Pipeline aborted: {}",
            error
        );
        PipelineOutcome::Aborted {
            stage,
            reason: error.to_string(),
            error: Some(error),
        }
    }
}

/// Runs the five stages in order; the first empty result ends the run.
pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> PipelineOutcome {
        tracing::info!("Fetching HTML content...");
        let html = match self.pipeline.fetch().await {
            Ok(html) => html,
            Err(e) => return PipelineOutcome::failed(Stage::Fetch, e),
        };
        tracing::info!("HTML content fetched successfully.");

        tracing::info!("Parsing HTML content...");
        let page_text = self.pipeline.extract_text(&html);
        if page_text.is_empty() {
            return PipelineOutcome::aborted(
                Stage::ExtractText,
                "page has no paragraph or infobox text",
            );
        }
        tracing::info!(
            "HTML content parsed successfully ({} paragraphs, {} infobox cells).",
            page_text.paragraphs.len(),
            page_text.infobox_cells.len()
        );

        tracing::info!("Extracting information using LLM...");
        let reply = match self.pipeline.request_extraction(&page_text.combined()).await {
            Ok(Some(reply)) => reply,
            Ok(None) => {
                return PipelineOutcome::aborted(
                    Stage::RequestLlm,
                    "Parsed LLM output is empty or invalid.",
                )
            }
            Err(e) => return PipelineOutcome::failed(Stage::RequestLlm, e),
        };
        tracing::info!("LLM output extracted successfully.");

        tracing::info!("Parsing LLM output...");
        let parsed = self.pipeline.parse_reply(&reply);
        for rejected in &parsed.rejected {
            tracing::warn!(
                line_number = rejected.line_number,
                "Skipping reply line ({}): {}",
                rejected.reason,
                rejected.line
            );
        }
        if parsed.records.is_empty() {
            return PipelineOutcome::aborted(
                Stage::ParseReply,
                format!(
                    "no records in LLM output ({} lines rejected)",
                    parsed.rejected.len()
                ),
            );
        }
        tracing::info!(
            "LLM output parsed successfully: {} records, {} lines rejected.",
            parsed.records.len(),
            parsed.rejected.len()
        );

        tracing::info!("Saving records to CSV...");
        match self.pipeline.write(&parsed.records).await {
            Ok(output_path) => {
                tracing::info!("CSV created successfully: {}", output_path);
                PipelineOutcome::Completed {
                    output_path,
                    records_written: parsed.records.len(),
                    rejected_lines: parsed.rejected.len(),
                }
            }
            Err(e) => {
                tracing::error!(
                    severity = "critical",
                    "An error occurred while saving the file: {}",
                    e
                );
                PipelineOutcome::Aborted {
                    stage: Stage::Write,
                    reason: e.to_string(),
                    error: Some(e),
                }
            }
        }
    }
}
