use crate::adapters::http::DEFAULT_SOURCE_URL;
use crate::adapters::llm::{DEFAULT_API_BASE_URL, DEFAULT_MODEL};
use crate::core::extraction::DEFAULT_SEASON_YEAR;
use crate::core::tabular::DEFAULT_OUTPUT_FILE;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Serialize, Deserialize, Parser)]
#[command(name = "hurricane-etl")]
#[command(about = "Extract storm records from a hurricane season page into CSV")]
pub struct CliConfig {
    #[arg(long, default_value = DEFAULT_SOURCE_URL)]
    pub source_url: String,

    #[arg(long, default_value = "10")]
    pub fetch_timeout_secs: u64,

    #[arg(long, default_value = ".")]
    pub output_path: String,

    #[arg(long, default_value = DEFAULT_OUTPUT_FILE)]
    pub output_file: String,

    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    #[arg(long, default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    #[arg(long, help = "Timeout for the extraction request (none by default)")]
    pub llm_timeout_secs: Option<u64>,

    #[arg(long, default_value_t = DEFAULT_SEASON_YEAR)]
    pub season_year: u16,

    #[arg(long, help = "Read settings from a TOML file instead of flags")]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

impl std::fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliConfig")
            .field("source_url", &self.source_url)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("output_path", &self.output_path)
            .field("output_file", &self.output_file)
            .field("model", &self.model)
            .field("api_base_url", &self.api_base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("llm_timeout_secs", &self.llm_timeout_secs)
            .field("season_year", &self.season_year)
            .field("config", &self.config)
            .finish()
    }
}

impl ConfigProvider for CliConfig {
    fn source_url(&self) -> &str {
        &self.source_url
    }

    fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_file(&self) -> &str {
        &self.output_file
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    fn llm_timeout(&self) -> Option<Duration> {
        self.llm_timeout_secs.map(Duration::from_secs)
    }

    fn season_year(&self) -> u16 {
        self.season_year
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("source_url", &self.source_url)?;
        validation::validate_url("api_base_url", &self.api_base_url)?;
        validation::validate_range("fetch_timeout_secs", self.fetch_timeout_secs, 1, 300)?;
        if let Some(timeout) = self.llm_timeout_secs {
            validation::validate_range("llm_timeout_secs", timeout, 1, 3600)?;
        }
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_file_extensions("output_file", &[self.output_file.as_str()], &["csv"])?;
        validation::validate_non_empty_string("model", &self.model)?;
        validation::validate_range("season_year", self.season_year, 1900, 2100)?;

        let api_key = validation::validate_required_field("api_key", &self.api_key)?;
        validation::validate_non_empty_string("api_key", api_key)
    }
}
