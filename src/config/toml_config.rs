use crate::adapters::http::DEFAULT_SOURCE_URL;
use crate::adapters::llm::{DEFAULT_API_BASE_URL, DEFAULT_MODEL};
use crate::core::extraction::DEFAULT_SEASON_YEAR;
use crate::core::tabular::DEFAULT_OUTPUT_FILE;
use crate::core::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub pipeline: Option<PipelineConfig>,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub load: LoadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub url: String,
    pub timeout_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub api_base_url: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub season_year: u16,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_key: None,
            timeout_seconds: None,
            season_year: DEFAULT_SEASON_YEAR,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_file: String,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            output_path: ".".to_string(),
            output_file: DEFAULT_OUTPUT_FILE.to_string(),
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OPENAI_API_KEY})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Use `api_key` when the file does not provide a usable key.
    pub fn with_api_key_fallback(mut self, api_key: Option<String>) -> Self {
        if self.resolved_api_key().is_none() {
            self.llm.api_key = api_key;
        }
        self
    }

    fn resolved_api_key(&self) -> Option<&str> {
        self.llm
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty() && !key.starts_with("${"))
    }

    pub fn pipeline_name(&self) -> &str {
        self.pipeline
            .as_ref()
            .map(|p| p.name.as_str())
            .unwrap_or("hurricane-etl")
    }
}

impl ConfigProvider for TomlConfig {
    fn source_url(&self) -> &str {
        &self.source.url
    }

    fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_seconds)
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_file(&self) -> &str {
        &self.load.output_file
    }

    fn model(&self) -> &str {
        &self.llm.model
    }

    fn api_base_url(&self) -> &str {
        &self.llm.api_base_url
    }

    fn api_key(&self) -> Option<&str> {
        self.resolved_api_key()
    }

    fn llm_timeout(&self) -> Option<Duration> {
        self.llm.timeout_seconds.map(Duration::from_secs)
    }

    fn season_year(&self) -> u16 {
        self.llm.season_year
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("source.url", &self.source.url)?;
        validation::validate_range("source.timeout_seconds", self.source.timeout_seconds, 1, 300)?;
        validation::validate_url("llm.api_base_url", &self.llm.api_base_url)?;
        validation::validate_non_empty_string("llm.model", &self.llm.model)?;
        if let Some(timeout) = self.llm.timeout_seconds {
            validation::validate_range("llm.timeout_seconds", timeout, 1, 3600)?;
        }
        validation::validate_range("llm.season_year", self.llm.season_year, 1900, 2100)?;
        validation::validate_path("load.output_path", &self.load.output_path)?;
        validation::validate_file_extensions(
            "load.output_file",
            &[self.load.output_file.as_str()],
            &["csv"],
        )?;

        if self.resolved_api_key().is_none() {
            return Err(EtlError::MissingConfigError {
                field: "llm.api_key".to_string(),
            });
        }

        Ok(())
    }
}
