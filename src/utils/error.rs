use crate::adapters::llm::LlmError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    #[error("Unexpected HTTP status {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Text generation failed: {0}")]
    LlmError(#[from] LlmError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration value: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    TextGeneration,
    Configuration,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ApiError(_) | EtlError::Timeout { .. } | EtlError::HttpStatus { .. } => {
                ErrorCategory::Network
            }
            EtlError::LlmError(_) => ErrorCategory::TextGeneration,
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            EtlError::CsvError(_) | EtlError::IoError(_) => ErrorCategory::Output,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::TextGeneration => match self {
                EtlError::LlmError(e) if e.is_retryable() => ErrorSeverity::Medium,
                _ => ErrorSeverity::High,
            },
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::Timeout { .. } => "Check network connectivity or raise --fetch-timeout-secs",
            EtlError::HttpStatus { .. } => "Verify the source URL still points to an existing page",
            EtlError::ApiError(_) => "Check network connectivity and proxy settings",
            EtlError::LlmError(LlmError::Authentication(_)) | EtlError::LlmError(LlmError::Config(_)) => {
                "Set a valid API key via --api-key or OPENAI_API_KEY"
            }
            EtlError::LlmError(e) if e.is_retryable() => "The service is busy, try again later",
            EtlError::LlmError(_) => "Check the model name and API base URL",
            EtlError::CsvError(_) | EtlError::IoError(_) => {
                "Check that the output directory exists and is writable"
            }
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. } => "Review the command-line flags or TOML file",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not download the season page: {}", self),
            ErrorCategory::TextGeneration => format!("The extraction service failed: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Output => format!("Could not write the output file: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_failures_are_critical() {
        let err = EtlError::IoError(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only",
        ));
        assert_eq!(err.category(), ErrorCategory::Output);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_llm_error_severity_follows_retryability() {
        let busy = EtlError::from(LlmError::Api {
            status: 429,
            message: "rate limited".to_string(),
        });
        assert_eq!(busy.severity(), ErrorSeverity::Medium);

        let auth = EtlError::from(LlmError::Authentication("bad key".to_string()));
        assert_eq!(auth.severity(), ErrorSeverity::High);
        assert!(auth.recovery_suggestion().contains("API key"));
    }

    #[test]
    fn test_timeout_message_names_url() {
        let err = EtlError::Timeout {
            url: "https://example.com".to_string(),
            timeout_secs: 10,
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert!(err.to_string().contains("https://example.com"));
        assert!(err.user_friendly_message().starts_with("Could not download"));
    }
}
