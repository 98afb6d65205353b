pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::llm::{ChatClient, LlmError, LlmSettings, TextGenerator};
pub use adapters::storage::LocalStorage;
pub use core::{
    etl::{EtlEngine, PipelineOutcome, Stage},
    pipeline::HurricanePipeline,
};
pub use domain::model::{HurricaneRecord, ParsedReply};
pub use utils::error::{EtlError, Result};
