pub mod etl;
pub mod extraction;
pub mod markup;
pub mod pipeline;
pub mod reply_parser;
pub mod tabular;

pub use crate::domain::model::{HurricaneRecord, PageText, ParsedReply};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
