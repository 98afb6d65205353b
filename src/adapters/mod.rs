// Adapters layer: concrete implementations for external systems (http page source,
// chat completions service, local storage).

pub mod http;
pub mod llm;
pub mod storage;
