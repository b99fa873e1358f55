mod environment;
mod scaffold_config;
mod settings;

pub use environment::{Environment, UnknownEnvironment};
pub use scaffold_config::{ScaffoldConfig, is_truthy};
pub use settings::{
    ExtractionSettings, LlmSettings, PromptSettings, RetrySettings, ServerSettings, SessionSettings,
    Settings, SummarySettings,
};
