mod file_loader;
mod llm_client;
mod repository_error;
mod session_repository;
mod text_splitter;
mod transcription_engine;

pub use file_loader::{FileLoader, FileLoaderError};
pub use llm_client::{
    ChatCompletion, ChatMessage, ChatRequest, LlmClient, LlmClientError, TokenUsage,
};
pub use repository_error::RepositoryError;
pub use session_repository::SessionRepository;
pub use text_splitter::{TextSplitter, TextSplitterError};
pub use transcription_engine::{TranscriptionEngine, TranscriptionError};
