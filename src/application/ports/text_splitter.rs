use crate::domain::Chunk;

pub trait TextSplitter: Send + Sync {
    fn split(&self, text: &str) -> Result<Vec<Chunk>, TextSplitterError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TextSplitterError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}
