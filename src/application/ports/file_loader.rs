use std::time::Duration;

use async_trait::async_trait;

use crate::domain::Document;

/// Turns an uploaded file into plain text the prompt can carry.
///
/// Implementations reject content types they do not handle with
/// [`FileLoaderError::UnsupportedContentType`] so a dispatcher can tell a
/// routing mistake apart from a broken file.
#[async_trait]
pub trait FileLoader: Send + Sync {
    async fn extract_text(
        &self,
        data: &[u8],
        document: &Document,
    ) -> Result<String, FileLoaderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum FileLoaderError {
    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),
    #[error("extraction failed: {0}")]
    ExtractionFailed(String),
    #[error("extraction of {filename} timed out after {}s", .after.as_secs())]
    TimedOut { filename: String, after: Duration },
    /// The file parsed but yielded nothing but whitespace, e.g. a scanned PDF.
    #[error("no text found in {0}")]
    NoTextFound(String),
}
