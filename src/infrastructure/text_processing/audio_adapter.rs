use std::sync::Arc;

use async_trait::async_trait;

use crate::application::ports::{FileLoader, FileLoaderError, TranscriptionEngine};
use crate::domain::{ContentType, Document};

use super::text_sanitizer::sanitize_extracted_text;

/// Turns an audio upload into text through a transcription engine.
pub struct AudioAdapter {
    engine: Arc<dyn TranscriptionEngine>,
}

impl AudioAdapter {
    pub fn new(engine: Arc<dyn TranscriptionEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl FileLoader for AudioAdapter {
    async fn extract_text(
        &self,
        data: &[u8],
        document: &Document,
    ) -> Result<String, FileLoaderError> {
        if document.content_type != ContentType::Audio {
            return Err(FileLoaderError::UnsupportedContentType(
                document.content_type.as_mime().to_string(),
            ));
        }

        let transcript = self
            .engine
            .transcribe(data, &document.filename)
            .await
            .map_err(|e| FileLoaderError::ExtractionFailed(e.to_string()))?;

        let text = sanitize_extracted_text(&transcript);
        if text.is_empty() {
            return Err(FileLoaderError::NoTextFound(document.filename.clone()));
        }

        Ok(text)
    }
}
