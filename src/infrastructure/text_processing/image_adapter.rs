use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use reqwest::Client;
use serde::Deserialize;

use crate::application::ports::{FileLoader, FileLoaderError};
use crate::domain::{ContentType, Document};

use super::text_sanitizer::sanitize_extracted_text;

const VISION_TIMEOUT: Duration = Duration::from_secs(120);

const TRANSCRIBE_PROMPT: &str = "Transcribe all text visible in this image, preserving reading \
order and paragraph breaks. If the image contains a chart or table, describe its contents in \
plain sentences. Reply with the text only, without commentary.";

/// Reads text out of an image with a vision-capable chat model.
pub struct ImageAdapter {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Deserialize)]
struct VisionCompletion {
    choices: Vec<VisionChoice>,
}

#[derive(Deserialize)]
struct VisionChoice {
    message: VisionMessage,
}

#[derive(Deserialize)]
struct VisionMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ImageAdapter {
    pub fn new(base_url: &str, model: &str, api_key: &str) -> Self {
        let client = Client::builder()
            .timeout(VISION_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

fn sniff_image_mime(data: &[u8]) -> &'static str {
    if data.starts_with(b"\x89PNG") {
        "image/png"
    } else if data.starts_with(b"\xFF\xD8") {
        "image/jpeg"
    } else if data.len() > 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        "image/webp"
    } else {
        "application/octet-stream"
    }
}

#[async_trait]
impl FileLoader for ImageAdapter {
    #[tracing::instrument(
        skip(self, data),
        fields(document_id = %document.id.as_uuid(), filename = %document.filename)
    )]
    async fn extract_text(
        &self,
        data: &[u8],
        document: &Document,
    ) -> Result<String, FileLoaderError> {
        if document.content_type != ContentType::Image {
            return Err(FileLoaderError::UnsupportedContentType(
                document.content_type.as_mime().to_string(),
            ));
        }

        let mime = sniff_image_mime(data);
        if mime == "application/octet-stream" {
            return Err(FileLoaderError::UnsupportedContentType(
                "unrecognized image encoding".to_string(),
            ));
        }

        let data_uri = format!("data:{mime};base64,{}", general_purpose::STANDARD.encode(data));
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": TRANSCRIBE_PROMPT },
                        { "type": "image_url", "image_url": { "url": data_uri } }
                    ]
                }
            ],
            "temperature": 0.0,
            "stream": false
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| FileLoaderError::ExtractionFailed(format!("vision request: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(FileLoaderError::ExtractionFailed(format!(
                "vision model returned {status}: {text}"
            )));
        }

        let completion: VisionCompletion = response
            .json()
            .await
            .map_err(|e| FileLoaderError::ExtractionFailed(format!("vision response: {e}")))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        let text = sanitize_extracted_text(&content);
        tracing::info!(characters = text.len(), "Image transcription complete");

        if text.is_empty() {
            return Err(FileLoaderError::NoTextFound(document.filename.clone()));
        }

        Ok(text)
    }
}
