use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;

use crate::application::ports::{TranscriptionEngine, TranscriptionError};
use crate::domain::ContentType;

/// Client for the `/audio/transcriptions` endpoint that OpenAI, Groq and most
/// self-hosted Whisper servers expose.
pub struct OpenAiWhisperEngine {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

impl OpenAiWhisperEngine {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    fn file_part(audio_data: &[u8], filename: &str) -> Result<multipart::Part, TranscriptionError> {
        // Providers sniff the format from the part's name and type, not the bytes.
        let mime = match filename.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()) {
            Some(ext) if ext == "wav" => "audio/wav",
            Some(ext) if ext == "m4a" => "audio/mp4",
            Some(ext) if ext == "ogg" => "audio/ogg",
            Some(ext) if ext == "flac" => "audio/flac",
            Some(ext) if ext == "webm" => "audio/webm",
            _ => ContentType::Audio.as_mime(),
        };

        multipart::Part::bytes(audio_data.to_vec())
            .file_name(filename.to_string())
            .mime_str(mime)
            .map_err(|e| TranscriptionError::ApiRequestFailed(format!("invalid mime {mime}: {e}")))
    }
}

#[async_trait]
impl TranscriptionEngine for OpenAiWhisperEngine {
    #[tracing::instrument(
        skip(self, audio_data),
        fields(model = %self.model, bytes = audio_data.len())
    )]
    async fn transcribe(
        &self,
        audio_data: &[u8],
        filename: &str,
    ) -> Result<String, TranscriptionError> {
        let form = multipart::Form::new()
            .text("model", self.model.clone())
            .text("response_format", "json")
            .part("file", Self::file_part(audio_data, filename)?);

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TranscriptionError::ApiRequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranscriptionError::ApiRequestFailed(format!(
                "HTTP {status}: {body}"
            )));
        }

        let transcript: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| {
                TranscriptionError::TranscriptionFailed(format!("malformed response: {e}"))
            })?;

        tracing::info!(chars = transcript.text.len(), "Audio transcribed");

        Ok(transcript.text.trim().to_string())
    }
}
