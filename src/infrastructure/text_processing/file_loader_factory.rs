use std::sync::Arc;
use std::time::Duration;

use crate::domain::ContentType;
use crate::infrastructure::audio::OpenAiWhisperEngine;
use crate::presentation::config::{ExtractionSettings, LlmSettings};

use super::{AudioAdapter, CompositeFileLoader, ImageAdapter, PdfAdapter, PlainTextAdapter};

/// PDF and plain text are always supported. Image and audio loaders talk to
/// the configured LLM provider and are only registered when a model is set.
pub fn create_file_loader(
    extraction: &ExtractionSettings,
    llm: &LlmSettings,
) -> CompositeFileLoader {
    let mut loader = CompositeFileLoader::new()
        .with_loader(
            ContentType::Pdf,
            Arc::new(PdfAdapter::with_timeout(Duration::from_secs(
                extraction.pdf_timeout_secs,
            ))),
        )
        .with_loader(ContentType::Text, Arc::new(PlainTextAdapter));

    let base_url = llm.resolved_base_url();

    match (&extraction.vision_model, &base_url) {
        (Some(model), Some(base_url)) => {
            tracing::info!(model = %model, "Image extraction enabled");
            loader = loader.with_loader(
                ContentType::Image,
                Arc::new(ImageAdapter::new(base_url, model, &llm.api_key)),
            );
        }
        (Some(_), None) => tracing::warn!("vision_model set but no base_url; images disabled"),
        _ => {}
    }

    match (&extraction.transcription_model, &base_url) {
        (Some(model), Some(base_url)) => {
            tracing::info!(model = %model, "Audio extraction enabled");
            let engine =
                OpenAiWhisperEngine::new(llm.api_key.clone(), base_url.clone(), model.clone());
            loader = loader.with_loader(
                ContentType::Audio,
                Arc::new(AudioAdapter::new(Arc::new(engine))),
            );
        }
        (Some(_), None) => {
            tracing::warn!("transcription_model set but no base_url; audio disabled")
        }
        _ => {}
    }

    loader
}
