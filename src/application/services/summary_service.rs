use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};

use crate::application::ports::{
    ChatMessage, LlmClient, LlmClientError, TextSplitter, TextSplitterError,
};
use crate::domain::Chunk;

use super::generation_options::GenerationOptions;

const SECTION_PROMPT: &str = "You summarize one section of a longer document. \
Write a concise summary of the section, keeping names, numbers and conclusions.";

const COMBINE_PROMPT: &str = "You are given summaries of consecutive sections of one document. \
Combine them into a single coherent summary of the whole document.";

/// Map-reduce summarization: every chunk is summarized on its own, with a
/// bounded number of requests in flight, then the partial summaries are merged.
pub struct SummaryService<L>
where
    L: LlmClient + ?Sized,
{
    llm_client: Arc<L>,
    text_splitter: Arc<dyn TextSplitter>,
    max_concurrency: usize,
    generation: GenerationOptions,
}

impl<L> SummaryService<L>
where
    L: LlmClient + ?Sized,
{
    pub fn new(
        llm_client: Arc<L>,
        text_splitter: Arc<dyn TextSplitter>,
        max_concurrency: usize,
        generation: GenerationOptions,
    ) -> Self {
        Self {
            llm_client,
            text_splitter,
            max_concurrency: max_concurrency.max(1),
            generation,
        }
    }

    #[tracing::instrument(skip(self, text), fields(characters = text.len()))]
    pub async fn summarize(&self, text: &str) -> Result<SummaryReport, SummaryError> {
        if text.trim().is_empty() {
            return Err(SummaryError::EmptyDocument);
        }

        let chunks = self.text_splitter.split(text)?;
        tracing::debug!(
            chunks = chunks.len(),
            max_concurrency = self.max_concurrency,
            "Summarizing document sections"
        );

        let sections: Vec<SectionSummary> = stream::iter(chunks)
            .map(|chunk| self.summarize_section(chunk))
            .buffered(self.max_concurrency)
            .try_collect()
            .await?;

        let summary = match sections.as_slice() {
            [only] => only.summary.clone(),
            _ => self.combine(&sections).await?,
        };

        tracing::info!(sections = sections.len(), "Document summarized");

        Ok(SummaryReport { sections, summary })
    }

    async fn summarize_section(&self, chunk: Chunk) -> Result<SectionSummary, SummaryError> {
        let request = self.generation.request(vec![
            ChatMessage::system(SECTION_PROMPT),
            ChatMessage::user(chunk.text),
        ]);

        let completion = self
            .llm_client
            .chat(&request)
            .await
            .map_err(|source| SummaryError::Section {
                index: chunk.index,
                source,
            })?;

        Ok(SectionSummary {
            index: chunk.index,
            offset: chunk.offset,
            summary: completion.content,
        })
    }

    async fn combine(&self, sections: &[SectionSummary]) -> Result<String, SummaryError> {
        let joined = sections
            .iter()
            .map(|s| format!("Section {}:\n{}", s.index + 1, s.summary))
            .collect::<Vec<_>>()
            .join("\n\n");

        let request = self.generation.request(vec![
            ChatMessage::system(COMBINE_PROMPT),
            ChatMessage::user(joined),
        ]);

        let completion = self
            .llm_client
            .chat(&request)
            .await
            .map_err(SummaryError::Combine)?;

        Ok(completion.content)
    }
}

#[derive(Debug, Clone)]
pub struct SectionSummary {
    pub index: usize,
    pub offset: usize,
    pub summary: String,
}

#[derive(Debug, Clone)]
pub struct SummaryReport {
    pub sections: Vec<SectionSummary>,
    pub summary: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("document has no text to summarize")]
    EmptyDocument,
    #[error("splitting: {0}")]
    Splitting(#[from] TextSplitterError),
    #[error("section {index}: {source}")]
    Section {
        index: usize,
        source: LlmClientError,
    },
    #[error("combine: {0}")]
    Combine(LlmClientError),
}
