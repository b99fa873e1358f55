use std::sync::Arc;

use crate::application::ports::LlmClient;
use crate::application::services::{ChatService, SummaryService};

pub struct AppState<L>
where
    L: LlmClient + ?Sized,
{
    pub chat_service: Arc<ChatService<L>>,
    pub summary_service: Arc<SummaryService<L>>,
    pub max_upload_bytes: usize,
}

impl<L> Clone for AppState<L>
where
    L: LlmClient + ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            chat_service: Arc::clone(&self.chat_service),
            summary_service: Arc::clone(&self.summary_service),
            max_upload_bytes: self.max_upload_bytes,
        }
    }
}
