mod chat_service;
mod generation_options;
mod prompt_assembler;
mod rouge;
mod summary_service;
mod token_counter;

pub use chat_service::{ChatAnswer, ChatError, ChatService, DocumentSummary};
pub use generation_options::GenerationOptions;
pub use prompt_assembler::{
    AssembledPrompt, BudgetUnit, ContextBudget, PromptAssembler, PromptError, TRUNCATION_MARKER,
    truncate_to_budget,
};
pub use rouge::{RougeReport, RougeScore, evaluate, rouge_l, rouge_n};
pub use summary_service::{SectionSummary, SummaryError, SummaryReport, SummaryService};
pub use token_counter::{count_tokens, fit_token_prefix};
