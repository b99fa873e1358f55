use serde::Deserialize;

use crate::application::ports::ChatMessage;
use crate::domain::{Message, MessageRole};

use super::token_counter::{count_tokens, fit_token_prefix};

/// Appended to document text that was cut to fit the budget.
pub const TRUNCATION_MARKER: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetUnit {
    Chars,
    Tokens,
}

/// Upper bound on the size of everything sent to the model, in a single unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextBudget {
    pub unit: BudgetUnit,
    pub limit: usize,
}

impl ContextBudget {
    pub fn new(unit: BudgetUnit, limit: usize) -> Self {
        Self { unit, limit }
    }

    pub fn chars(limit: usize) -> Self {
        Self::new(BudgetUnit::Chars, limit)
    }

    pub fn tokens(limit: usize) -> Self {
        Self::new(BudgetUnit::Tokens, limit)
    }

    pub fn measure(&self, text: &str) -> usize {
        match self.unit {
            BudgetUnit::Chars => text.chars().count(),
            BudgetUnit::Tokens => count_tokens(text),
        }
    }

    /// Largest prefix of `text`, cut on a char boundary, that measures at most `allowance`.
    pub fn fit_prefix<'a>(&self, text: &'a str, allowance: usize) -> &'a str {
        match self.unit {
            BudgetUnit::Chars => match text.char_indices().nth(allowance) {
                Some((byte_index, _)) => &text[..byte_index],
                None => text,
            },
            BudgetUnit::Tokens => fit_token_prefix(text, allowance),
        }
    }
}

/// Returns the largest prefix within the budget and whether anything was cut.
pub fn truncate_to_budget<'a>(text: &'a str, budget: &ContextBudget) -> (&'a str, bool) {
    let prefix = budget.fit_prefix(text, budget.limit);
    (prefix, prefix.len() < text.len())
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssembledPrompt {
    pub messages: Vec<ChatMessage>,
    pub document_truncated: bool,
    pub history_dropped: usize,
    /// Total size of all message contents, in the budget's unit.
    pub used: usize,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PromptError {
    #[error("question is empty")]
    EmptyQuestion,
    #[error("prompt needs {required} units but the budget is {limit}")]
    BudgetExceeded { required: usize, limit: usize },
}

/// Builds a bounded chat prompt from a system prompt, recent history, the
/// document text and the user's question.
///
/// The system prompt and the question are never cut. History may take at
/// most half of what is left after them, dropping the oldest turns first, and
/// the document gets the rest.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    system_prompt: String,
    budget: ContextBudget,
    max_history_messages: usize,
}

impl PromptAssembler {
    pub fn new(system_prompt: String, budget: ContextBudget, max_history_messages: usize) -> Self {
        Self {
            system_prompt,
            budget,
            max_history_messages,
        }
    }

    pub fn budget(&self) -> ContextBudget {
        self.budget
    }

    pub fn max_history_messages(&self) -> usize {
        self.max_history_messages
    }

    pub fn assemble(
        &self,
        document: Option<&str>,
        history: &[Message],
        question: &str,
    ) -> Result<AssembledPrompt, PromptError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(PromptError::EmptyQuestion);
        }

        let document = document.map(str::trim).filter(|d| !d.is_empty());
        let limit = self.budget.limit;

        let system_cost = self.budget.measure(&self.system_prompt);
        let frame_cost = self
            .budget
            .measure(&render_user_turn(document.map(|_| ""), question));
        let fixed_cost = system_cost + frame_cost;
        if fixed_cost > limit {
            return Err(PromptError::BudgetExceeded {
                required: fixed_cost,
                limit,
            });
        }
        let remaining = limit - fixed_cost;

        let conversational: Vec<&Message> = history
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .collect();
        let window_start = conversational
            .len()
            .saturating_sub(self.max_history_messages);
        let mut kept = &conversational[window_start..];

        let history_allowance = remaining / 2;
        let mut history_cost: usize = kept
            .iter()
            .map(|m| self.budget.measure(&m.content))
            .sum();
        while history_cost > history_allowance {
            let Some((oldest, rest)) = kept.split_first() else {
                break;
            };
            history_cost -= self.budget.measure(&oldest.content);
            kept = rest;
        }
        let history_dropped = conversational.len() - kept.len();

        let mut document_allowance = remaining - history_cost;
        loop {
            let (document_text, document_truncated) = match document {
                Some(text) => {
                    let (fitted, truncated) = self.fit_document(text, document_allowance);
                    (Some(fitted), truncated)
                }
                None => (None, false),
            };

            let user_turn = render_user_turn(document_text.as_deref(), question);
            let used = system_cost + history_cost + self.budget.measure(&user_turn);

            // Token counts are not additive across the splice point; shrink and retry.
            if used > limit && document_allowance > 0 {
                document_allowance = document_allowance.saturating_sub(used - limit);
                continue;
            }

            let mut messages = Vec::with_capacity(kept.len() + 2);
            messages.push(ChatMessage::system(self.system_prompt.clone()));
            messages.extend(
                kept.iter()
                    .map(|m| ChatMessage::new(m.role, m.content.clone())),
            );
            messages.push(ChatMessage::user(user_turn));

            return Ok(AssembledPrompt {
                messages,
                document_truncated,
                history_dropped,
                used,
            });
        }
    }

    fn fit_document(&self, text: &str, allowance: usize) -> (String, bool) {
        if self.budget.measure(text) <= allowance {
            return (text.to_string(), false);
        }

        let marker_cost = self.budget.measure(TRUNCATION_MARKER);
        if allowance < marker_cost {
            return (String::new(), true);
        }

        let prefix = self.budget.fit_prefix(text, allowance - marker_cost);
        (format!("{prefix}{TRUNCATION_MARKER}"), true)
    }
}

fn render_user_turn(document: Option<&str>, question: &str) -> String {
    match document {
        Some(document) => {
            format!("Document content: {document}\n\nUser question: {question}\nAnswer:")
        }
        None => format!("User question: {question}\nAnswer:"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SessionId;

    fn assembler(limit: usize) -> PromptAssembler {
        PromptAssembler::new(
            "You are a helpful assistant".to_string(),
            ContextBudget::chars(limit),
            4,
        )
    }

    fn total_chars(prompt: &AssembledPrompt) -> usize {
        prompt
            .messages
            .iter()
            .map(|m| m.content.chars().count())
            .sum()
    }

    #[test]
    fn given_multibyte_text_when_fitting_prefix_then_cuts_on_char_boundary() {
        let budget = ContextBudget::chars(3);
        assert_eq!(budget.fit_prefix("héllo", 3), "hél");
    }

    #[test]
    fn given_tight_budget_when_assembling_then_stays_within_limit() {
        let document = "lorem ipsum ".repeat(200);
        let prompt = assembler(300)
            .assemble(Some(&document), &[], "What is this?")
            .unwrap();

        assert!(prompt.document_truncated);
        assert_eq!(prompt.used, total_chars(&prompt));
        assert!(prompt.used <= 300);
    }

    #[test]
    fn given_system_history_when_assembling_then_system_turns_are_ignored() {
        let session = SessionId::new();
        let history = vec![Message::new(
            session,
            MessageRole::System,
            "stale".to_string(),
        )];
        let prompt = assembler(500).assemble(None, &history, "hi").unwrap();

        assert_eq!(prompt.messages.len(), 2);
        assert_eq!(prompt.history_dropped, 0);
    }
}
