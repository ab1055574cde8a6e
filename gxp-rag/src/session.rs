//! In-memory conversation history for one console session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::{GenerationEngine, RagResponse};

/// One question and its answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// The user's question.
    pub query: String,
    /// The assistant's answer.
    pub answer: String,
    /// Sources cited for the answer.
    pub sources: Vec<String>,
    /// When the answer was produced.
    pub asked_at: DateTime<Utc>,
}

/// Session-scoped chat history. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    turns: Vec<ConversationTurn>,
}

impl ChatSession {
    /// An empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `query` with `engine` and append the turn to the history.
    pub async fn ask(&mut self, engine: &GenerationEngine, query: &str) -> RagResponse {
        let response = engine.generate_response(query, None).await;
        self.record(query, &response);
        response
    }

    /// Append a turn for an already generated response.
    pub fn record(&mut self, query: &str, response: &RagResponse) {
        self.turns.push(ConversationTurn {
            query: query.to_string(),
            answer: response.answer.clone(),
            sources: response.sources.clone(),
            asked_at: Utc::now(),
        });
    }

    /// Turns so far, oldest first.
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Whether no question has been asked yet.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Forget every turn.
    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_and_clear() {
        let mut session = ChatSession::new();
        let response = RagResponse {
            answer: "Use a risk-based approach.".into(),
            sources: vec!["GAMP5.pdf".into()],
            context_used: true,
            chunks_retrieved: Some(1),
        };
        session.record("How to validate?", &response);
        assert_eq!(session.turns().len(), 1);
        assert_eq!(session.turns()[0].sources, vec!["GAMP5.pdf"]);

        session.clear();
        assert!(session.is_empty());
    }
}
