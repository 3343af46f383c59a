use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::MessageRole;

/// One exchanged utterance in a chat session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Utterance {
    pub role: MessageRole,
    pub text: String,
    pub at: NaiveDateTime,
}

/// Per-session conversational state.
///
/// `history` is append-only; `recognized` is union-accumulated and never
/// shrinks for the lifetime of the session. One chat session exclusively
/// owns its state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationState {
    history: Vec<Utterance>,
    recognized: BTreeSet<String>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &[Utterance] {
        &self.history
    }

    pub fn recognized(&self) -> &BTreeSet<String> {
        &self.recognized
    }

    /// Append an assistant-only utterance (the opening greeting).
    pub fn push_assistant(&mut self, text: &str) {
        self.history.push(Utterance {
            role: MessageRole::Triagecare,
            text: text.to_string(),
            at: chrono::Local::now().naive_local(),
        });
    }

    /// Record one completed turn: the patient utterance, the composed
    /// reply, and the symptom keys this turn contributed.
    pub fn apply_turn(&mut self, user_text: &str, reply_text: &str, symptoms: BTreeSet<String>) {
        let now = chrono::Local::now().naive_local();
        self.history.push(Utterance {
            role: MessageRole::Patient,
            text: user_text.to_string(),
            at: now,
        });
        self.history.push(Utterance {
            role: MessageRole::Triagecare,
            text: reply_text.to_string(),
            at: now,
        });
        self.recognized.extend(symptoms);
    }

    /// Title derived from the first patient message, if any.
    pub fn title(&self) -> String {
        self.history
            .iter()
            .find(|u| u.role == MessageRole::Patient)
            .map(|u| generate_title(&u.text))
            .unwrap_or_else(|| "New consultation".to_string())
    }
}

/// Generate a session title from the first patient message.
/// Truncates at 50 characters with "..." if longer, handling UTF-8 correctly.
pub fn generate_title(first_message: &str) -> String {
    let trimmed = first_message.trim();
    if trimmed.is_empty() {
        return "New consultation".to_string();
    }

    // Find the byte position at or just before the 50th character
    let boundary = trimmed
        .char_indices()
        .take_while(|(i, _)| *i < 50)
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(trimmed.len());

    if boundary >= trimmed.len() {
        trimmed.to_string()
    } else {
        format!("{}...", &trimmed[..boundary])
    }
}
