use chrono::Local;
use tracing::debug;

use super::encourage::encouragement;
use crate::models::{ChatMessage, Suggestion, TaskId};
use crate::store::TaskStore;

pub const GREETING: &str = "Hi there! I'm your Task Buddy! 🍌✨\n\n\
I can help you with:\n\
• Task suggestions and tips\n\
• Motivation and encouragement\n\
• Progress tracking\n\
• Quick task completion\n\n\
Try the quick actions below or ask me anything!";

/// Canned prompts offered under the chat input: (label, text put in the input).
pub const QUICK_ACTIONS: [(&str, &str); 4] = [
    ("📋 My Tasks", "Show my tasks"),
    ("💡 Suggestions", "Give me suggestions"),
    ("🔥 Motivate", "Motivate me"),
    ("📊 Progress", "Check progress"),
];

/// Result of clicking a suggestion chip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The task was pending and is now complete; a confirmation was appended.
    Completed(TaskId),
    /// The caller should place this text in the chat input.
    FillInput(String),
    /// The referenced task is gone or already done. Nothing changed.
    Stale,
}

/// Append-only list of chat bubbles, starting from the greeting.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    next_id: u64,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        let mut conv = Conversation { messages: Vec::new(), next_id: 1 };
        conv.push_bot(GREETING, Vec::new());
        conv
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last_text(&self) -> Option<&str> {
        self.messages.last().map(|m| m.text.as_str())
    }

    /// Chips of the newest message that has any.
    pub fn latest_suggestions(&self) -> &[Suggestion] {
        self.messages
            .iter()
            .rev()
            .find(|m| !m.suggestions.is_empty())
            .map(|m| m.suggestions.as_slice())
            .unwrap_or(&[])
    }

    /// Drops everything but a fresh greeting. Ids keep increasing.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.push_bot(GREETING, Vec::new());
    }

    pub fn push_user(&mut self, text: impl Into<String>) -> u64 {
        self.push(text.into(), true, Vec::new())
    }

    pub fn push_bot(&mut self, text: impl Into<String>, suggestions: Vec<Suggestion>) -> u64 {
        self.push(text.into(), false, suggestions)
    }

    /// Appends the tier message for the given counts unless it would repeat
    /// the most recent message. Returns whether anything was appended.
    pub fn encourage(&mut self, completed: usize, total: usize) -> bool {
        let Some(msg) = encouragement(completed, total) else {
            return false;
        };
        if self.last_text() == Some(msg) {
            return false;
        }
        self.push_bot(msg, Vec::new());
        true
    }

    /// Acts on a clicked chip.
    pub fn click(&mut self, suggestion: &Suggestion, store: &mut TaskStore) -> ClickOutcome {
        match suggestion {
            Suggestion::Complete { task_id, .. } => {
                let Some(task) = store.get(*task_id).filter(|t| t.is_pending()) else {
                    debug!(task_id, "suggestion refers to a task that is no longer pending");
                    return ClickOutcome::Stale;
                };
                let text = task.text.clone();
                store.complete(*task_id);
                self.push_bot(
                    format!("Great job completing \"{}\"! 🎉 You're making excellent progress! 💪", text),
                    Vec::new(),
                );
                ClickOutcome::Completed(*task_id)
            }
            Suggestion::Prompt(text) => ClickOutcome::FillInput(text.clone()),
        }
    }

    fn push(&mut self, text: String, is_user: bool, suggestions: Vec<Suggestion>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(ChatMessage { id, text, is_user, timestamp: Local::now(), suggestions });
        id
    }
}
