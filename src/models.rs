use std::fmt;

use chrono::{DateTime, Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize, Serializer};

pub type TaskId = u64;

/// Represents a single to-do item scheduled on one day.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Task {
    /// Unique identifier, assigned by the store.
    pub id: TaskId,
    /// Display text, trimmed and never empty.
    pub text: String,
    /// Whether the task has been completed.
    #[serde(default)]
    pub completed: bool,
    /// The day the task belongs to.
    pub due_date: NaiveDate,
    /// Optional time of day; `None` means "anytime".
    #[serde(default, with = "hhmm")]
    pub due_time: Option<NaiveTime>,
    /// Timestamp when the task was created.
    pub created_at: DateTime<Local>,
}

impl Task {
    pub fn is_pending(&self) -> bool {
        !self.completed
    }

    /// The due time as shown to the user, e.g. `09:00 AM`.
    pub fn display_time(&self) -> Option<String> {
        self.due_time.map(|t| t.format("%I:%M %p").to_string())
    }
}

/// Input for [`crate::store::TaskStore::add`].
#[derive(Debug, Clone)]
pub struct NewTask {
    pub text: String,
    pub due_date: NaiveDate,
    pub due_time: Option<NaiveTime>,
}

impl NewTask {
    pub fn new(text: impl Into<String>, due_date: NaiveDate) -> Self {
        NewTask { text: text.into(), due_date, due_time: None }
    }

    pub fn at(mut self, time: NaiveTime) -> Self {
        self.due_time = Some(time);
        self
    }
}

/// A clickable follow-up attached to an assistant reply.
///
/// Outside the process a suggestion is only its display text; task ids stay local.
#[derive(Debug, Clone, PartialEq)]
pub enum Suggestion {
    /// Marks the referenced task complete when clicked.
    Complete { task_id: TaskId, text: String },
    /// Copies its text into the chat input.
    Prompt(String),
}

impl Suggestion {
    pub fn prompt(text: impl Into<String>) -> Self {
        Suggestion::Prompt(text.into())
    }
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suggestion::Complete { text, .. } => write!(f, "Complete: {}", text),
            Suggestion::Prompt(text) => f.write_str(text),
        }
    }
}

/// One bubble in the assistant conversation.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: u64,
    pub text: String,
    pub is_user: bool,
    pub timestamp: DateTime<Local>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "as_labels")]
    pub suggestions: Vec<Suggestion>,
}

fn as_labels<S>(suggestions: &[Suggestion], s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.collect_seq(suggestions.iter().map(|x| x.to_string()))
}

/// Parses a user-entered time such as `9:30` or `21:05`.
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").ok()
}

/// Serializes task times as zero-padded `HH:MM`.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(t) => s.serialize_str(&t.format(FORMAT).to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw {
            Some(s) => NaiveTime::parse_from_str(&s, FORMAT)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_suggestion_renders_with_prefix() {
        let s = Suggestion::Complete { task_id: 4, text: "Call mom".into() };
        assert_eq!(s.to_string(), "Complete: Call mom");
        assert_eq!(Suggestion::prompt("Get suggestions").to_string(), "Get suggestions");
    }

    #[test]
    fn chat_message_sends_suggestions_as_text() {
        let msg = ChatMessage {
            id: 2,
            text: "pick one".into(),
            is_user: false,
            timestamp: Local::now(),
            suggestions: vec![
                Suggestion::prompt("Get suggestions"),
                Suggestion::Complete { task_id: 3, text: "Call mom".into() },
            ],
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["suggestions"], serde_json::json!(["Get suggestions", "Complete: Call mom"]));
        assert_eq!(json["isUser"], false);
        assert!(!json.to_string().contains("task_id"));
    }

    #[test]
    fn due_time_serializes_as_hhmm() {
        let task = Task {
            id: 1,
            text: "Study math".into(),
            completed: false,
            due_date: NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
            due_time: parse_time("9:00"),
            created_at: Local::now(),
        };
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["due_time"], "09:00");
        assert_eq!(task.display_time().as_deref(), Some("09:00 AM"));

        let back: Task = serde_json::from_value(json).unwrap();
        assert_eq!(back.due_time, task.due_time);
    }
}
