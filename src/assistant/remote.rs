//! Client for an external LLM endpoint.
//!
//! The request carries the whole conversation and a summary of the selected
//! day's tasks. Responses come in several shapes and are normalised to a
//! single display string.

use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, info};

use crate::config::{ApiStyle, Credential, LlmConfig, DEFAULT_CHAT_URL, ENV_API_URL};
use crate::error::{Error, Result};
use crate::models::{ChatMessage, Suggestion, Task};

const MAX_TOKENS: u32 = 500;
const TEMPERATURE: f32 = 0.7;

/// A normalised answer from the remote assistant.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RemoteReply {
    pub message: String,
    pub suggestions: Vec<Suggestion>,
}

/// Per-task entry of the request context.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    pub text: String,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_time: Option<String>,
}

/// Summary of the selected day sent alongside the conversation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskContext {
    pub selected_date: NaiveDate,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub pending_tasks: usize,
    pub task_list: Vec<TaskSummary>,
}

impl TaskContext {
    pub fn build(tasks: &[Task], date: NaiveDate) -> TaskContext {
        let task_list: Vec<TaskSummary> = tasks
            .iter()
            .filter(|t| t.due_date == date)
            .map(|t| TaskSummary {
                text: t.text.clone(),
                completed: t.completed,
                due_time: t.due_time.map(|d| d.format("%H:%M").to_string()),
            })
            .collect();
        let completed = task_list.iter().filter(|t| t.completed).count();
        TaskContext {
            selected_date: date,
            total_tasks: task_list.len(),
            completed_tasks: completed,
            pending_tasks: task_list.len() - completed,
            task_list,
        }
    }

    pub fn system_prompt(&self) -> String {
        let tasks = serde_json::to_string_pretty(&self.task_list).unwrap_or_else(|_| "[]".into());
        format!(
            "You are a helpful task management assistant. Help the user with their TODO list by providing:\n\
             - Encouragement and motivation\n\
             - Practical suggestions for completing tasks\n\
             - Progress tracking insights\n\
             - Task completion tips\n\n\
             Current context:\n\
             - Date: {}\n\
             - Total tasks: {}\n\
             - Completed: {}\n\
             - Pending: {}\n\
             - Tasks: {}\n\n\
             Be encouraging, helpful, and provide actionable advice. Keep responses concise but supportive.",
            self.selected_date, self.total_tasks, self.completed_tasks, self.pending_tasks, tasks
        )
    }
}

#[derive(Debug, Serialize)]
struct RoleMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Builds the JSON body for `style`.
pub fn build_payload(
    style: ApiStyle,
    model: &str,
    history: &[ChatMessage],
    context: &TaskContext,
) -> Value {
    let system_prompt = context.system_prompt();
    match style {
        ApiStyle::Context => json!({
            "messages": history,
            "context": {
                "userTasks": context,
                "systemPrompt": system_prompt,
            }
        }),
        ApiStyle::Chat => {
            let mut messages = vec![RoleMessage { role: "system", content: &system_prompt }];
            messages.extend(history.iter().map(|m| RoleMessage {
                role: if m.is_user { "user" } else { "assistant" },
                content: &m.text,
            }));
            json!({
                "model": model,
                "messages": messages,
                "max_tokens": MAX_TOKENS,
                "temperature": TEMPERATURE,
            })
        }
    }
}

#[derive(Debug, Deserialize)]
struct Shaped {
    message: Option<Value>,
    response: Option<Value>,
    content: Option<Value>,
    suggestions: Option<Value>,
}

/// String entries of a `suggestions` array; anything else is ignored.
fn string_suggestions(value: Option<Value>) -> Vec<Suggestion> {
    match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(Suggestion::Prompt(s)),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Reduces any response body to a [`RemoteReply`].
///
/// Accepts a bare string, an object with `message`, `response` or `content`,
/// and OpenAI-style `choices`. Anything else is shown as raw JSON.
pub fn normalize_reply(body: Value) -> RemoteReply {
    if let Value::String(s) = body {
        return RemoteReply { message: s, suggestions: Vec::new() };
    }
    if let Some(content) = body
        .pointer("/choices/0/message/content")
        .or_else(|| body.pointer("/output/0/content"))
        .and_then(Value::as_str)
    {
        return RemoteReply { message: content.to_string(), suggestions: Vec::new() };
    }
    if let Ok(shaped) = Shaped::deserialize(&body) {
        let text = [shaped.message, shaped.response, shaped.content]
            .into_iter()
            .flatten()
            .find(is_truthy);
        if let Some(text) = text {
            return RemoteReply {
                message: as_text(text),
                suggestions: string_suggestions(shaped.suggestions),
            };
        }
    }
    RemoteReply { message: body.to_string(), suggestions: Vec::new() }
}

fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn as_text(v: Value) -> String {
    match v {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// A configured, ready-to-call remote assistant.
#[derive(Debug, Clone)]
pub struct RemoteAssistant {
    client: Client,
    endpoint: String,
    model: String,
    style: ApiStyle,
    credential: Credential,
}

impl RemoteAssistant {
    /// Validates `config`. No network I/O happens here.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` when no credential is set, or when the
    /// `context` style is selected without an endpoint.
    pub fn new(config: &LlmConfig) -> Result<RemoteAssistant> {
        let credential = config.credential.clone().ok_or_else(|| {
            Error::Config(
                config
                    .credential_error
                    .clone()
                    .unwrap_or_else(|| "No API key found".to_string()),
            )
        })?;
        let endpoint = match (&config.endpoint, config.style) {
            (Some(url), _) => url.clone(),
            (None, ApiStyle::Chat) => DEFAULT_CHAT_URL.to_string(),
            (None, ApiStyle::Context) => {
                return Err(Error::Config(format!(
                    "{} environment variable is not set. Set it to your LLM endpoint, \
                     or set LLM_API_STYLE=chat to use {}",
                    ENV_API_URL, DEFAULT_CHAT_URL
                )))
            }
        };
        info!(auth = %credential.provider, style = ?config.style, "remote assistant configured");
        Ok(RemoteAssistant {
            client: Client::new(),
            endpoint,
            model: config.model.clone(),
            style: config.style,
            credential,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends the conversation and the selected day's task summary.
    ///
    /// Failures are returned, never retried.
    pub async fn reply(
        &self,
        history: &[ChatMessage],
        tasks: &[Task],
        date: NaiveDate,
    ) -> Result<RemoteReply> {
        let context = TaskContext::build(tasks, date);
        let body = build_payload(self.style, &self.model, history, &context);

        let mut request = self.client.post(&self.endpoint).json(&body);
        for (name, value) in self.credential.headers() {
            request = request.header(name, value);
        }
        debug!(endpoint = %self.endpoint, messages = history.len(), "sending remote assistant request");

        let resp = request.send().await.map_err(|e| {
            error!(error = %e, "remote assistant request failed");
            Error::from(e)
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "remote assistant returned an error status");
            return Err(Error::Http { status: status.as_u16(), body });
        }

        let value: Value = resp.json().await?;
        Ok(normalize_reply(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shapes_are_normalised() {
        assert_eq!(normalize_reply(json!("hi")).message, "hi");
        assert_eq!(normalize_reply(json!({"response": "r"})).message, "r");
        assert_eq!(normalize_reply(json!({"content": "c"})).message, "c");
        assert_eq!(
            normalize_reply(json!({"choices": [{"message": {"content": "gpt"}}]})).message,
            "gpt"
        );
        assert_eq!(normalize_reply(json!({"other": 1})).message, r#"{"other":1}"#);
    }

    #[test]
    fn message_wins_and_keeps_suggestions() {
        let r = normalize_reply(json!({
            "message": "m",
            "response": "r",
            "suggestions": ["Try this"]
        }));
        assert_eq!(r.message, "m");
        assert_eq!(r.suggestions, vec![Suggestion::prompt("Try this")]);
    }

    #[test]
    fn odd_suggestions_never_hide_the_message() {
        let r = normalize_reply(json!({"message": "hi", "suggestions": null}));
        assert_eq!(r.message, "hi");
        assert!(r.suggestions.is_empty());

        let r = normalize_reply(json!({"message": "hi", "suggestions": [{"text": "x"}, "Stretch", 3]}));
        assert_eq!(r.message, "hi");
        assert_eq!(r.suggestions, vec![Suggestion::prompt("Stretch")]);

        assert_eq!(normalize_reply(json!({"response": "r", "suggestions": "nope"})).message, "r");
    }

    #[test]
    fn empty_message_falls_through_to_response() {
        assert_eq!(normalize_reply(json!({"message": "", "response": "r"})).message, "r");
    }
}
