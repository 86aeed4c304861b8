use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;

use chrono::NaiveDate;
use serde_json::Value;
use taskbuddy::assistant::remote::{build_payload, TaskContext};
use taskbuddy::assistant::{Conversation, RemoteAssistant};
use taskbuddy::config::{ApiStyle, Credential, LlmConfig, Provider};
use taskbuddy::models::{parse_time, NewTask, Suggestion};
use taskbuddy::store::TaskStore;
use taskbuddy::Error;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn config(endpoint: Option<String>, provider: Provider) -> LlmConfig {
    LlmConfig {
        endpoint,
        model: "test-model".into(),
        style: ApiStyle::Context,
        credential: Some(Credential { provider, key: "secret".into() }),
        credential_error: None,
    }
}

/// Serves exactly one request with `status` and `body`, handing back the raw request text.
fn one_shot_server(status: &'static str, body: &'static str) -> (String, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/chat", listener.local_addr().unwrap());
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&raw).to_string();
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|l| l.to_lowercase().strip_prefix("content-length:").map(|v| v.trim().to_string()))
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(0);
                if raw.len() >= end + 4 + length {
                    break;
                }
            }
        }
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).unwrap();
        tx.send(String::from_utf8_lossy(&raw).to_string()).unwrap();
    });
    (url, rx)
}

fn sample() -> (Conversation, TaskStore) {
    let mut store = TaskStore::new();
    store
        .add(NewTask::new("Study math", today()).at(parse_time("09:00").unwrap()), today())
        .unwrap();
    let mut conv = Conversation::new();
    conv.push_user("How am I doing?");
    (conv, store)
}

#[test]
fn test_missing_credential_is_a_config_error() {
    let cfg = LlmConfig::from_lookup(|k: &str| {
        (k == "LLM_API_URL").then(|| "http://127.0.0.1:9/".to_string())
    })
    .unwrap();
    let err = RemoteAssistant::new(&cfg).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(err.to_string().contains("OPENAI_API_KEY"));
}

#[test]
fn test_context_style_needs_endpoint() {
    let err = RemoteAssistant::new(&config(None, Provider::Custom)).unwrap_err();
    assert!(matches!(err, Error::Config(ref m) if m.contains("LLM_API_URL")));

    let mut chat = config(None, Provider::OpenAi);
    chat.style = ApiStyle::Chat;
    let client = RemoteAssistant::new(&chat).unwrap();
    assert!(client.endpoint().starts_with("https://api.openai.com/"));
}

#[test]
fn test_context_payload_shape() {
    let (mut conv, store) = sample();
    conv.push_bot(
        "Pick one",
        vec![
            Suggestion::prompt("Get suggestions"),
            Suggestion::Complete { task_id: 1, text: "Study math".into() },
        ],
    );
    let ctx = TaskContext::build(store.tasks(), today());
    let body = build_payload(ApiStyle::Context, "m", conv.messages(), &ctx);

    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1]["isUser"], Value::Bool(true));
    assert!(messages[1].get("suggestions").is_none());
    assert_eq!(messages[2]["suggestions"], serde_json::json!(["Get suggestions", "Complete: Study math"]));
    assert_eq!(body["context"]["userTasks"]["totalTasks"], 1);
    assert_eq!(body["context"]["userTasks"]["taskList"][0]["dueTime"], "09:00");
    assert!(body["context"]["systemPrompt"].as_str().unwrap().contains("Study math"));
}

#[test]
fn test_chat_payload_shape() {
    let (conv, store) = sample();
    let ctx = TaskContext::build(store.tasks(), today());
    let body = build_payload(ApiStyle::Chat, "gpt-test", conv.messages(), &ctx);

    assert_eq!(body["model"], "gpt-test");
    assert_eq!(body["max_tokens"], 500);
    let roles: Vec<&str> = body["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["role"].as_str().unwrap())
        .collect();
    assert_eq!(roles, vec!["system", "assistant", "user"]);
}

#[tokio::test]
async fn test_reply_success() {
    let (url, requests) = one_shot_server("200 OK", r#"{"response":"hi","suggestions":["Take a break"]}"#);
    let client = RemoteAssistant::new(&config(Some(url), Provider::Anthropic)).unwrap();
    let (conv, store) = sample();

    let reply = client.reply(conv.messages(), store.tasks(), today()).await.unwrap();
    assert_eq!(reply.message, "hi");
    assert_eq!(reply.suggestions.len(), 1);

    let raw = requests.recv().unwrap();
    assert!(raw.starts_with("POST /chat"));
    assert!(raw.contains("x-api-key: secret"), "{raw}");
    assert!(raw.contains("anthropic-version: 2023-06-01"));
    assert!(raw.contains("\"systemPrompt\""));
}

#[tokio::test]
async fn test_error_status_is_surfaced() {
    let (url, _requests) = one_shot_server("500 Internal Server Error", "boom");
    let client = RemoteAssistant::new(&config(Some(url), Provider::OpenAi)).unwrap();
    let (conv, store) = sample();

    let err = client.reply(conv.messages(), store.tasks(), today()).await.unwrap_err();
    match err {
        Error::Http { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unreadable_body_is_a_decode_error() {
    let (url, _requests) = one_shot_server("200 OK", "not json");
    let client = RemoteAssistant::new(&config(Some(url), Provider::Custom)).unwrap();
    let (conv, store) = sample();

    let err = client.reply(conv.messages(), store.tasks(), today()).await.unwrap_err();
    assert!(matches!(err, Error::Decode(_)), "{err:?}");
}

#[tokio::test]
async fn test_unreachable_endpoint_is_a_transport_error() {
    let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
    let url = format!("http://127.0.0.1:{}/chat", port);
    let client = RemoteAssistant::new(&config(Some(url), Provider::Custom)).unwrap();
    let (conv, store) = sample();

    let err = client.reply(conv.messages(), store.tasks(), today()).await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "{err:?}");
    assert!(err.to_string().starts_with("Failed to get response from LLM API"));
}
