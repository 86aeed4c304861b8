//! Environment-driven settings.
//!
//! Everything is read through a lookup function so that tests never need to
//! touch the process environment; `from_env` plugs in `std::env::var`.

use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Overrides the task snapshot location.
pub const ENV_DB: &str = "TASKBUDDY_DB";
pub const ENV_API_URL: &str = "LLM_API_URL";
pub const ENV_MODEL: &str = "LLM_MODEL";
pub const ENV_API_STYLE: &str = "LLM_API_STYLE";

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Credential slots in probe order. The first non-empty one wins.
pub const CREDENTIAL_SLOTS: [(&str, Provider); 5] = [
    ("OPENAI_API_KEY", Provider::OpenAi),
    ("ANTHROPIC_API_KEY", Provider::Anthropic),
    ("GOOGLE_API_KEY", Provider::Google),
    ("COHERE_API_KEY", Provider::Cohere),
    ("LLM_API_KEY", Provider::Custom),
];

/// Which vendor a credential belongs to; decides the auth header shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Anthropic,
    Google,
    Cohere,
    Custom,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Provider::OpenAi => "OpenAI",
            Provider::Anthropic => "Anthropic",
            Provider::Google => "Google",
            Provider::Cohere => "Cohere",
            Provider::Custom => "Custom",
        })
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub provider: Provider,
    pub key: String,
}

// keeps keys out of logs
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential").field("provider", &self.provider).finish_non_exhaustive()
    }
}

impl Credential {
    /// Probes [`CREDENTIAL_SLOTS`] in order.
    pub fn resolve<F>(lookup: F) -> Result<Credential>
    where
        F: Fn(&str) -> Option<String>,
    {
        CREDENTIAL_SLOTS
            .iter()
            .find_map(|(var, provider)| {
                lookup(var)
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .map(|key| Credential { provider: *provider, key })
            })
            .ok_or_else(|| {
                let names: Vec<&str> = CREDENTIAL_SLOTS.iter().map(|(v, _)| *v).collect();
                Error::Config(format!(
                    "No API key found. Please set one of the following environment variables: {}",
                    names.join(", ")
                ))
            })
    }

    /// Header name/value pairs that authenticate a request.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        match self.provider {
            Provider::OpenAi | Provider::Cohere | Provider::Custom => {
                vec![("authorization", format!("Bearer {}", self.key))]
            }
            Provider::Anthropic => vec![
                ("x-api-key", self.key.clone()),
                ("anthropic-version", ANTHROPIC_VERSION.to_string()),
            ],
            Provider::Google => vec![("x-goog-api-key", self.key.clone())],
        }
    }
}

/// Request body flavour expected by the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiStyle {
    /// `{ messages, context: { userTasks, systemPrompt } }`
    #[default]
    Context,
    /// OpenAI-compatible chat completions.
    Chat,
}

impl ApiStyle {
    fn parse(s: &str) -> Result<ApiStyle> {
        match s.trim().to_lowercase().as_str() {
            "" | "context" => Ok(ApiStyle::Context),
            "chat" | "openai" => Ok(ApiStyle::Chat),
            other => Err(Error::Config(format!(
                "unknown {} '{}'. Supported: context, chat",
                ENV_API_STYLE, other
            ))),
        }
    }
}

/// Unvalidated remote assistant settings; see `RemoteAssistant::new` for the checks.
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub endpoint: Option<String>,
    pub model: String,
    pub style: ApiStyle,
    pub credential: Option<Credential>,
    /// Why no credential was found, kept so the error surfaces when the client is built.
    pub credential_error: Option<String>,
}

impl LlmConfig {
    pub fn from_env() -> Result<LlmConfig> {
        Self::from_lookup(|k| env::var(k).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<LlmConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());
        let style = match non_empty(ENV_API_STYLE) {
            Some(s) => ApiStyle::parse(&s)?,
            None => ApiStyle::default(),
        };
        let (credential, credential_error) = match Credential::resolve(&lookup) {
            Ok(c) => (Some(c), None),
            Err(e) => (None, Some(e.to_string())),
        };
        Ok(LlmConfig {
            endpoint: non_empty(ENV_API_URL),
            model: non_empty(ENV_MODEL).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            style,
            credential,
            credential_error,
        })
    }

    /// Whether a client could be built from this config.
    pub fn is_usable(&self) -> bool {
        self.credential.is_some() && (self.endpoint.is_some() || self.style == ApiStyle::Chat)
    }
}

/// Returns the path to the tasks snapshot (`tasks.json`).
///
/// The path is determined in the following order:
/// 1. `TASKBUDDY_DB` environment variable.
/// 2. `~/.local/share/taskbuddy/tasks.json` (on Linux).
/// 3. `./tasks.json` (fallback).
pub fn db_path() -> PathBuf {
    env::var(ENV_DB).map(PathBuf::from).unwrap_or_else(|_| data_dir().join("tasks.json"))
}

/// Per-user data directory for the snapshot and the log file.
pub fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|p| p.join("taskbuddy"))
        .unwrap_or_else(|| PathBuf::from("."))
}
