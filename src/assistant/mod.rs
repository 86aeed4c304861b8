//! The "Task Buddy" chat panel: a local rule-based responder, the
//! conversation log it writes to, and an optional remote LLM client.

pub mod chat;
pub mod encourage;
pub mod engine;
pub mod remote;

pub use chat::{ClickOutcome, Conversation, GREETING, QUICK_ACTIONS};
pub use encourage::encouragement;
pub use engine::{respond, DayContext, Picker, RandomPicker, Reply};
pub use remote::{RemoteAssistant, RemoteReply};
