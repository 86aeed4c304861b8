//! # Task Buddy
//!
//! A terminal to-do list organised as a rolling seven-day window, with a chat
//! assistant that knows about the selected day's tasks.
//!
//! * [`store::TaskStore`] owns the tasks and validates new ones.
//! * [`view::DayView`] orders one day's tasks for display.
//! * [`dates::DateWindow`] yields the selectable days and their tab labels.
//! * [`assistant`] holds the rule-based responder, the conversation log and
//!   the optional remote LLM client.

pub mod assistant;
pub mod commands;
pub mod config;
pub mod dates;
pub mod error;
pub mod logging;
pub mod models;
pub mod storage;
pub mod store;
pub mod tui;
pub mod view;

pub use error::{Error, Result};
