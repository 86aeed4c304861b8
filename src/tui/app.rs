use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, TryRecvError};

use chrono::NaiveDate;
use ratatui::widgets::ListState;
use tracing::{info, warn};

use crate::assistant::{respond, ClickOutcome, Conversation, DayContext, RandomPicker, RemoteAssistant, RemoteReply, QUICK_ACTIONS};
use crate::config::LlmConfig;
use crate::dates::{local_today, DateWindow, WINDOW_DAYS};
use crate::error::Result;
use crate::models::{parse_time, NewTask, Task, TaskId};
use crate::storage::save_tasks;
use crate::store::TaskStore;
use crate::view::{DayView, GroupKind};

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum InputMode {
    Normal,
    Adding,
    Chatting,
}

pub enum DisplayItem {
    GroupHeader(GroupKind, usize), // kind, count
    Task(Task),
    Placeholder,
}

/// State for the two-step "Add Task" wizard.
#[derive(Default)]
pub struct AddState {
    pub text: String,
    pub step: usize, // 0: Text, 1: Time
}

pub struct App {
    pub store: TaskStore,
    /// Where to write after each change; `None` keeps everything in memory.
    pub snapshot: Option<PathBuf>,
    pub today: NaiveDate,
    pub selected_date: NaiveDate,
    pub view: DayView,
    pub display_items: Vec<DisplayItem>,
    pub state: ListState,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub add_state: AddState,
    pub conversation: Conversation,
    pub chat_input: String,
    pub remote: Option<RemoteAssistant>,
    /// Why the remote assistant is unavailable, shown when the user asks for it.
    pub remote_error: Option<String>,
    pub use_remote: bool,
    pub status: Option<String>,
    pending_reply: Option<Receiver<Result<RemoteReply>>>,
    runtime: Option<tokio::runtime::Runtime>,
    changed: Rc<Cell<bool>>,
}

impl App {
    /// Creates the app around an already-loaded task list.
    pub fn new(tasks: Vec<Task>, snapshot: Option<PathBuf>, llm: Option<LlmConfig>) -> App {
        let mut store = TaskStore::from_tasks(tasks);
        let changed = Rc::new(Cell::new(false));
        let flag = Rc::clone(&changed);
        store.subscribe(move |_| flag.set(true));

        let (remote, remote_error) = match llm.map(|cfg| RemoteAssistant::new(&cfg)) {
            Some(Ok(r)) => (Some(r), None),
            Some(Err(e)) => (None, Some(e.to_string())),
            None => (None, Some("remote assistant disabled".to_string())),
        };

        let today = local_today();
        let mut app = App {
            store,
            snapshot,
            today,
            selected_date: today,
            view: DayView::default(),
            display_items: Vec::new(),
            state: ListState::default(),
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            add_state: AddState::default(),
            conversation: Conversation::new(),
            chat_input: String::new(),
            use_remote: remote.is_some(),
            remote,
            remote_error,
            status: None,
            pending_reply: None,
            runtime: None,
            changed,
        };
        app.reload();
        app.encourage();
        app
    }

    /// The date tabs, recomputed from the clock on every call.
    pub fn window(&self) -> DateWindow {
        DateWindow::starting(self.today)
    }

    pub fn selected_tab(&self) -> Option<usize> {
        self.window().index_of(self.selected_date)
    }

    pub fn is_loading(&self) -> bool {
        self.pending_reply.is_some()
    }

    /// Re-reads the clock and rebuilds the display list for the selected day.
    pub fn reload(&mut self) {
        self.reload_at(local_today());
    }

    /// Called on idle ticks. Picks up a new day and cheers for the day it lands on.
    pub fn tick(&mut self) {
        self.roll_over(local_today());
    }

    fn roll_over(&mut self, today: NaiveDate) {
        if today == self.today {
            return;
        }
        let before = self.selected_date;
        self.reload_at(today);
        if self.selected_date != before {
            self.encourage();
        }
    }

    fn reload_at(&mut self, today: NaiveDate) {
        self.today = today;
        if !self.window().contains(self.selected_date) {
            // the day rolled over while the app was open
            self.selected_date = self.today;
        }
        self.view = DayView::build(self.store.tasks(), self.selected_date);

        self.display_items.clear();
        for group in self.view.groups() {
            self.display_items.push(DisplayItem::GroupHeader(group.kind, group.tasks.len()));
            for t in group.tasks {
                self.display_items.push(DisplayItem::Task(t.clone()));
            }
        }
        if self.display_items.is_empty() {
            self.display_items.push(DisplayItem::Placeholder);
        }

        let current = self.state.selected().filter(|i| self.is_task(*i));
        match current {
            Some(_) => {}
            None => {
                let first = self.state.selected().unwrap_or(0);
                let pick = (first..self.display_items.len())
                    .chain(0..first)
                    .find(|i| self.is_task(*i));
                self.state.select(pick);
            }
        }
    }

    fn is_task(&self, i: usize) -> bool {
        matches!(self.display_items.get(i), Some(DisplayItem::Task(_)))
    }

    fn selected_task_id(&self) -> Option<TaskId> {
        match self.state.selected().and_then(|i| self.display_items.get(i)) {
            Some(DisplayItem::Task(t)) => Some(t.id),
            _ => None,
        }
    }

    /// Selects the next task, skipping group headers.
    pub fn next(&mut self) {
        let len = self.display_items.len();
        let start = self.state.selected().unwrap_or(len.saturating_sub(1));
        let pick = (1..=len).map(|k| (start + k) % len).find(|i| self.is_task(*i));
        if pick.is_some() {
            self.state.select(pick);
        }
    }

    /// Selects the previous task, skipping group headers.
    pub fn previous(&mut self) {
        let len = self.display_items.len();
        let start = self.state.selected().unwrap_or(0);
        let pick = (1..=len).map(|k| (start + len - k) % len).find(|i| self.is_task(*i));
        if pick.is_some() {
            self.state.select(pick);
        }
    }

    pub fn next_day(&mut self) {
        let i = self.selected_tab().map_or(0, |i| (i + 1) % WINDOW_DAYS);
        self.select_day(i);
    }

    pub fn previous_day(&mut self) {
        let i = self.selected_tab().map_or(0, |i| (i + WINDOW_DAYS - 1) % WINDOW_DAYS);
        self.select_day(i);
    }

    pub fn select_day(&mut self, index: usize) {
        if let Some(date) = self.window().get(index) {
            if date != self.selected_date {
                self.selected_date = date;
                self.state.select(Some(0));
                self.reload();
                self.encourage();
            }
        }
    }

    /// Flips the selected task between pending and done.
    pub fn toggle_selected(&mut self) {
        if let Some(id) = self.selected_task_id() {
            self.store.toggle(id);
            self.after_mutation();
        }
    }

    pub fn delete_selected(&mut self) {
        if let Some(id) = self.selected_task_id() {
            self.store.remove(id);
            self.after_mutation();
        }
    }

    /// Initiates the "Add Task" wizard for the selected day.
    pub fn start_add(&mut self) {
        self.input_mode = InputMode::Adding;
        self.add_state = AddState::default();
        self.input_buffer.clear();
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
    }

    /// Advances the wizard. Invalid input simply ends it without adding anything.
    pub fn handle_add_input(&mut self) {
        let input = std::mem::take(&mut self.input_buffer);
        match self.add_state.step {
            0 => {
                if input.trim().is_empty() {
                    self.input_mode = InputMode::Normal;
                    return;
                }
                self.add_state.text = input;
                self.add_state.step = 1;
            }
            _ => {
                self.input_mode = InputMode::Normal;
                let mut new = NewTask::new(std::mem::take(&mut self.add_state.text), self.selected_date);
                if !input.trim().is_empty() {
                    match parse_time(&input) {
                        Some(t) => new = new.at(t),
                        None => {
                            self.status = Some(format!("Invalid time '{}'. Use HH:MM.", input.trim()));
                            return;
                        }
                    }
                }
                if let Err(e) = self.store.add(new, local_today()) {
                    warn!(error = %e, "task not added");
                }
                self.after_mutation();
            }
        }
    }

    pub fn start_chat(&mut self) {
        self.input_mode = InputMode::Chatting;
    }

    /// Puts one of the canned prompts in the chat input.
    pub fn quick_action(&mut self, index: usize) {
        if let Some((_, text)) = QUICK_ACTIONS.get(index) {
            self.chat_input = text.to_string();
            self.input_mode = InputMode::Chatting;
        }
    }

    /// Sends the chat input to the local responder or the remote assistant.
    pub fn send_chat(&mut self) {
        let text = self.chat_input.trim().to_string();
        if text.is_empty() || self.is_loading() {
            return;
        }
        self.chat_input.clear();
        self.conversation.push_user(text.as_str());

        if self.use_remote {
            if let Some(remote) = self.remote.clone() {
                self.spawn_remote(remote);
                return;
            }
        }
        let label = self.window().label_of(self.selected_date);
        let ctx = DayContext { tasks: self.store.tasks(), date: self.selected_date, label: &label };
        let reply = respond(&text, &ctx, &mut RandomPicker);
        self.conversation.push_bot(reply.text, reply.suggestions);
    }

    fn spawn_remote(&mut self, remote: RemoteAssistant) {
        if self.runtime.is_none() {
            match tokio::runtime::Runtime::new() {
                Ok(rt) => self.runtime = Some(rt),
                Err(e) => {
                    self.conversation.push_bot(format!("Sorry, I couldn't start the network client: {}", e), Vec::new());
                    return;
                }
            }
        }
        let Some(rt) = self.runtime.as_ref() else { return };

        let (tx, rx) = mpsc::channel();
        let history = self.conversation.messages().to_vec();
        let tasks = self.store.tasks().to_vec();
        let date = self.selected_date;
        rt.spawn(async move {
            let result = remote.reply(&history, &tasks, date).await;
            let _ = tx.send(result);
        });
        self.pending_reply = Some(rx);
        info!("remote reply requested");
    }

    /// Collects a finished remote reply, if any. Errors become chat bubbles.
    pub fn poll_remote(&mut self) {
        let Some(rx) = self.pending_reply.as_ref() else { return };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => Err(crate::Error::Transport("request was dropped".into())),
        };
        self.pending_reply = None;
        match result {
            Ok(reply) => {
                self.conversation.push_bot(reply.message, reply.suggestions);
            }
            Err(e) => {
                self.conversation.push_bot(format!("Sorry, I couldn't reach the assistant. {}", e), Vec::new());
            }
        }
    }

    /// Switches between the local responder and the remote assistant.
    pub fn toggle_remote(&mut self) {
        if self.remote.is_some() {
            self.use_remote = !self.use_remote;
            self.status = None;
        } else {
            self.use_remote = false;
            self.status = self.remote_error.clone();
        }
    }

    pub fn clear_chat(&mut self) {
        self.conversation.clear();
    }

    /// Clicks suggestion `index` of the newest message that has chips.
    pub fn click_suggestion(&mut self, index: usize) {
        let Some(suggestion) = self.conversation.latest_suggestions().get(index).cloned() else {
            return;
        };
        match self.conversation.click(&suggestion, &mut self.store) {
            ClickOutcome::Completed(_) => self.after_mutation(),
            ClickOutcome::FillInput(text) => {
                self.chat_input = text;
                self.input_mode = InputMode::Chatting;
            }
            ClickOutcome::Stale => {
                self.status = Some("That task is no longer pending.".to_string());
            }
        }
    }

    /// Persists and re-renders if an observer saw a change.
    fn after_mutation(&mut self) {
        if !self.changed.replace(false) {
            return;
        }
        if let Some(path) = &self.snapshot {
            if let Err(e) = save_tasks(path, self.store.tasks()) {
                warn!(error = %e, "failed to save tasks");
                self.status = Some(format!("Failed to save tasks: {}", e));
            }
        }
        self.reload();
        self.encourage();
    }

    fn encourage(&mut self) {
        let stats = self.view.stats();
        self.conversation.encourage(stats.completed, stats.total);
    }
}
