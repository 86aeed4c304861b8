use std::io::{self, Write};

use chrono::{Duration, NaiveDate};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::assistant::{respond, Conversation, DayContext, RandomPicker, RemoteAssistant};
use crate::config::{db_path, LlmConfig};
use crate::dates::{local_today, DateWindow};
use crate::models::{parse_time, NewTask, TaskId};
use crate::storage::{delete_database, load_tasks, save_tasks};
use crate::store::TaskStore;
use crate::view::{DayView, GroupKind, NO_TASKS_PLACEHOLDER};

/// Loads the snapshot into a store. Returns `None` (after reporting) if it cannot be read.
fn open_store(silent: bool) -> Option<TaskStore> {
    match load_tasks(&db_path()) {
        Ok(tasks) => Some(TaskStore::from_tasks(tasks)),
        Err(e) => {
            if !silent { eprintln!("Failed to load tasks: {}", e); }
            None
        }
    }
}

fn persist(store: &TaskStore, silent: bool) -> bool {
    match save_tasks(&db_path(), store.tasks()) {
        Ok(()) => true,
        Err(e) => {
            if !silent { eprintln!("Failed to save tasks: {}", e); }
            false
        }
    }
}

/// Resolves `--date` / `--in` against `today`. Neither means today.
pub fn resolve_date(date: Option<&str>, in_days: Option<u32>, today: NaiveDate) -> Result<NaiveDate, String> {
    match (date, in_days) {
        (Some(d), _) => NaiveDate::parse_from_str(d, "%Y-%m-%d")
            .map_err(|e| format!("Invalid date '{}': {}. Use YYYY-MM-DD.", d, e)),
        (None, Some(n)) => today
            .checked_add_signed(Duration::days(n.into()))
            .ok_or_else(|| format!("{} days from today is outside the seven-day window.", n)),
        (None, None) => Ok(today),
    }
}

/// Adds a new task due within the next seven days.
///
/// Blank text and dates outside the window are rejected without touching the snapshot.
pub fn cmd_add(text: String, date: Option<String>, in_days: Option<u32>, time: Option<String>, silent: bool) -> Option<TaskId> {
    let today = local_today();
    let due_date = match resolve_date(date.as_deref(), in_days, today) {
        Ok(d) => d,
        Err(e) => {
            if !silent { eprintln!("{}", e); }
            return None;
        }
    };
    let mut new = NewTask::new(text, due_date);
    if let Some(t) = time {
        match parse_time(&t) {
            Some(parsed) => new = new.at(parsed),
            None => {
                if !silent { eprintln!("Invalid time '{}'. Use HH:MM.", t); }
                return None;
            }
        }
    }

    let mut store = open_store(silent)?;
    match store.add(new, today) {
        Ok(id) => {
            if persist(&store, silent) && !silent {
                println!("Task added (id = {})", id);
            }
            Some(id)
        }
        Err(e) => {
            if !silent { eprintln!("{}", e); }
            None
        }
    }
}

/// Flips a task between pending and completed.
pub fn cmd_toggle(id: TaskId, silent: bool) {
    let Some(mut store) = open_store(silent) else { return };
    if !store.toggle(id) {
        if !silent { eprintln!("Task {} not found.", id); }
        return;
    }
    if persist(&store, silent) && !silent {
        let state = if store.get(id).is_some_and(|t| t.completed) { "complete" } else { "pending" };
        println!("Task {} marked as {}.", id, state);
    }
}

/// Removes a task by ID.
pub fn cmd_remove(id: TaskId, silent: bool) {
    let Some(mut store) = open_store(silent) else { return };
    if !store.remove(id) {
        if !silent { eprintln!("Task {} not found.", id); }
        return;
    }
    if persist(&store, silent) && !silent {
        println!("Task {} removed.", id);
    }
}

/// Lists one day's tasks in a table, grouped the same way as the UI.
pub fn cmd_list(date: Option<String>) {
    let today = local_today();
    let date = match resolve_date(date.as_deref(), None, today) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("{}", e);
            return;
        }
    };
    let Some(store) = open_store(false) else { return };
    let label = DateWindow::starting(today).label_of(date);
    let view = DayView::build(store.tasks(), date);

    println!("Tasks for {} ({})", label, date);
    if view.is_empty() {
        println!("{}", NO_TASKS_PLACEHOLDER);
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Group").add_attribute(Attribute::Bold),
            Cell::new("Task").add_attribute(Attribute::Bold),
            Cell::new("Time").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);

    for group in view.groups() {
        let color = match group.kind {
            GroupKind::Scheduled => Color::Yellow,
            GroupKind::Anytime => Color::Cyan,
            GroupKind::Completed => Color::Green,
        };
        for t in group.tasks {
            table.add_row(vec![
                Cell::new(t.id),
                Cell::new(group.kind.label()).fg(color),
                Cell::new(&t.text),
                Cell::new(t.display_time().unwrap_or_default()),
                Cell::new(if t.completed { "Done" } else { "Pending" }).fg(color),
            ]);
        }
    }

    println!("{table}");
}

/// Prints the selectable days and their labels.
pub fn cmd_days() {
    let window = DateWindow::starting(local_today());
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["#", "Label", "Date"]);
    for (i, (date, label)) in window.iter().enumerate() {
        table.add_row(vec![i.to_string(), label, date.to_string()]);
    }
    println!("{table}");
}

/// Prints total / completed / pending counts for one day.
pub fn cmd_stats(date: Option<String>) {
    let today = local_today();
    let date = match resolve_date(date.as_deref(), None, today) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("{}", e);
            return;
        }
    };
    let Some(store) = open_store(false) else { return };
    let stats = DayView::build(store.tasks(), date).stats();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Total Tasks", "Completed", "Pending", "Progress"]);
    table.add_row(vec![
        Cell::new(stats.total),
        Cell::new(stats.completed).fg(Color::Green),
        Cell::new(stats.pending).fg(Color::Yellow),
        Cell::new(format!("{}%", stats.percent())),
    ]);
    println!("{table}");
}

/// Asks the assistant about one day and prints the reply.
///
/// Uses the local responder unless `remote` is set. Returns the reply text.
pub fn cmd_ask(message: String, date: Option<String>, remote: bool, silent: bool) -> Option<String> {
    let today = local_today();
    let date = match resolve_date(date.as_deref(), None, today) {
        Ok(d) => d,
        Err(e) => {
            if !silent { eprintln!("{}", e); }
            return None;
        }
    };
    let store = open_store(silent)?;
    let label = DateWindow::starting(today).label_of(date);

    let (text, suggestions) = if remote {
        let reply = LlmConfig::from_env()
            .and_then(|cfg| RemoteAssistant::new(&cfg))
            .and_then(|client| {
                let mut conversation = Conversation::new();
                conversation.push_user(message.as_str());
                let rt = tokio::runtime::Runtime::new()?;
                rt.block_on(client.reply(conversation.messages(), store.tasks(), date))
            });
        match reply {
            Ok(r) => (r.message, r.suggestions),
            Err(e) => {
                if !silent { eprintln!("{}", e); }
                return None;
            }
        }
    } else {
        let ctx = DayContext { tasks: store.tasks(), date, label: &label };
        let reply = respond(&message, &ctx, &mut RandomPicker);
        (reply.text, reply.suggestions)
    };

    if !silent {
        println!("{}", text);
        for (i, s) in suggestions.iter().enumerate() {
            println!("  [{}] {}", i + 1, s);
        }
    }
    Some(text)
}

/// Resets the database by deleting the task snapshot.
pub fn cmd_reset(force: bool) {
    if !force {
        print!("Are you sure you want to delete all tasks? This cannot be undone. [y/N] ");
        let mut input = String::new();
        if io::stdout().flush().is_err() || io::stdin().read_line(&mut input).is_err() {
            return;
        }
        if input.trim().to_lowercase() != "y" {
            println!("Aborted.");
            return;
        }
    }

    if let Err(e) = delete_database(&db_path()) {
        eprintln!("Failed to reset database: {}", e);
    } else {
        println!("Database reset successfully.");
    }
}
