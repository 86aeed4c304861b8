use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use crate::dates::DateWindow;
use crate::error::{Error, Result};
use crate::models::{NewTask, Task, TaskId};

/// A change that has just been applied to a [`TaskStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    Added(TaskId),
    Toggled(TaskId),
    Removed(TaskId),
}

type Observer = Box<dyn FnMut(StoreEvent)>;

/// In-memory owner of all tasks.
///
/// Other components get read-only slices; every mutation goes through
/// `add`, `toggle`, `complete` or `remove` and is reported to observers.
pub struct TaskStore {
    tasks: Vec<Task>,
    next_id: TaskId,
    observers: Vec<Observer>,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    pub fn new() -> Self {
        TaskStore { tasks: Vec::new(), next_id: 1, observers: Vec::new() }
    }

    /// Seeds the store from a snapshot. Ids keep counting after the highest one seen.
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let next_id = tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        TaskStore { tasks, next_id, observers: Vec::new() }
    }

    /// Registers a callback run after every effective mutation.
    pub fn subscribe(&mut self, observer: impl FnMut(StoreEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn on_date(&self, date: NaiveDate) -> impl Iterator<Item = &Task> + '_ {
        self.tasks.iter().filter(move |t| t.due_date == date)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Creates a task due within the window that starts at `today`.
    ///
    /// Rejects blank text and dates outside `today ..= today + 6`.
    pub fn add(&mut self, new: NewTask, today: NaiveDate) -> Result<TaskId> {
        let text = new.text.trim();
        if text.is_empty() {
            debug!("rejected task with empty text");
            return Err(Error::Validation("task text is empty".into()));
        }
        let window = DateWindow::starting(today);
        if !window.contains(new.due_date) {
            debug!(due = %new.due_date, "rejected task outside the date window");
            return Err(Error::Validation(format!(
                "due date {} is outside {} ..= {}",
                new.due_date,
                window.today(),
                window.last()
            )));
        }

        let id = self.next_id;
        self.next_id += 1;
        self.tasks.push(Task {
            id,
            text: text.to_string(),
            completed: false,
            due_date: new.due_date,
            due_time: new.due_time,
            created_at: Local::now(),
        });
        info!(id, due = %new.due_date, "task added");
        self.notify(StoreEvent::Added(id));
        Ok(id)
    }

    /// Flips `completed`. Returns `false` when the id is unknown.
    pub fn toggle(&mut self, id: TaskId) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        task.completed = !task.completed;
        info!(id, completed = task.completed, "task toggled");
        self.notify(StoreEvent::Toggled(id));
        true
    }

    /// Marks a pending task done. Already-completed or unknown tasks are left alone.
    pub fn complete(&mut self, id: TaskId) -> bool {
        match self.get(id) {
            Some(t) if t.is_pending() => self.toggle(id),
            _ => false,
        }
    }

    /// Deletes by id. Returns `false` when the id is unknown.
    pub fn remove(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            return false;
        }
        info!(id, "task removed");
        self.notify(StoreEvent::Removed(id));
        true
    }

    fn notify(&mut self, event: StoreEvent) {
        for observer in self.observers.iter_mut() {
            observer(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn observers_see_each_effective_mutation() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut store = TaskStore::new();
        let sink = Rc::clone(&seen);
        store.subscribe(move |e| sink.borrow_mut().push(e));

        let id = store.add(NewTask::new("Read", today()), today()).unwrap();
        store.toggle(id);
        store.toggle(999);
        store.remove(999);
        store.remove(id);

        assert_eq!(
            *seen.borrow(),
            vec![StoreEvent::Added(id), StoreEvent::Toggled(id), StoreEvent::Removed(id)]
        );
    }

    #[test]
    fn ids_are_not_reused_after_removal() {
        let mut store = TaskStore::new();
        let a = store.add(NewTask::new("a", today()), today()).unwrap();
        store.remove(a);
        let b = store.add(NewTask::new("b", today()), today()).unwrap();
        assert!(b > a);
    }

    #[test]
    fn complete_never_reopens() {
        let mut store = TaskStore::new();
        let id = store.add(NewTask::new("a", today()), today()).unwrap();
        assert!(store.complete(id));
        assert!(!store.complete(id));
        assert!(store.get(id).unwrap().completed);
    }
}
