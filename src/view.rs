use chrono::NaiveDate;

use crate::models::Task;

/// Shown in place of the list when the selected day has no tasks at all.
pub const NO_TASKS_PLACEHOLDER: &str = "No tasks for this day. Press 'a' to add one.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    Scheduled,
    Anytime,
    Completed,
}

impl GroupKind {
    pub fn label(&self) -> &'static str {
        match self {
            GroupKind::Scheduled => "Scheduled",
            GroupKind::Anytime => "Anytime",
            GroupKind::Completed => "Completed",
        }
    }
}

/// One labelled, non-empty section of a [`DayView`].
#[derive(Debug, Clone, Copy)]
pub struct TaskGroup<'a> {
    pub kind: GroupKind,
    pub tasks: &'a [Task],
}

/// Counts for one day, as shown by `stats` and the progress reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DayStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

impl DayStats {
    /// Completion percentage rounded to the nearest integer; 0 for an empty day.
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.completed as f64 / self.total as f64) * 100.0).round() as u32
    }
}

/// The tasks of one day split into render order:
/// timed pending (by time), untimed pending (storage order), then completed.
#[derive(Debug, Clone, Default)]
pub struct DayView {
    pub timed: Vec<Task>,
    pub untimed: Vec<Task>,
    pub completed: Vec<Task>,
}

impl DayView {
    pub fn build(tasks: &[Task], date: NaiveDate) -> DayView {
        let mut view = DayView::default();
        for t in tasks.iter().filter(|t| t.due_date == date) {
            if t.completed {
                view.completed.push(t.clone());
            } else if t.due_time.is_some() {
                view.timed.push(t.clone());
            } else {
                view.untimed.push(t.clone());
            }
        }
        // stable, so equal times keep storage order
        view.timed.sort_by_key(|t| t.due_time);
        view
    }

    /// Non-empty groups in render order.
    pub fn groups(&self) -> Vec<TaskGroup<'_>> {
        [
            (GroupKind::Scheduled, &self.timed),
            (GroupKind::Anytime, &self.untimed),
            (GroupKind::Completed, &self.completed),
        ]
        .into_iter()
        .filter(|(_, tasks)| !tasks.is_empty())
        .map(|(kind, tasks)| TaskGroup { kind, tasks: tasks.as_slice() })
        .collect()
    }

    /// Every task of the day in render order.
    pub fn ordered(&self) -> impl Iterator<Item = &Task> + '_ {
        self.timed.iter().chain(self.untimed.iter()).chain(self.completed.iter())
    }

    /// Pending tasks, timed first.
    pub fn pending(&self) -> impl Iterator<Item = &Task> + '_ {
        self.timed.iter().chain(self.untimed.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.timed.is_empty() && self.untimed.is_empty() && self.completed.is_empty()
    }

    pub fn stats(&self) -> DayStats {
        let pending = self.timed.len() + self.untimed.len();
        DayStats {
            total: pending + self.completed.len(),
            completed: self.completed.len(),
            pending,
        }
    }
}
