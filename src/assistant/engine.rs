//! Rule-based replies for the chat panel.
//!
//! Input is matched case-insensitively against an ordered list of keyword
//! rules; the first rule whose keywords appear anywhere in the text answers.

use chrono::NaiveDate;
use rand::Rng;

use crate::models::{Suggestion, Task};
use crate::view::DayStats;

/// Source of the pseudo-random choices made by the engine.
///
/// `pick(len)` must return an index below `len`; it is never called with 0.
pub trait Picker {
    fn pick(&mut self, len: usize) -> usize;
}

impl<F> Picker for F
where
    F: FnMut(usize) -> usize,
{
    fn pick(&mut self, len: usize) -> usize {
        self(len).min(len - 1)
    }
}

/// Thread-local RNG backed picker used outside of tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPicker;

impl Picker for RandomPicker {
    fn pick(&mut self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// What the engine knows about the selected day.
#[derive(Debug, Clone, Copy)]
pub struct DayContext<'a> {
    /// All tasks in storage order; the engine filters to `date` itself.
    pub tasks: &'a [Task],
    pub date: NaiveDate,
    /// "Today", "Tomorrow" or a short date, from the date window.
    pub label: &'a str,
}

impl<'a> DayContext<'a> {
    fn day_tasks(&self) -> impl Iterator<Item = &'a Task> + '_ {
        let date = self.date;
        self.tasks.iter().filter(move |t| t.due_date == date)
    }

    fn pending(&self) -> Vec<&'a Task> {
        self.day_tasks().filter(|t| t.is_pending()).collect()
    }

    fn stats(&self) -> DayStats {
        let total = self.day_tasks().count();
        let completed = self.day_tasks().filter(|t| t.completed).count();
        DayStats { total, completed, pending: total - completed }
    }

    /// "today" / "tomorrow" read naturally mid-sentence; dates are prefixed.
    fn phrase(&self) -> String {
        match self.label {
            "Today" | "Tomorrow" => self.label.to_lowercase(),
            other => format!("on {}", other),
        }
    }
}

/// An assistant answer with optional follow-up chips.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub suggestions: Vec<Suggestion>,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Reply { text: text.into(), suggestions: Vec::new() }
    }

    fn with(text: impl Into<String>, suggestions: Vec<Suggestion>) -> Self {
        Reply { text: text.into(), suggestions }
    }
}

pub const MOTIVATIONAL_QUOTES: [&str; 8] = [
    "You're doing great! Every task completed is a step forward! 🚀",
    "Progress, not perfection! Keep going! 💪",
    "You've got this! Small steps lead to big achievements! ⭐",
    "Every completed task makes you stronger! Keep it up! 🔥",
    "Success is the sum of small efforts repeated daily! 🌟",
    "You're building momentum with each task! Keep going! 🎯",
    "Remember: Rome wasn't built in a day, but every stone counts! 🏛️",
    "You're closer to your goals than you think! Don't stop now! 🎉",
];

pub const FALLBACK_REPLIES: [&str; 3] = [
    "I'm here to help you with your tasks! Ask me for suggestions, motivation, or progress updates! 🍌",
    "Try asking me for help with your tasks, motivation, or to check your progress! 💪",
    "I can help you complete your tasks with suggestions and encouragement! What would you like to know? ✨",
];

/// Topic keyword found in a task's text, and the tips offered for it.
static TOPIC_TIPS: [(&str, [&str; 4]); 7] = [
    ("study", ["Break it into 25-minute Pomodoro sessions", "Create a study playlist", "Find a quiet space", "Set specific learning goals"]),
    ("work", ["Prioritize by urgency and importance", "Take breaks every hour", "Minimize distractions", "Set clear deadlines"]),
    ("exercise", ["Start with a 5-minute warm-up", "Find a workout buddy", "Track your progress", "Choose activities you enjoy"]),
    ("clean", ["Start with one room at a time", "Play upbeat music", "Set a timer for 15 minutes", "Make it a game"]),
    ("cook", ["Prep ingredients first", "Try a new recipe", "Cook with friends", "Make extra for leftovers"]),
    ("read", ["Find a comfortable spot", "Set a daily reading goal", "Join a book club", "Try audiobooks"]),
    ("write", ["Set a word count goal", "Write in short bursts", "Eliminate distractions", "Join a writing group"]),
];

static DEFAULT_TIPS: [&str; 4] = [
    "Break it into smaller steps",
    "Set a specific deadline",
    "Find an accountability partner",
    "Reward yourself when done",
];

/// Tips for a task, chosen by the first topic keyword its text contains.
pub fn tips_for(task_text: &str) -> &'static [&'static str] {
    let text = task_text.to_lowercase();
    TOPIC_TIPS
        .iter()
        .find(|(topic, _)| text.contains(topic))
        .map(|(_, tips)| tips.as_slice())
        .unwrap_or(&DEFAULT_TIPS)
}

type Handler = fn(&DayContext<'_>, &mut dyn Picker) -> Reply;

/// Dispatch table, in priority order.
const RULES: [(&[&str], Handler); 5] = [
    (&["help", "suggestion"], suggest_tips),
    (&["list", "show", "tasks"], list_tasks),
    (&["complete", "done"], offer_completions),
    (&["motivation", "encourage"], motivate),
    (&["progress", "status"], report_progress),
];

/// Answers `input` for the selected day.
pub fn respond(input: &str, ctx: &DayContext<'_>, picker: &mut dyn Picker) -> Reply {
    let input = input.to_lowercase();
    let rule = RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| input.contains(k)));
    match rule {
        Some((_, handler)) => handler(ctx, picker),
        None => Reply::text(FALLBACK_REPLIES[picker.pick(FALLBACK_REPLIES.len())]),
    }
}

fn suggest_tips(ctx: &DayContext<'_>, picker: &mut dyn Picker) -> Reply {
    let pending = ctx.pending();
    if pending.is_empty() {
        return Reply::text(format!(
            "You don't have any pending tasks {}! Time to add some or enjoy your free time! 🎉",
            ctx.phrase()
        ));
    }
    let task = pending[picker.pick(pending.len())];
    Reply::with(
        format!("Here are some suggestions for \"{}\":", task.text),
        tips_for(&task.text).iter().map(|t| Suggestion::prompt(*t)).collect(),
    )
}

fn list_tasks(ctx: &DayContext<'_>, _: &mut dyn Picker) -> Reply {
    let lines: Vec<String> = ctx.day_tasks().map(task_line).collect();
    if lines.is_empty() {
        return Reply::text(format!(
            "No tasks scheduled {}! Add some tasks to get started! 📝",
            ctx.phrase()
        ));
    }
    let suggestions = if ctx.pending().is_empty() {
        Vec::new()
    } else {
        vec![Suggestion::prompt("Complete a task"), Suggestion::prompt("Get suggestions")]
    };
    Reply::with(
        format!("Here are your tasks {}:\n\n{}", ctx.phrase(), lines.join("\n")),
        suggestions,
    )
}

/// `✅ Call mom` or `📋 Study math (09:00 AM)`
pub fn task_line(task: &Task) -> String {
    let marker = if task.completed { "✅" } else { "📋" };
    match task.display_time() {
        Some(time) => format!("{} {} ({})", marker, task.text, time),
        None => format!("{} {}", marker, task.text),
    }
}

fn offer_completions(ctx: &DayContext<'_>, _: &mut dyn Picker) -> Reply {
    let pending = ctx.pending();
    if pending.is_empty() {
        return Reply::text("You're all caught up! 🎉");
    }
    let plural = if pending.len() > 1 { "s" } else { "" };
    Reply::with(
        format!(
            "You have {} task{} left {}. Click on any task to mark it complete! 💪",
            pending.len(),
            plural,
            ctx.phrase()
        ),
        pending
            .iter()
            .take(3)
            .map(|t| Suggestion::Complete { task_id: t.id, text: t.text.clone() })
            .collect(),
    )
}

fn motivate(_: &DayContext<'_>, picker: &mut dyn Picker) -> Reply {
    Reply::text(MOTIVATIONAL_QUOTES[picker.pick(MOTIVATIONAL_QUOTES.len())])
}

fn report_progress(ctx: &DayContext<'_>, _: &mut dyn Picker) -> Reply {
    let stats = ctx.stats();
    if stats.total == 0 {
        return Reply::text(format!(
            "No tasks scheduled {}! Add some tasks to start tracking your progress! 📝",
            ctx.phrase()
        ));
    }
    let cheer = if stats.completed == stats.total { "🎉 Perfect!" } else { "Keep going! 💪" };
    Reply::text(format!(
        "Your progress {}: {}/{} tasks completed ({}%)! {}",
        ctx.phrase(),
        stats.completed,
        stats.total,
        stats.percent(),
        cheer
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_matching_topic_wins() {
        assert_eq!(tips_for("Study for the reading quiz")[0], "Break it into 25-minute Pomodoro sessions");
        assert_eq!(tips_for("Taxes")[0], "Break it into smaller steps");
        // keywords match anywhere in the text
        assert_eq!(tips_for("Homework")[0], "Prioritize by urgency and importance");
    }

    #[test]
    fn closure_picker_is_clamped() {
        let mut p = |_len: usize| 99usize;
        assert_eq!(Picker::pick(&mut p, 3), 2);
    }
}
