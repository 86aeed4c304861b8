/// Tiered cheer for the selected day's completion rate.
///
/// Returns `None` when the day has no tasks, so nothing is announced.
pub fn encouragement(completed: usize, total: usize) -> Option<&'static str> {
    if total == 0 {
        return None;
    }
    let rate = completed as f64 / total as f64 * 100.0;
    let msg = if completed == total {
        "🎉 AMAZING! You've completed ALL your tasks for today! You're unstoppable! 🏆"
    } else if rate >= 75.0 {
        "🔥 Fantastic work! You're almost done! The finish line is in sight! 🏁"
    } else if rate >= 50.0 {
        "💪 Great progress! You're more than halfway there! Keep that momentum going! 🚀"
    } else if rate >= 25.0 {
        "⭐ Good start! Every task completed is progress! You're building great habits! 🌟"
    } else {
        "🌟 Ready to tackle your tasks? Remember, every journey begins with a single step! 🚀"
    };
    Some(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers() {
        assert_eq!(encouragement(0, 0), None);
        assert!(encouragement(0, 4).unwrap().starts_with("🌟 Ready"));
        assert!(encouragement(1, 4).unwrap().starts_with("⭐ Good start"));
        assert!(encouragement(2, 4).unwrap().starts_with("💪 Great progress"));
        assert!(encouragement(3, 4).unwrap().starts_with("🔥 Fantastic"));
        assert!(encouragement(4, 4).unwrap().starts_with("🎉 AMAZING"));
    }

    #[test]
    fn boundaries_are_inclusive() {
        // 1/3 is above 25%, 2/3 is above 50% but below 75%
        assert!(encouragement(1, 3).unwrap().starts_with("⭐"));
        assert!(encouragement(2, 3).unwrap().starts_with("💪"));
        assert!(encouragement(1, 5).unwrap().starts_with("🌟"));
    }
}
