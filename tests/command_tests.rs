use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use taskbuddy::commands::*;
use taskbuddy::config::{db_path, ENV_DB};
use taskbuddy::dates::local_today;
use taskbuddy::storage::{delete_database, load_tasks, save_tasks};
use taskbuddy::Error;

// Use a mutex to ensure tests run serially since they modify the environment variable
static TEST_MUTEX: Mutex<()> = Mutex::new(());

fn with_test_db<F>(f: F)
where
    F: FnOnce(PathBuf),
{
    let _guard = TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("tasks.json");
    env::set_var(ENV_DB, &path);

    f(path);

    env::remove_var(ENV_DB);
}

#[test]
fn test_db_path_honours_env() {
    with_test_db(|path| {
        assert_eq!(db_path(), path);
    });
}

#[test]
fn test_add_persists() {
    with_test_db(|path| {
        let id = cmd_add("Study math".into(), None, Some(1), Some("09:00".into()), true).unwrap();
        let tasks = load_tasks(&path).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, id);
        assert_eq!(tasks[0].due_date, local_today() + chrono::Duration::days(1));
        assert_eq!(tasks[0].display_time().as_deref(), Some("09:00 AM"));
    });
}

#[test]
fn test_add_rejections_leave_snapshot_alone() {
    with_test_db(|path| {
        assert!(cmd_add("   ".into(), None, None, None, true).is_none());
        assert!(cmd_add("Too late".into(), None, Some(7), None, true).is_none());
        assert!(cmd_add("Bad time".into(), None, None, Some("25:61".into()), true).is_none());
        assert!(cmd_add("Bad date".into(), Some("tomorrow".into()), None, None, true).is_none());
        assert!(!path.exists());
    });
}

#[test]
fn test_toggle_and_remove() {
    with_test_db(|path| {
        let a = cmd_add("Call mom".into(), None, None, None, true).unwrap();
        let b = cmd_add("Clean kitchen".into(), None, None, None, true).unwrap();
        assert!(b > a);

        cmd_toggle(a, true);
        assert!(load_tasks(&path).unwrap()[0].completed);
        cmd_toggle(a, true);
        assert!(!load_tasks(&path).unwrap()[0].completed);

        cmd_remove(a, true);
        let tasks = load_tasks(&path).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, b);

        // unknown ids change nothing
        cmd_toggle(999, true);
        cmd_remove(999, true);
        assert_eq!(load_tasks(&path).unwrap(), tasks);
    });
}

#[test]
fn test_ids_continue_after_reload() {
    with_test_db(|_path| {
        let a = cmd_add("one".into(), None, None, None, true).unwrap();
        cmd_remove(a, true);
        let b = cmd_add("two".into(), None, None, None, true).unwrap();
        let c = cmd_add("three".into(), None, None, None, true).unwrap();
        assert!(c > b);
    });
}

#[test]
fn test_ask_local() {
    with_test_db(|_path| {
        cmd_add("Study math".into(), None, None, Some("09:00".into()), true).unwrap();
        let id = cmd_add("Call mom".into(), None, None, None, true).unwrap();
        cmd_toggle(id, true);

        let text = cmd_ask("Show my tasks".into(), None, false, true).unwrap();
        assert!(text.contains("📋 Study math (09:00 AM)"), "{text}");
        assert!(text.contains("✅ Call mom"));

        let text = cmd_ask("progress".into(), None, false, true).unwrap();
        assert_eq!(text, "Your progress today: 1/2 tasks completed (50%)! Keep going! 💪");
    });
}

#[test]
fn test_ask_remote_without_config_fails() {
    with_test_db(|_path| {
        let saved: Vec<(&str, Option<String>)> = ["OPENAI_API_KEY", "ANTHROPIC_API_KEY", "GOOGLE_API_KEY", "COHERE_API_KEY", "LLM_API_KEY"]
            .into_iter()
            .map(|k| (k, env::var(k).ok()))
            .collect();
        for (k, _) in &saved {
            env::remove_var(k);
        }

        assert!(cmd_ask("hello".into(), None, true, true).is_none());

        for (k, v) in saved {
            if let Some(v) = v {
                env::set_var(k, v);
            }
        }
    });
}

#[test]
fn test_resolve_date() {
    let today = local_today();
    assert_eq!(resolve_date(None, None, today), Ok(today));
    assert_eq!(resolve_date(None, Some(3), today), Ok(today + chrono::Duration::days(3)));
    assert_eq!(
        resolve_date(Some("2024-02-29"), None, today),
        Ok(chrono::NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
    );
    assert!(resolve_date(Some("29/02/2024"), None, today).is_err());
}

#[test]
fn test_resolve_date_far_offset_is_rejected() {
    let today = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let err = resolve_date(None, Some(u32::MAX), today).unwrap_err();
    assert!(err.contains("outside the seven-day window"), "{err}");
}

#[test]
fn test_add_outside_window_by_date_or_offset() {
    with_test_db(|path| {
        let yesterday = (local_today() - chrono::Duration::days(1)).format("%Y-%m-%d").to_string();
        let next_week = (local_today() + chrono::Duration::days(7)).format("%Y-%m-%d").to_string();
        assert!(cmd_add("Past".into(), Some(yesterday), None, None, true).is_none());
        assert!(cmd_add("Later".into(), Some(next_week), None, None, true).is_none());
        assert!(cmd_add("Far".into(), None, Some(u32::MAX), None, true).is_none());
        assert!(!path.exists());

        let last = (local_today() + chrono::Duration::days(6)).format("%Y-%m-%d").to_string();
        assert!(cmd_add("Last day".into(), Some(last), None, None, true).is_some());
    });
}

#[test]
fn test_storage_edge_cases() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    assert!(load_tasks(&path).unwrap().is_empty());

    fs::write(&path, "  \n").unwrap();
    assert!(load_tasks(&path).unwrap().is_empty());

    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(load_tasks(&path), Err(Error::Json(_))));

    save_tasks(&path, &[]).unwrap();
    assert!(load_tasks(&path).unwrap().is_empty());
    delete_database(&path).unwrap();
    assert!(!path.exists());
    delete_database(&path).unwrap();
}
