use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::error::Result;
use crate::models::Task;

/// Loads all tasks from a JSON snapshot.
///
/// Returns an empty vector if the file does not exist. A file that exists but
/// does not parse is an error, so it is never silently overwritten.
pub fn load_tasks(path: &Path) -> Result<Vec<Task>> {
    if !path.exists() {
        debug!(path = %path.display(), "no snapshot yet");
        return Ok(Vec::new());
    }
    let mut f = OpenOptions::new().read(true).open(path)?;
    let mut s = String::new();
    f.read_to_string(&mut s)?;
    if s.trim().is_empty() {
        return Ok(Vec::new());
    }
    let tasks: Vec<Task> = serde_json::from_str(&s)?;
    debug!(path = %path.display(), count = tasks.len(), "snapshot loaded");
    Ok(tasks)
}

/// Saves the given list of tasks, overwriting the existing file.
pub fn save_tasks(path: &Path, tasks: &[Task]) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir)?;
        }
    }
    let s = serde_json::to_string_pretty(tasks)?;
    let mut f = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    f.write_all(s.as_bytes())?;
    debug!(path = %path.display(), count = tasks.len(), "snapshot saved");
    Ok(())
}

/// Deletes the snapshot file.
pub fn delete_database(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path)?;
        info!(path = %path.display(), "snapshot deleted");
    }
    Ok(())
}
