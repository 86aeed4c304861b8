//! # Task Buddy
//!
//! A terminal to-do list for the coming week, with a chat assistant.
//!
//! ## Usage
//!
//! ### Interactive Mode (TUI)
//!
//! Run without arguments to open the day tabs, the task list and the chat panel:
//!
//! ```bash
//! taskbuddy
//! # or explicitly, keeping tasks in memory only
//! taskbuddy ui --ephemeral
//! ```
//!
//! #### TUI Key Bindings
//!
//! *   `q`: Quit
//! *   `←`/`→` (or `h`/`l`, `Tab`): Switch day
//! *   `a`: Add task to the selected day (text, then optional `HH:MM`)
//! *   `Space`: Toggle done
//! *   `d`: Delete selected task
//! *   `i`: Type in the chat, `Enter` to send, `Esc` to go back
//! *   `1`-`9`: Click a suggestion chip
//! *   `F1`-`F4`: Quick prompts (tasks, suggestions, motivation, progress)
//! *   `x`: Clear the chat
//! *   `r`: Switch between the local and the remote assistant
//!
//! ### Command Line Interface (CLI)
//!
//! ```bash
//! taskbuddy add "Study math" --in 1 --time 09:00
//! taskbuddy list --date 2025-12-01
//! taskbuddy toggle <ID>
//! taskbuddy ask "how is my progress?"
//! taskbuddy ask "plan my afternoon" --remote
//! ```
//!
//! ## Remote assistant
//!
//! Set `LLM_API_URL` and one of `OPENAI_API_KEY`, `ANTHROPIC_API_KEY`,
//! `GOOGLE_API_KEY`, `COHERE_API_KEY` or `LLM_API_KEY` (checked in that order).
//! `LLM_API_STYLE=chat` sends OpenAI-style chat completions instead and
//! defaults the URL to OpenAI; `LLM_MODEL` picks the model.
//!
//! ## Data Storage
//!
//! Tasks are saved to `~/.local/share/taskbuddy/tasks.json` (or the platform
//! equivalent). Override with `TASKBUDDY_DB`. Logs go to `taskbuddy.log` in
//! the same directory; set `RUST_LOG` or pass `-v` for more detail.

use std::io;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing::warn;

use taskbuddy::commands::*;
use taskbuddy::config::{db_path, LlmConfig};
use taskbuddy::logging;
use taskbuddy::storage::load_tasks;
use taskbuddy::tui::run_tui;

#[derive(Parser)]
#[command(name = "taskbuddy")]
#[command(about = "Weekly terminal to-do list with a chat assistant", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task within the next seven days
    Add {
        /// Task text (quoted if it has spaces)
        text: String,
        /// Due date in YYYY-MM-DD (defaults to today)
        #[arg(short, long, conflicts_with = "in_days")]
        date: Option<String>,
        /// Due in N days from today (0-6)
        #[arg(short = 'n', long = "in", value_parser = clap::value_parser!(u32).range(0..7))]
        in_days: Option<u32>,
        /// Due time in HH:MM
        #[arg(short, long)]
        time: Option<String>,
    },
    /// List one day's tasks
    List {
        /// Day in YYYY-MM-DD (defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Toggle a task between pending and done
    Toggle {
        id: u64,
    },
    /// Remove a task
    Remove {
        id: u64,
    },
    /// Show the selectable days
    Days,
    /// Show completion statistics for one day
    Stats {
        /// Day in YYYY-MM-DD (defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Ask the assistant something about one day
    Ask {
        message: String,
        /// Day in YYYY-MM-DD (defaults to today)
        #[arg(short, long)]
        date: Option<String>,
        /// Use the configured LLM endpoint instead of the built-in responder
        #[arg(short, long)]
        remote: bool,
    },
    /// Reset the database (delete all tasks)
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
    /// Open interactive TUI (tasks are saved to the snapshot unless --ephemeral)
    Ui {
        /// Keep tasks in memory only, so they are lost when the UI closes
        #[arg(short, long)]
        ephemeral: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("Logging disabled: {}", e);
    }

    match cli.command {
        Some(Commands::Add { text, date, in_days, time }) => {
            cmd_add(text, date, in_days, time, false);
        }
        Some(Commands::List { date }) => cmd_list(date),
        Some(Commands::Toggle { id }) => cmd_toggle(id, false),
        Some(Commands::Remove { id }) => cmd_remove(id, false),
        Some(Commands::Days) => cmd_days(),
        Some(Commands::Stats { date }) => cmd_stats(date),
        Some(Commands::Ask { message, date, remote }) => {
            cmd_ask(message, date, remote, false);
        }
        Some(Commands::Reset { force }) => cmd_reset(force),
        Some(Commands::Completions { shell }) => {
            let shell_enum = match shell.as_str() {
                "bash" => Shell::Bash,
                "zsh" => Shell::Zsh,
                "fish" => Shell::Fish,
                "powershell" => Shell::PowerShell,
                "elvish" => Shell::Elvish,
                _ => {
                    eprintln!("Unsupported shell: {}", shell);
                    return;
                }
            };
            let mut cmd = Cli::command();
            generate(shell_enum, &mut cmd, "taskbuddy", &mut io::stdout());
        }
        Some(Commands::Ui { ephemeral }) => open_ui(ephemeral),
        None => open_ui(false),
    }
}

fn open_ui(ephemeral: bool) {
    let (tasks, snapshot) = if ephemeral {
        (Vec::new(), None)
    } else {
        let path = db_path();
        match load_tasks(&path) {
            Ok(tasks) => (tasks, Some(path)),
            Err(e) => {
                eprintln!("Failed to load tasks from {}: {}", path.display(), e);
                return;
            }
        }
    };
    let llm = match LlmConfig::from_env() {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            warn!(error = %e, "remote assistant unavailable");
            None
        }
    };
    if let Err(e) = run_tui(tasks, snapshot, llm) {
        eprintln!("Error running TUI: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_days_is_limited_to_the_window() {
        Cli::command().debug_assert();
        assert!(Cli::try_parse_from(["taskbuddy", "add", "x", "--in", "6"]).is_ok());
        assert!(Cli::try_parse_from(["taskbuddy", "add", "x", "--in", "7"]).is_err());
        assert!(Cli::try_parse_from(["taskbuddy", "add", "x", "--in", "4000000000"]).is_err());
    }

    #[test]
    fn ui_help_mentions_ephemeral_mode() {
        let cmd = Cli::command();
        let ui = cmd.find_subcommand("ui").unwrap();
        assert!(ui.get_about().unwrap().to_string().contains("--ephemeral"));
    }
}
