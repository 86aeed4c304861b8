pub mod app;
pub mod ui;

use std::path::PathBuf;
use std::time::Duration;
use std::{error::Error, io};

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::config::LlmConfig;
use crate::models::Task;
use app::{App, InputMode};
use ui::ui;

/// How often the loop wakes up to collect remote replies and notice a new day.
const TICK: Duration = Duration::from_millis(200);

pub fn run_tui(tasks: Vec<Task>, snapshot: Option<PathBuf>, llm: Option<LlmConfig>) -> Result<(), Box<dyn Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut app = App::new(tasks, snapshot, llm);

    // Run loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        app.poll_remote();
        if !event::poll(TICK)? {
            app.tick();
            continue;
        }

        let Event::Key(key) = event::read()? else { continue };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match app.input_mode {
            InputMode::Normal => {
                app.status = None;
                match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Down | KeyCode::Char('j') => app.next(),
                    KeyCode::Up | KeyCode::Char('k') => app.previous(),
                    KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => app.next_day(),
                    KeyCode::Left | KeyCode::Char('h') | KeyCode::BackTab => app.previous_day(),
                    KeyCode::Char(' ') => app.toggle_selected(),
                    KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
                    KeyCode::Char('a') => app.start_add(),
                    KeyCode::Char('i') | KeyCode::Char('/') => app.start_chat(),
                    KeyCode::Char('x') => app.clear_chat(),
                    KeyCode::Char('r') => app.toggle_remote(),
                    KeyCode::Char(c @ '1'..='9') => app.click_suggestion(c as usize - '1' as usize),
                    KeyCode::F(n @ 1..=4) => app.quick_action(n as usize - 1),
                    _ => {}
                }
            }
            InputMode::Adding => match key.code {
                KeyCode::Enter => app.handle_add_input(),
                KeyCode::Esc => app.cancel_input(),
                KeyCode::Char(c) => app.input_buffer.push(c),
                KeyCode::Backspace => {
                    app.input_buffer.pop();
                }
                _ => {}
            },
            InputMode::Chatting => match key.code {
                KeyCode::Enter => app.send_chat(),
                KeyCode::Esc => app.input_mode = InputMode::Normal,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(()),
                KeyCode::Char(c) => app.chat_input.push(c),
                KeyCode::Backspace => {
                    app.chat_input.pop();
                }
                _ => {}
            },
        }
    }
}
