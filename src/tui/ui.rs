use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Tabs, Wrap},
    Frame,
};

use super::app::{App, DisplayItem, InputMode};
use crate::assistant::QUICK_ACTIONS;
use crate::view::{GroupKind, NO_TASKS_PLACEHOLDER};

pub fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Day tabs
            Constraint::Min(0),    // Tasks + chat
            Constraint::Length(3), // Help
        ].as_ref())
        .split(f.area());

    render_tabs(f, app, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)].as_ref())
        .split(chunks[1]);

    render_tasks(f, app, body[0]);
    render_chat(f, app, body[1]);
    render_help(f, app, chunks[2]);

    if app.input_mode == InputMode::Adding {
        let area = centered_rect(60, 3, f.area());
        f.render_widget(Clear, area);
        let title = match app.add_state.step {
            0 => "Add Task: Enter Text".to_string(),
            _ => format!("Add Task \"{}\": Enter Time HH:MM (Optional)", app.add_state.text),
        };
        let input = Paragraph::new(app.input_buffer.as_str())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(input, area);
    }
}

fn render_tabs(f: &mut Frame, app: &App, area: Rect) {
    let window = app.window();
    let titles: Vec<Line> = window.iter().map(|(_, label)| Line::from(label)).collect();
    let mut tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title("Task Buddy 🍌"))
        .style(Style::default().fg(Color::Gray))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    if let Some(i) = app.selected_tab() {
        tabs = tabs.select(i);
    }
    f.render_widget(tabs, area);
}

fn render_tasks(f: &mut Frame, app: &mut App, area: Rect) {
    let items: Vec<ListItem> = app
        .display_items
        .iter()
        .map(|item| match item {
            DisplayItem::GroupHeader(kind, count) => {
                let color = match kind {
                    GroupKind::Scheduled => Color::Yellow,
                    GroupKind::Anytime => Color::Cyan,
                    GroupKind::Completed => Color::Green,
                };
                ListItem::new(Line::from(Span::styled(
                    format!("{} ({})", kind.label(), count),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                )))
            }
            DisplayItem::Task(t) => {
                let check = if t.completed { "[x]" } else { "[ ]" };
                let time = t.display_time().map(|s| format!("{}  ", s)).unwrap_or_default();
                let style = if t.completed {
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(vec![
                    Span::raw(format!("  {} ", check)),
                    Span::styled(time, Style::default().fg(Color::Yellow)),
                    Span::styled(t.text.clone(), style),
                ]))
            }
            DisplayItem::Placeholder => ListItem::new(Line::from(Span::styled(
                NO_TASKS_PLACEHOLDER,
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ))),
        })
        .collect();

    let stats = app.view.stats();
    let title = format!(
        "{} - {}/{} done ({}%)",
        app.window().label_of(app.selected_date),
        stats.completed,
        stats.total,
        stats.percent()
    );
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    f.render_stateful_widget(list, area, &mut app.state);
}

fn render_chat(f: &mut Frame, app: &App, area: Rect) {
    let chips = app.conversation.latest_suggestions();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(chips.len().min(9) as u16 + 2),
            Constraint::Length(3),
        ].as_ref())
        .split(area);

    let mut lines: Vec<Line> = Vec::new();
    for m in app.conversation.messages() {
        let (who, style) = if m.is_user {
            ("You", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        } else {
            ("Buddy", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{} ", who), style),
            Span::styled(m.timestamp.format("%H:%M").to_string(), Style::default().fg(Color::DarkGray)),
        ]));
        for text_line in m.text.lines() {
            lines.push(Line::from(text_line.to_string()));
        }
        lines.push(Line::from(""));
    }
    if app.is_loading() {
        lines.push(Line::from(Span::styled(
            "Buddy is thinking...",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    // keep the newest message in view
    let inner_width = chunks[0].width.saturating_sub(2).max(1) as usize;
    let inner_height = chunks[0].height.saturating_sub(2) as usize;
    let wrapped: usize = lines.iter().map(|l| l.width().max(1).div_ceil(inner_width)).sum();
    let scroll = wrapped.saturating_sub(inner_height) as u16;

    let mode = if app.use_remote { "remote" } else { "local" };
    let messages = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(Block::default().borders(Borders::ALL).title(format!("Chat ({})", mode)));
    f.render_widget(messages, chunks[0]);

    let chip_lines: Vec<Line> = chips
        .iter()
        .take(9)
        .enumerate()
        .map(|(i, s)| {
            Line::from(vec![
                Span::styled(format!("[{}] ", i + 1), Style::default().fg(Color::Yellow)),
                Span::raw(s.to_string()),
            ])
        })
        .collect();
    let chip_block = Paragraph::new(chip_lines)
        .style(Style::default().fg(Color::Blue))
        .block(Block::default().borders(Borders::ALL).title("Suggestions"));
    f.render_widget(chip_block, chunks[1]);

    let input_style = if app.input_mode == InputMode::Chatting {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray)
    };
    let input = Paragraph::new(app.chat_input.as_str())
        .style(input_style)
        .block(Block::default().borders(Borders::ALL).title("Ask for help or motivation..."));
    f.render_widget(input, chunks[2]);
}

fn render_help(f: &mut Frame, app: &App, area: Rect) {
    let help_text = match app.input_mode {
        InputMode::Normal => {
            let quick: Vec<String> = QUICK_ACTIONS
                .iter()
                .enumerate()
                .map(|(i, (label, _))| format!("F{}: {}", i + 1, label))
                .collect();
            format!(
                "q: Quit | ←/→: Day | a: Add | Space: Done | d: Del | i: Chat | 1-9: Suggestion | x: Clear Chat | r: Remote | {}",
                quick.join(" | ")
            )
        }
        InputMode::Adding => "Enter: Next Step | Esc: Cancel".to_string(),
        InputMode::Chatting => "Enter: Send | Esc: Back to Tasks".to_string(),
    };
    let text = match &app.status {
        Some(status) => format!("{}  [{}]", help_text, status),
        None => help_text,
    };

    let help = Paragraph::new(text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, area);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(r.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Length(r.height.saturating_sub(height) / 2),
        ].as_ref())
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ].as_ref())
        .split(popup_layout[1])[1]
}
