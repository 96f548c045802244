pub mod widgets;

use crate::app::{App, Focus, Mode};
use crate::share::Launcher;
use crate::store::PreferenceStore;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    Frame, Terminal,
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use std::io;
use std::time::Duration;

const TICK: Duration = Duration::from_millis(250);
const POSTING_WARNING: &str =
    "Post responsibly to avoid being banned: wait 1-2 minutes between tweets.";

/// Take over the terminal and run until the user quits.
pub fn run<S: PreferenceStore, L: Launcher>(app: &mut App<S, L>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn event_loop<B: Backend, S: PreferenceStore, L: Launcher>(
    terminal: &mut Terminal<B>,
    app: &mut App<S, L>,
) -> Result<()> {
    while !app.should_quit() {
        terminal.draw(|frame| draw(frame, &*app))?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }
    }
    Ok(())
}

fn draw<S: PreferenceStore, L: Launcher>(frame: &mut Frame, app: &App<S, L>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(4),
        ])
        .split(frame.area());

    widgets::categories::render(
        frame,
        chunks[0],
        &app.category_progress(),
        app.category_index(),
    );

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(chunks[1]);

    widgets::messages::render(
        frame,
        body[0],
        &app.message_rows(),
        app.state().selection(),
        app.message_index(),
        app.focus() == Focus::Messages,
    );
    widgets::tags::render(
        frame,
        body[1],
        &app.tag_rows(),
        app.state().selection(),
        app.tag_index(),
        app.focus() == Focus::Tags,
    );

    render_footer(frame, chunks[2], app);

    if let Some(prompt) = app.mode().prompt() {
        render_prompt(frame, frame.area(), prompt, app);
    }
}

fn render_footer<S: PreferenceStore, L: Launcher>(frame: &mut Frame, area: Rect, app: &App<S, L>) {
    let status_line = match app.status() {
        Some(status) => Line::from(Span::styled(
            status.to_string(),
            Style::default().fg(Color::Yellow),
        )),
        None => Line::from(Span::styled(
            help_text(app.focus()),
            Style::default().fg(Color::DarkGray),
        )),
    };
    let warning = Line::from(Span::styled(POSTING_WARNING, Style::default().fg(Color::Red)));
    let paragraph =
        Paragraph::new(vec![status_line, warning]).block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn help_text(focus: Focus) -> &'static str {
    match focus {
        Focus::Messages => {
            "t tweet | r truth | n new | d hide/delete | ←/→ category | Tab tags | c/C clear | q quit"
        }
        Focus::Tags => "Space toggle | a hashtag | m mention | d remove | Tab messages | q quit",
    }
}

fn render_prompt<S: PreferenceStore, L: Launcher>(
    frame: &mut Frame,
    area: Rect,
    prompt: &str,
    app: &App<S, L>,
) {
    let modal_area = center_rect(60, 25, area);
    frame.render_widget(Clear, modal_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(prompt.to_string());

    let mut text = Vec::new();
    if let Mode::AddMentionGroup { handle } = app.mode() {
        text.push(Line::from(format!("Group for {}:", handle.trim())));
    }
    let hint = match app.mode() {
        Mode::ConfirmClearHistory | Mode::ConfirmClearPreferences => "y to confirm | any key to cancel",
        Mode::AddMessage => {
            text.push(Line::from(format!(
                "{}/{}",
                app.input().chars().count(),
                app.state().max_message_len()
            )));
            "Enter to save | Esc to cancel"
        }
        _ => "Enter to save | Esc to cancel",
    };
    text.push(Line::from(""));
    text.push(Line::from(app.input().to_string()));
    text.push(Line::from(""));
    text.push(Line::from(Span::styled(
        hint,
        Style::default().fg(Color::DarkGray),
    )));

    let paragraph = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, modal_area);
}

fn center_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
